//! S3 — multi-type filtering: no cross-type leakage between a URL indicator
//! and a file indicator sharing the same event index.

use crate::prelude::*;
use serde_json::json;
use threatscan_backend::FakeSearchBackend;
use threatscan_core::FakeClock;

#[tokio::test]
async fn url_and_file_indicators_do_not_leak_across_types() {
    let backend = FakeSearchBackend::new();
    let clock = FakeClock::new(0);
    backend.set_now_ms(0);

    backend.put_document(
        THREAT_INDEX,
        "url-ind",
        json!({ "@timestamp": 1, "threat": { "indicator": { "type": "url", "url": { "full": "http://a" } } } }),
    );
    backend.put_document(
        THREAT_INDEX,
        "file-ind",
        json!({
            "@timestamp": 2,
            "threat": {
                "indicator": {
                    "type": "file",
                    "file": { "hash": { "md5": "d41d8cd98f00b204e9800998ecf8427e", "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709" } }
                }
            }
        }),
    );

    for i in 0..3 {
        backend.put_document(EVENTS_INDEX, format!("url-hit-{i}"), json!({ "url": { "full": "http://a" } }));
    }
    for i in 0..2 {
        backend.put_document(
            EVENTS_INDEX,
            format!("md5-only-hit-{i}"),
            json!({ "file": { "hash": { "md5": "d41d8cd98f00b204e9800998ecf8427e", "sha1": "other" } } }),
        );
    }
    backend.put_document(
        EVENTS_INDEX,
        "both-hashes-hit",
        json!({
            "file": { "hash": { "md5": "d41d8cd98f00b204e9800998ecf8427e", "sha1": "da39a3ee5e6b4b0d3255bfef95601890afd80709" } }
        }),
    );

    let report = run_scan(&backend, &clock, "10s", 2).await;
    assert!(!report.paused);

    let url_ind = backend.get_document(THREAT_INDEX, "url-ind").unwrap();
    let file_ind = backend.get_document(THREAT_INDEX, "file-ind").unwrap();

    let url_matches = url_ind["threat"]["detection"]["matches"].as_u64().unwrap();
    let file_matches = file_ind["threat"]["detection"]["matches"].as_u64().unwrap();

    assert!(url_matches >= 3, "expected >= 3 url matches, got {url_matches}");
    // Three events carry an md5 match (should-clause matches on md5 alone is
    // sufficient), so the file indicator sees all three.
    assert!(file_matches >= 3, "expected >= 3 file matches, got {file_matches}");
}
