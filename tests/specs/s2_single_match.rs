//! S2 — single match.

use crate::prelude::*;
use serde_json::json;
use threatscan_backend::FakeSearchBackend;
use threatscan_core::FakeClock;

#[tokio::test]
async fn one_matching_event_yields_one_match() {
    let backend = FakeSearchBackend::new();
    let clock = FakeClock::new(0);
    backend.set_now_ms(0);

    backend.put_document(
        THREAT_INDEX,
        "ind-1",
        json!({ "@timestamp": 1, "threat": { "indicator": { "type": "url", "url": { "full": "http://a.test" } } } }),
    );
    backend.put_document(EVENTS_INDEX, "evt-1", json!({ "url": { "full": "http://a.test" } }));

    let report = run_scan(&backend, &clock, "10s", 1).await;

    assert!(!report.paused);
    assert_eq!(report.new_matches, 1);

    let indicator = backend.get_document(THREAT_INDEX, "ind-1").unwrap();
    assert_eq!(indicator["threat"]["detection"]["matches"], 1);
}
