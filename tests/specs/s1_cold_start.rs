//! S1 — cold start, no matches.

use crate::prelude::*;
use serde_json::json;
use threatscan_backend::FakeSearchBackend;
use threatscan_core::FakeClock;

#[tokio::test]
async fn cold_start_with_no_events_stamps_zero_matches() {
    let backend = FakeSearchBackend::new();
    let clock = FakeClock::new(0);
    backend.set_now_ms(0);

    backend.put_document(
        THREAT_INDEX,
        "ind-1",
        json!({ "@timestamp": 1, "threat": { "indicator": { "type": "url", "url": { "full": "http://a.test" } } } }),
    );

    let report = run_scan(&backend, &clock, "10s", 1).await;

    assert!(!report.paused);
    assert_eq!(report.new_matches, 0);
    assert_eq!(report.indicators_processed, 1);

    let indicator = backend.get_document(THREAT_INDEX, "ind-1").unwrap();
    assert_eq!(indicator["threat"]["detection"]["matches"], 0);
    assert_eq!(indicator["threat"]["detection"]["timestamp"], 0);
}
