//! S4 — incremental second run: matches accumulate, and the second run's
//! event-match query only looks for events newer than the prior timestamp.

use crate::prelude::*;
use serde_json::json;
use threatscan_backend::FakeSearchBackend;
use threatscan_core::FakeClock;

#[tokio::test]
async fn second_run_adds_only_newly_arrived_events() {
    let backend = FakeSearchBackend::new();
    let clock = FakeClock::new(1000);
    backend.set_now_ms(1000);

    backend.put_document(
        THREAT_INDEX,
        "ind-1",
        json!({ "@timestamp": 1, "threat": { "indicator": { "type": "url", "url": { "full": "http://a.test" } } } }),
    );
    backend.put_document(EVENTS_INDEX, "evt-1", json!({ "@timestamp": 500, "url": { "full": "http://a.test" } }));

    let first = run_scan(&backend, &clock, "10s", 1).await;
    assert_eq!(first.new_matches, 1);
    let after_first = backend.get_document(THREAT_INDEX, "ind-1").unwrap();
    assert_eq!(after_first["threat"]["detection"]["matches"], 1);
    let stamped_at = after_first["threat"]["detection"]["timestamp"].as_i64().unwrap();

    // Advance past the interval so the indicator is eligible again, and
    // backdate one event so it predates the stamp (must not be recounted).
    clock.advance_ms(20_000);
    backend.set_now_ms(20_000);
    backend.put_document(EVENTS_INDEX, "evt-stale", json!({ "@timestamp": stamped_at - 1, "url": { "full": "http://a.test" } }));
    backend.put_document(EVENTS_INDEX, "evt-2", json!({ "@timestamp": stamped_at + 1, "url": { "full": "http://a.test" } }));
    backend.put_document(EVENTS_INDEX, "evt-3", json!({ "@timestamp": stamped_at + 2, "url": { "full": "http://a.test" } }));

    let second = run_scan(&backend, &clock, "10s", 1).await;
    assert_eq!(second.new_matches, 2, "only events at/after the prior stamp should count");

    let after_second = backend.get_document(THREAT_INDEX, "ind-1").unwrap();
    assert_eq!(after_second["threat"]["detection"]["matches"], 3);
}
