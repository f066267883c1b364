//! Shared test helpers for the scanner's behavioral specifications.
#![allow(dead_code)]

use std::sync::Arc;
use threatscan_backend::FakeSearchBackend;
use threatscan_core::FakeClock;
use threatscan_engine::{ScanConfig, ScanOrchestrator, ScanReport, TracingScanLog};

pub const THREAT_INDEX: &str = "threat-indicators";
pub const EVENTS_INDEX: &str = "events";

pub fn config(interval: &str, concurrency: usize) -> ScanConfig {
    ScanConfig {
        threat_index: vec![THREAT_INDEX.to_string()],
        events_index: vec![EVENTS_INDEX.to_string()],
        concurrency,
        verbose: false,
        interval: interval.to_string(),
    }
}

pub fn orchestrator(
    backend: FakeSearchBackend,
    clock: FakeClock,
) -> ScanOrchestrator<FakeSearchBackend, FakeClock> {
    ScanOrchestrator::new(backend, clock, Arc::new(TracingScanLog))
}

pub async fn run_scan(
    backend: &FakeSearchBackend,
    clock: &FakeClock,
    interval: &str,
    concurrency: usize,
) -> ScanReport {
    orchestrator(backend.clone(), clock.clone())
        .run(&config(interval, concurrency))
        .await
        .expect("scan should not fail fatally")
}
