// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C6: the scan orchestrator.
//!
//! Ties C1–C5 together: migrate mapping, stream eligible indicators page by
//! page, fan out a bounded worker pool per page to count matching events,
//! bulk-stamp the page, and repeat until the stream is exhausted or the
//! scan's wall-clock budget runs out.

use crate::counter::count_matching_events;
use crate::cursor::IndicatorCursor;
use crate::error::ScanError;
use crate::migrator::ensure_detection_mapping;
use parking_lot::Mutex;
use serde_json::json;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use threatscan_backend::{BulkUpdate, SearchBackend, SortSpec};
use threatscan_core::{
    build_should_clauses, event_match_query, indicator_selection_query, Clock, Indicator,
    BATCH_SIZE, COUNT_BOUND, DEADLINE_EPSILON_MS,
};
use tokio::sync::Semaphore;

/// Parameters for a single scan invocation.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    pub threat_index: Vec<String>,
    pub events_index: Vec<String>,
    pub concurrency: usize,
    pub verbose: bool,
    pub interval: String,
}

/// Outcome of a scan run, returned on every non-fatal completion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanReport {
    pub duration_ms: u64,
    pub indicators_processed: u64,
    pub new_matches: u64,
    pub paused: bool,
}

/// Sink for the orchestrator's one human-readable summary line, distinct
/// from its structured `tracing` spans.
pub trait ScanLog: Send + Sync {
    fn summary(&self, report: &ScanReport);
}

/// Default [`ScanLog`] that emits the summary through `tracing`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingScanLog;

impl ScanLog for TracingScanLog {
    fn summary(&self, report: &ScanReport) {
        tracing::info!(
            duration_ms = report.duration_ms,
            indicators_processed = report.indicators_processed,
            new_matches = report.new_matches,
            paused = report.paused,
            "scan summary"
        );
    }
}

pub struct ScanOrchestrator<B: SearchBackend, C: Clock> {
    backend: B,
    clock: C,
    log: Arc<dyn ScanLog>,
}

impl<B: SearchBackend, C: Clock> ScanOrchestrator<B, C> {
    pub fn new(backend: B, clock: C, log: Arc<dyn ScanLog>) -> Self {
        Self { backend, clock, log }
    }

    pub async fn run(&self, config: &ScanConfig) -> Result<ScanReport, ScanError> {
        let span = tracing::info_span!("scan", threat_index = ?config.threat_index, events_index = ?config.events_index);
        let _guard = span.enter();

        ensure_detection_mapping(&self.backend, &config.threat_index)
            .await
            .map_err(ScanError::Mapping)?;

        let selection_query = indicator_selection_query(&config.interval);

        if let Ok(total) = self.backend.count(&config.threat_index, &selection_query, None).await {
            tracing::info!(total, "indicators eligible this run");
        }

        let start = self.clock.now_ms();
        let interval_secs = threatscan_core::parse_duration(&config.interval)
            .map(|d| d.as_secs())
            .unwrap_or(0);
        let deadline = start + (interval_secs as i64) * 1000 - DEADLINE_EPSILON_MS as i64;

        let mut cursor = IndicatorCursor::open(
            self.backend.clone(),
            config.threat_index.clone(),
            selection_query,
            SortSpec::Salted(start.to_string()),
            BATCH_SIZE,
        )
        .await
        .map_err(ScanError::CursorOpen)?;

        let mut indicators_processed = 0u64;
        let mut new_matches = 0u64;
        let mut paused = false;

        loop {
            if self.clock.now_ms() >= deadline {
                paused = true;
                break;
            }

            let page = cursor.next_page().await.map_err(ScanError::PageFetch)?;
            if page.is_empty() {
                break;
            }

            let semaphore = Arc::new(Semaphore::new(config.concurrency.max(1)));
            let buffer = Arc::new(Mutex::new(Vec::<(String, String, u64)>::new()));
            let page_new_matches = Arc::new(AtomicU64::new(0));

            let mut tasks = Vec::with_capacity(page.len());
            for hit in page {
                let backend = self.backend.clone();
                let events_index = config.events_index.clone();
                let semaphore = semaphore.clone();
                let buffer = buffer.clone();
                let page_new_matches = page_new_matches.clone();

                tasks.push(tokio::spawn(async move {
                    let Ok(_permit) = semaphore.acquire_owned().await else {
                        return;
                    };

                    let Some(source) = hit.source else {
                        tracing::warn!(id = %hit.id, index = %hit.index, "missing _source, leaving unstamped");
                        return;
                    };

                    let indicator = Indicator::from_source(hit.id.clone(), hit.index.clone(), &source);
                    let clauses = build_should_clauses(&indicator);

                    if clauses.is_empty() {
                        buffer.lock().push((hit.id, hit.index, indicator.detection.matches));
                        return;
                    }

                    let query = event_match_query(&indicator);
                    match count_matching_events(&backend, &events_index, &query, COUNT_BOUND).await {
                        Ok(delta) => {
                            page_new_matches.fetch_add(delta, Ordering::Relaxed);
                            buffer
                                .lock()
                                .push((hit.id, hit.index, indicator.detection.matches + delta));
                        }
                        Err(err) => {
                            tracing::warn!(id = %hit.id, error = %err, "count failed, leaving indicator unstamped");
                        }
                    }
                }));
            }

            futures::future::join_all(tasks).await;

            let entries = buffer.lock().clone();
            indicators_processed += entries.len() as u64;
            new_matches += page_new_matches.load(Ordering::Relaxed);

            if entries.is_empty() {
                continue;
            }

            let now = self.clock.now_ms();
            let updates: Vec<BulkUpdate> = entries
                .into_iter()
                .map(|(id, index, matches)| BulkUpdate {
                    id,
                    index,
                    doc: json!({ "threat": { "detection": { "timestamp": now, "matches": matches } } }),
                })
                .collect();

            if let Err(err) = self.backend.bulk_update(&updates).await {
                tracing::error!(error = %err, count = updates.len(), "bulk update failed, page partially durable");
            }
        }

        let report = ScanReport {
            duration_ms: (self.clock.now_ms() - start).max(0) as u64,
            indicators_processed,
            new_matches,
            paused,
        };
        self.log.summary(&report);
        Ok(report)
    }
}
