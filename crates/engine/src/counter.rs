// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C4: bounded event counter.
//!
//! The returned value is always in `0..=bound`; if the true count exceeds
//! `bound`, the backend is expected to early-terminate and report exactly
//! `bound`. The orchestrator treats the result as a lower-bound delta, never
//! the exact lifetime total.

use serde_json::Value;
use threatscan_backend::{BackendError, SearchBackend};

pub async fn count_matching_events<B: SearchBackend>(
    backend: &B,
    index: &[String],
    query: &Value,
    bound: u64,
) -> Result<u64, BackendError> {
    let count = backend.count(index, query, Some(bound)).await?;
    Ok(count.min(bound))
}
