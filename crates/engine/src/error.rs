// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal-scan error types.
//!
//! Per-indicator and per-page failures are logged and absorbed by the
//! orchestrator; only the cases here abort a run.

use threatscan_backend::BackendError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("mapping migration failed: {0}")]
    Mapping(#[source] BackendError),
    #[error("failed to open indicator cursor: {0}")]
    CursorOpen(#[source] BackendError),
    #[error("failed to fetch page: {0}")]
    PageFetch(#[source] BackendError),
}
