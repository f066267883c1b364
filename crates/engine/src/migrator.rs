// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C5: indicator index mapping migration.
//!
//! Ensures `threat.detection.timestamp` is mapped as a date and
//! `threat.detection.matches` as a long. Idempotent — a no-op on indices
//! already carrying the mapping.

use serde_json::json;
use threatscan_backend::{BackendError, SearchBackend};

/// Apply the detection-field mapping to every index in `threat_index`.
/// Called once at the top of every scan; failure is fatal for the run.
pub async fn ensure_detection_mapping<B: SearchBackend>(
    backend: &B,
    threat_index: &[String],
) -> Result<(), BackendError> {
    let properties = json!({
        "threat.detection.timestamp": { "type": "date" },
        "threat.detection.matches": { "type": "long" },
    });
    for index in threat_index {
        backend.put_mapping(index, &properties).await?;
    }
    Ok(())
}
