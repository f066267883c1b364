// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Indicator document shape.
//!
//! Indicators are stored as loosely-typed JSON documents in the backend; this
//! module is the one place that reaches into that shape with dotted-path
//! lookups. Everything downstream of [`Indicator::from_source`] works against
//! a typed value.

use crate::id::IndicatorId;
use serde_json::Value;

/// `threat.indicator.type` as a tagged discriminator.
///
/// This is informational only — the should-clause builder (see
/// [`crate::schema`]) probes the fixed observable field list regardless of
/// the declared kind. An `Unknown` kind simply means the raw `type` string
/// did not match one we special-case; it still participates in should-clause
/// building the same as any other kind, and naturally ends up empty if it
/// carries none of the recognized observable fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IndicatorKind {
    Url,
    File,
    Ip,
    Unknown(String),
}

impl IndicatorKind {
    fn from_type_str(raw: &str) -> Self {
        match raw {
            "url" => IndicatorKind::Url,
            "file" => IndicatorKind::File,
            "ip" => IndicatorKind::Ip,
            other => IndicatorKind::Unknown(other.to_string()),
        }
    }
}

/// Scanner-owned detection metadata (`threat.detection.*`).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DetectionState {
    /// Epoch millis of last successful check. `None` ⇒ never checked.
    pub timestamp_ms: Option<i64>,
    /// Cumulative bounded count of matching events across all prior scans.
    pub matches: u64,
}

/// A parsed indicator document, ready for should-clause building.
#[derive(Debug, Clone)]
pub struct Indicator {
    pub id: IndicatorId,
    pub index: String,
    pub kind: IndicatorKind,
    /// Raw observable values, probed directly from `threat.indicator.*`
    /// regardless of `kind` (see [`crate::schema::build_should_clauses`]).
    pub observables: Observables,
    pub detection: DetectionState,
}

/// The recognized observable leaves under `threat.indicator.*`.
#[derive(Debug, Clone, Default)]
pub struct Observables {
    pub url_full: Option<String>,
    pub file_hash_sha1: Option<String>,
    pub file_hash_md5: Option<String>,
    pub file_pe_imphash: Option<String>,
    pub ip: Option<String>,
}

impl Indicator {
    /// Parse an indicator from its `_id`, `_index`, and `_source` document.
    pub fn from_source(id: impl Into<IndicatorId>, index: impl Into<String>, source: &Value) -> Self {
        let kind = source
            .pointer("/threat/indicator/type")
            .and_then(Value::as_str)
            .map(IndicatorKind::from_type_str)
            .unwrap_or_else(|| IndicatorKind::Unknown(String::new()));

        let observables = Observables {
            url_full: non_empty_str(source.pointer("/threat/indicator/url/full")),
            file_hash_sha1: non_empty_str(source.pointer("/threat/indicator/file/hash/sha1")),
            file_hash_md5: non_empty_str(source.pointer("/threat/indicator/file/hash/md5")),
            file_pe_imphash: non_empty_str(source.pointer("/threat/indicator/file/pe/imphash")),
            ip: non_empty_str(source.pointer("/threat/indicator/ip")),
        };

        let detection = DetectionState {
            timestamp_ms: source
                .pointer("/threat/detection/timestamp")
                .and_then(Value::as_i64),
            matches: source
                .pointer("/threat/detection/matches")
                .and_then(Value::as_u64)
                .unwrap_or(0),
        };

        Self {
            id: id.into(),
            index: index.into(),
            kind,
            observables,
            detection,
        }
    }

    /// `true` iff this indicator has never been successfully checked.
    pub fn never_checked(&self) -> bool {
        self.detection.timestamp_ms.is_none()
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}
