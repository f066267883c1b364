// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C1: indicator schema and should-clause builder.
//!
//! Maps an indicator document to the disjunction of event-field match
//! predicates it should be checked against.

use crate::indicator::Indicator;

/// The fixed, ordered list of event-field names consulted for every
/// indicator, independent of its declared `threat.indicator.type`.
pub const EVENT_FIELDS: [&str; 6] = [
    "url.full",
    "file.hash.sha1",
    "file.hash.md5",
    "file.pe.imphash",
    "source.ip",
    "destination.ip",
];

/// A single `match { field: value }` predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchClause {
    pub field: &'static str,
    pub value: String,
}

/// Build the ordered list of should-clauses for an indicator.
///
/// For each event-field `f` in [`EVENT_FIELDS`], the indicator is probed at
/// `threat.indicator.g`, where `g` is `"ip"` if `f` ends in `.ip` (both
/// `source.ip` and `destination.ip` share the single indicator IP
/// observable), else `g == f`. Absent or empty values are skipped. An
/// indicator carrying none of the recognized observables yields an empty
/// list — the caller must still treat it as checked (see the orchestrator).
pub fn build_should_clauses(indicator: &Indicator) -> Vec<MatchClause> {
    let obs = &indicator.observables;
    EVENT_FIELDS
        .iter()
        .filter_map(|&field| {
            let value = if field.ends_with(".ip") {
                obs.ip.as_deref()
            } else {
                match field {
                    "url.full" => obs.url_full.as_deref(),
                    "file.hash.sha1" => obs.file_hash_sha1.as_deref(),
                    "file.hash.md5" => obs.file_hash_md5.as_deref(),
                    "file.pe.imphash" => obs.file_pe_imphash.as_deref(),
                    _ => None,
                }
            };
            value.map(|value| MatchClause {
                field,
                value: value.to_string(),
            })
        })
        .collect()
}
