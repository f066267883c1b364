// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C2: query builders.
//!
//! Pure functions from typed state to the backend's native query-DSL
//! representation (`serde_json::Value`). No backend client dependency, so
//! every case here is unit-testable in isolation.

use crate::indicator::Indicator;
use crate::schema::build_should_clauses;
use serde_json::{json, Value};

/// Selects indicators eligible for processing in this run: never checked, or
/// last checked more than `interval` ago.
pub fn indicator_selection_query(interval: &str) -> Value {
    json!({
        "bool": {
            "minimum_should_match": 1,
            "should": [
                { "range": { "threat.detection.timestamp": { "lte": format!("now-{interval}") } } },
                { "bool": { "must_not": [ { "exists": { "field": "threat.detection.timestamp" } } ] } },
            ]
        }
    })
}

/// Counts/matches events against a single indicator's observables.
///
/// After the first scan (`indicator.detection.timestamp_ms.is_some()`), a
/// `gte` floor on `@timestamp` restricts the match to events newly arrived
/// since the indicator's last check — cumulative totals live in
/// `threat.detection.matches`, not in re-counting history.
pub fn event_match_query(indicator: &Indicator) -> Value {
    let should: Vec<Value> = build_should_clauses(indicator)
        .into_iter()
        .map(|clause| json!({ "match": { clause.field: clause.value } }))
        .collect();

    let mut bool_query = serde_json::Map::new();
    bool_query.insert("minimum_should_match".to_string(), json!(1));
    bool_query.insert("should".to_string(), Value::Array(should));
    if let Some(timestamp_ms) = indicator.detection.timestamp_ms {
        bool_query.insert(
            "must".to_string(),
            json!([ { "range": { "@timestamp": { "gte": timestamp_ms } } } ]),
        );
    }

    json!({ "bool": Value::Object(bool_query) })
}
