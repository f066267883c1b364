// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory [`SearchBackend`] for deterministic testing.
//!
//! Implements the same matching semantics as a real search engine for the
//! fixed event-field list consulted by the should-clause builder, plus the
//! `bool`/`range`/`exists` query shapes C2 emits — enough to validate the
//! scanner's testable properties without a live backend.

use crate::error::BackendError;
use crate::trait_def::{BulkUpdate, SearchBackend, SearchHit, SearchPage, SortSpec};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::Value;
use std::collections::HashMap;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::sync::Arc;

#[derive(Debug, Clone)]
struct Doc {
    id: String,
    index: String,
    source: Value,
}

#[derive(Default)]
struct State {
    docs: HashMap<String, HashMap<String, Value>>,
    mappings: HashMap<String, Value>,
    pits: HashMap<String, Vec<Doc>>,
    next_pit: u64,
    now_ms: i64,
}

/// In-memory backend, gated behind the `test-support` feature. Used by the
/// engine's test suite and by CLI smoke tests.
#[derive(Clone)]
pub struct FakeSearchBackend {
    inner: Arc<Mutex<State>>,
}

impl Default for FakeSearchBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl FakeSearchBackend {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Seed (or overwrite) a document.
    pub fn put_document(&self, index: impl Into<String>, id: impl Into<String>, source: Value) {
        let mut inner = self.inner.lock();
        inner
            .docs
            .entry(index.into())
            .or_default()
            .insert(id.into(), source);
    }

    /// Read back a document's current `_source`.
    pub fn get_document(&self, index: &str, id: &str) -> Option<Value> {
        self.inner.lock().docs.get(index)?.get(id).cloned()
    }

    /// Number of documents currently held for `index`.
    pub fn document_count(&self, index: &str) -> usize {
        self.inner.lock().docs.get(index).map_or(0, HashMap::len)
    }

    /// Mapping properties last applied to `index`, if any.
    pub fn mapping(&self, index: &str) -> Option<Value> {
        self.inner.lock().mappings.get(index).cloned()
    }

    /// Advance the fake clock the backend uses to resolve relative-time
    /// range queries (`"now-<interval>"`).
    pub fn set_now_ms(&self, now_ms: i64) {
        self.inner.lock().now_ms = now_ms;
    }
}

fn pointer_for(field: &str) -> String {
    format!("/{}", field.replace('.', "/"))
}

fn as_i64_loose(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn resolve_relative_ms(bound: &str, now_ms: i64) -> i64 {
    match bound.strip_prefix("now-") {
        Some(rest) => {
            let delta_ms = threatscan_core::parse_duration(rest)
                .map(|d| d.as_millis() as i64)
                .unwrap_or(0);
            now_ms - delta_ms
        }
        None => bound.parse().unwrap_or(now_ms),
    }
}

/// Evaluate a C1/C2-shaped query-DSL value against a document's source.
fn matches(source: &Value, query: &Value, now_ms: i64) -> bool {
    if let Some(bool_clause) = query.get("bool") {
        if let Some(must) = bool_clause.get("must").and_then(Value::as_array) {
            if !must.iter().all(|clause| matches(source, clause, now_ms)) {
                return false;
            }
        }

        if let Some(must_not) = bool_clause.get("must_not").and_then(Value::as_array) {
            if must_not.iter().any(|clause| matches(source, clause, now_ms)) {
                return false;
            }
        }

        if let Some(should) = bool_clause.get("should").and_then(Value::as_array) {
            let min_should_match = bool_clause
                .get("minimum_should_match")
                .and_then(Value::as_u64)
                .unwrap_or(if should.is_empty() { 0 } else { 1 }) as usize;
            let satisfied = should.iter().filter(|clause| matches(source, clause, now_ms)).count();
            if satisfied < min_should_match {
                return false;
            }
        }

        return true;
    }

    if let Some(match_clause) = query.get("match").and_then(Value::as_object) {
        return match_clause.iter().all(|(field, expected)| {
            source
                .pointer(&pointer_for(field))
                .and_then(Value::as_str)
                .map(|actual| Some(actual) == expected.as_str())
                .unwrap_or(false)
        });
    }

    if let Some(exists_clause) = query.get("exists") {
        let field = exists_clause.get("field").and_then(Value::as_str).unwrap_or_default();
        return source.pointer(&pointer_for(field)).is_some_and(|v| !v.is_null());
    }

    if let Some(range_clause) = query.get("range").and_then(Value::as_object) {
        return range_clause.iter().all(|(field, bounds)| {
            let Some(actual) = source.pointer(&pointer_for(field)).and_then(as_i64_loose) else {
                return false;
            };
            let lte_ok = bounds
                .get("lte")
                .and_then(Value::as_str)
                .map(|b| actual <= resolve_relative_ms(b, now_ms))
                .unwrap_or(true);
            let gte_ok = bounds
                .get("gte")
                .map(|b| {
                    let threshold = b.as_str().map(|s| resolve_relative_ms(s, now_ms)).or_else(|| as_i64_loose(b));
                    threshold.map(|t| actual >= t).unwrap_or(true)
                })
                .unwrap_or(true);
            lte_ok && gte_ok
        });
    }

    // An object with only bool/minimum_should_match handled above and no
    // recognized leaf clause matches everything (e.g. an empty `match_all`).
    true
}

fn sort_key(doc: &Doc, sort: &SortSpec) -> i64 {
    let timestamp = doc
        .source
        .pointer("/@timestamp")
        .and_then(as_i64_loose)
        .unwrap_or(0);
    match sort {
        SortSpec::Timestamp => timestamp,
        SortSpec::Salted(salt) => {
            let mut hasher = DefaultHasher::new();
            timestamp.hash(&mut hasher);
            salt.hash(&mut hasher);
            (hasher.finish() >> 1) as i64
        }
    }
}

fn deep_merge(base: &mut Value, patch: &Value) {
    match (base, patch) {
        (Value::Object(base_map), Value::Object(patch_map)) => {
            for (key, value) in patch_map {
                deep_merge(base_map.entry(key.clone()).or_insert(Value::Null), value);
            }
        }
        (base_slot, patch_value) => {
            *base_slot = patch_value.clone();
        }
    }
}

#[async_trait]
impl SearchBackend for FakeSearchBackend {
    async fn open_point_in_time(
        &self,
        index: &[String],
        _keep_alive: &str,
    ) -> Result<String, BackendError> {
        let mut inner = self.inner.lock();
        let mut snapshot: Vec<Doc> = Vec::new();
        for idx in index {
            if let Some(docs) = inner.docs.get(idx) {
                snapshot.extend(docs.iter().map(|(id, source)| Doc {
                    id: id.clone(),
                    index: idx.clone(),
                    source: source.clone(),
                }));
            }
        }
        snapshot.sort_by(|a, b| a.id.cmp(&b.id));

        inner.next_pit += 1;
        let pit_id = format!("fake-pit-{}", inner.next_pit);
        inner.pits.insert(pit_id.clone(), snapshot);
        Ok(pit_id)
    }

    async fn search(
        &self,
        pit_id: &str,
        sort: &SortSpec,
        size: usize,
        query: Option<&Value>,
        search_after: Option<&Value>,
    ) -> Result<SearchPage, BackendError> {
        let inner = self.inner.lock();
        let snapshot = inner
            .pits
            .get(pit_id)
            .ok_or_else(|| BackendError::UnexpectedResponse(format!("unknown pit '{pit_id}'")))?;

        let mut sorted: Vec<(&Doc, i64)> = snapshot.iter().map(|doc| (doc, sort_key(doc, sort))).collect();
        sorted.sort_by(|a, b| a.1.cmp(&b.1).then_with(|| a.0.id.cmp(&b.0.id)));

        let after = search_after
            .and_then(Value::as_array)
            .and_then(|arr| arr.first())
            .and_then(as_i64_loose);

        let hits = sorted
            .into_iter()
            .filter(|(_, key)| after.map_or(true, |after| *key > after))
            .filter(|(doc, _)| query.map_or(true, |q| matches(&doc.source, q, inner.now_ms)))
            .take(size)
            .map(|(doc, key)| SearchHit {
                id: doc.id.clone(),
                index: doc.index.clone(),
                source: Some(doc.source.clone()),
                sort: serde_json::json!([key]),
            })
            .collect();

        Ok(SearchPage { hits })
    }

    async fn count(
        &self,
        index: &[String],
        query: &Value,
        terminate_after: Option<u64>,
    ) -> Result<u64, BackendError> {
        let inner = self.inner.lock();
        let mut count = 0u64;
        'indices: for idx in index {
            let Some(docs) = inner.docs.get(idx) else { continue };
            for source in docs.values() {
                if matches(source, query, inner.now_ms) {
                    count += 1;
                    if let Some(bound) = terminate_after {
                        if count >= bound {
                            break 'indices;
                        }
                    }
                }
            }
        }
        Ok(count)
    }

    async fn bulk_update(&self, updates: &[BulkUpdate]) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        for update in updates {
            let index = inner.docs.entry(update.index.clone()).or_default();
            let doc = index.entry(update.id.clone()).or_insert(Value::Object(Default::default()));
            deep_merge(doc, &update.doc);
        }
        Ok(())
    }

    async fn put_mapping(&self, index: &str, properties: &Value) -> Result<(), BackendError> {
        let mut inner = self.inner.lock();
        let entry = inner
            .mappings
            .entry(index.to_string())
            .or_insert_with(|| Value::Object(Default::default()));
        deep_merge(entry, properties);
        Ok(())
    }
}
