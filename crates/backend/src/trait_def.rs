// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The [`SearchBackend`] adapter trait (C7).
//!
//! Deliberately generic: nothing here knows about threat indicators or
//! events. It is a thin transport over the query-DSL values produced by
//! `threatscan-core` and the cursor state owned by `threatscan-engine`.

use crate::error::BackendError;
use async_trait::async_trait;
use serde_json::Value;

/// How the stream wants result pages sorted.
#[derive(Debug, Clone)]
pub enum SortSpec {
    /// Plain ascending `@timestamp`.
    Timestamp,
    /// Scripted deterministic shuffle: `hash(@timestamp + salt)` ascending.
    /// Spreads contention across overlapping runs/instances.
    Salted(String),
}

/// A single document returned from [`SearchBackend::search`].
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub id: String,
    pub index: String,
    /// `None` models a hit whose `_source` was not returned (e.g. excluded by
    /// source filtering, or the document was deleted between match and fetch).
    pub source: Option<Value>,
    /// The sort key material for this hit, to seed the next page's
    /// `search_after`.
    pub sort: Value,
}

/// One page of results from [`SearchBackend::search`].
#[derive(Debug, Clone, Default)]
pub struct SearchPage {
    pub hits: Vec<SearchHit>,
}

impl SearchPage {
    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }
}

/// A single `{ update: { _id, _index } } / { doc: { ... } }` bulk pair.
#[derive(Debug, Clone)]
pub struct BulkUpdate {
    pub id: String,
    pub index: String,
    pub doc: Value,
}

/// Captures exactly the five operations the scanner needs from a search
/// backend. `async_trait`-based, `Send + Sync + 'static`, and cheaply
/// `Clone`-able — implementations wrap their inner client in an `Arc`.
#[async_trait]
pub trait SearchBackend: Clone + Send + Sync + 'static {
    /// Open a point-in-time snapshot across `index` with the given
    /// keep-alive (a duration string, e.g. `"1m"`).
    async fn open_point_in_time(
        &self,
        index: &[String],
        keep_alive: &str,
    ) -> Result<String, BackendError>;

    /// Fetch one page of up to `size` hits from the point-in-time `pit_id`,
    /// optionally filtered by `query` and continuing after `search_after`.
    async fn search(
        &self,
        pit_id: &str,
        sort: &SortSpec,
        size: usize,
        query: Option<&Value>,
        search_after: Option<&Value>,
    ) -> Result<SearchPage, BackendError>;

    /// Count documents matching `query` across `index`, early-terminating at
    /// `terminate_after` hits when given.
    async fn count(
        &self,
        index: &[String],
        query: &Value,
        terminate_after: Option<u64>,
    ) -> Result<u64, BackendError>;

    /// Apply a batch of partial-document updates in one round trip.
    async fn bulk_update(&self, updates: &[BulkUpdate]) -> Result<(), BackendError>;

    /// Idempotently extend `index`'s mapping with `properties`.
    async fn put_mapping(&self, index: &str, properties: &Value) -> Result<(), BackendError>;
}
