// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! C3: paginated indicator document stream.
//!
//! An explicit stateful cursor, not a generator — finite, single-pass,
//! non-restartable. A new scan always opens a fresh one.

use serde_json::Value;
use threatscan_backend::{BackendError, SearchBackend, SearchHit, SortSpec};
use threatscan_core::PIT_KEEP_ALIVE;

/// Holds the point-in-time id and the last page's terminal sort key.
pub struct IndicatorCursor<B: SearchBackend> {
    backend: B,
    pit_id: String,
    index: Vec<String>,
    query: Value,
    sort: SortSpec,
    page_size: usize,
    search_after: Option<Value>,
    exhausted: bool,
}

impl<B: SearchBackend> IndicatorCursor<B> {
    /// Open a fresh point-in-time against `index` and prepare to stream pages
    /// of `query` results ordered by `sort`.
    pub async fn open(
        backend: B,
        index: Vec<String>,
        query: Value,
        sort: SortSpec,
        page_size: usize,
    ) -> Result<Self, BackendError> {
        let pit_id = backend.open_point_in_time(&index, PIT_KEEP_ALIVE).await?;
        Ok(Self {
            backend,
            pit_id,
            index,
            query,
            sort,
            page_size,
            search_after: None,
            exhausted: false,
        })
    }

    /// Fetch the next page. Returns an empty vec exactly once, at exhaustion;
    /// every call after that also returns empty without hitting the backend.
    pub async fn next_page(&mut self) -> Result<Vec<SearchHit>, BackendError> {
        if self.exhausted {
            return Ok(Vec::new());
        }

        let page = self
            .backend
            .search(
                &self.pit_id,
                &self.sort,
                self.page_size,
                Some(&self.query),
                self.search_after.as_ref(),
            )
            .await?;

        if page.hits.is_empty() {
            self.exhausted = true;
            return Ok(Vec::new());
        }

        self.search_after = page.hits.last().map(|hit| hit.sort.clone());
        Ok(page.hits)
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }
}
