// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production [`SearchBackend`] over HTTP.
//!
//! A thin, generic transport: it has no notion of indicators or events, only
//! the five backend operations and the JSON bodies they exchange.

use crate::error::BackendError;
use crate::trait_def::{BulkUpdate, SearchBackend, SearchHit, SearchPage, SortSpec};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

#[derive(Debug)]
struct Inner {
    client: reqwest::Client,
    base_url: String,
}

/// HTTP-backed [`SearchBackend`], cheaply cloneable via an `Arc`-wrapped,
/// connection-pooled client.
#[derive(Debug, Clone)]
pub struct HttpSearchBackend {
    inner: Arc<Inner>,
}

impl HttpSearchBackend {
    /// Build a backend targeting `base_url`, using the default per-request
    /// timeout.
    pub fn new(base_url: impl Into<String>) -> Result<Self, BackendError> {
        Self::with_timeout(base_url, Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS))
    }

    /// Build a backend targeting `base_url` with an explicit per-request
    /// timeout. The client enforces its own request timeouts — there is no
    /// per-worker timeout layered on top of it.
    pub fn with_timeout(base_url: impl Into<String>, timeout: Duration) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        Ok(Self {
            inner: Arc::new(Inner {
                client,
                base_url: base_url.into().trim_end_matches('/').to_string(),
            }),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.inner.base_url, path)
    }

    async fn post(&self, path: &str, body: Value) -> Result<Value, BackendError> {
        let start = Instant::now();
        tracing::debug!(path, "posting search request");

        let response = self
            .inner
            .client
            .post(self.url(path))
            .json(&body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(path, error = %err, "request failed");
                BackendError::Transport(err.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(path, %status, "unexpected response status");
            return Err(BackendError::UnexpectedResponse(format!(
                "{status}: {text}"
            )));
        }

        let result = response
            .json::<Value>()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()));

        tracing::debug!(path, elapsed_ms = start.elapsed().as_millis() as u64, "request completed");
        result
    }
}

fn sort_spec_to_json(sort: &SortSpec) -> Value {
    match sort {
        SortSpec::Timestamp => json!([{ "@timestamp": "asc" }]),
        SortSpec::Salted(salt) => json!([{
            "_script": {
                "type": "number",
                "script": { "source": "hash(doc['@timestamp'].value, params.salt)", "params": { "salt": salt } },
                "order": "asc"
            }
        }]),
    }
}

#[async_trait]
impl SearchBackend for HttpSearchBackend {
    async fn open_point_in_time(
        &self,
        index: &[String],
        keep_alive: &str,
    ) -> Result<String, BackendError> {
        let path = format!("/{}/_pit", index.join(","));
        let response = self.post(&path, json!({ "keep_alive": keep_alive })).await?;
        response
            .get("id")
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| BackendError::UnexpectedResponse("missing pit id".to_string()))
    }

    async fn search(
        &self,
        pit_id: &str,
        sort: &SortSpec,
        size: usize,
        query: Option<&Value>,
        search_after: Option<&Value>,
    ) -> Result<SearchPage, BackendError> {
        let mut body = serde_json::Map::new();
        body.insert("pit".to_string(), json!({ "id": pit_id }));
        body.insert("sort".to_string(), sort_spec_to_json(sort));
        body.insert("size".to_string(), json!(size));
        if let Some(query) = query {
            body.insert("query".to_string(), query.clone());
        }
        if let Some(search_after) = search_after {
            body.insert("search_after".to_string(), search_after.clone());
        }

        let response = self.post("/_search", Value::Object(body)).await?;
        let raw_hits = response
            .pointer("/hits/hits")
            .and_then(Value::as_array)
            .cloned()
            .unwrap_or_default();

        let hits = raw_hits
            .into_iter()
            .filter_map(|hit| {
                let id = hit.get("_id")?.as_str()?.to_string();
                let index = hit.get("_index")?.as_str()?.to_string();
                let source = hit.get("_source").cloned();
                let sort = hit.get("sort").cloned().unwrap_or(Value::Null);
                Some(SearchHit { id, index, source, sort })
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
        let path = format!("/{}/_count", index.join(","));
        let mut body = serde_json::Map::new();
        body.insert("query".to_string(), query.clone());
        if let Some(terminate_after) = terminate_after {
            body.insert("terminate_after".to_string(), json!(terminate_after));
        }
        let response = self.post(&path, Value::Object(body)).await?;
        response
            .get("count")
            .and_then(Value::as_u64)
            .ok_or_else(|| BackendError::UnexpectedResponse("missing count".to_string()))
    }

    async fn bulk_update(&self, updates: &[BulkUpdate]) -> Result<(), BackendError> {
        if updates.is_empty() {
            return Ok(());
        }

        let start = Instant::now();
        let mut body = String::new();
        for update in updates {
            let header = json!({ "update": { "_id": update.id, "_index": update.index } });
            body.push_str(&serde_json::to_string(&header)?);
            body.push('\n');
            body.push_str(&serde_json::to_string(&json!({ "doc": update.doc }))?);
            body.push('\n');
        }

        let response = self
            .inner
            .client
            .post(self.url("/_bulk"))
            .header("Content-Type", "application/x-ndjson")
            .body(body)
            .send()
            .await
            .map_err(|err| {
                tracing::warn!(error = %err, count = updates.len(), "bulk request failed");
                BackendError::Transport(err.to_string())
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            tracing::warn!(%status, count = updates.len(), "unexpected bulk response status");
            return Err(BackendError::UnexpectedResponse(format!(
                "{status}: {text}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|err| BackendError::Transport(err.to_string()))?;
        if body.get("errors").and_then(Value::as_bool) == Some(true) {
            tracing::warn!(count = updates.len(), "bulk update reported item-level errors");
            return Err(BackendError::UnexpectedResponse(
                "bulk update reported item-level errors".to_string(),
            ));
        }

        tracing::info!(
            count = updates.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "bulk update completed"
        );
        Ok(())
    }

    async fn put_mapping(&self, index: &str, properties: &Value) -> Result<(), BackendError> {
        let path = format!("/{index}/_mapping");
        self.post(&path, json!({ "properties": properties })).await?;
        Ok(())
    }
}
