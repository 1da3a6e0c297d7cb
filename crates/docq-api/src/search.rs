//! Handler for `GET /search`.
//!
//! Every hit is also written to the caller's history, with the snippet they
//! were shown as the response.

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State, rejection::QueryRejection},
};
use docq_core::{
  document::DocumentId,
  search::{SNIPPET_CHARS, snippet},
  store::DocumentStore,
};
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize, Default)]
pub struct SearchParams {
  /// Case-insensitive substring to look for.
  pub q: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SearchResult {
  pub document_id: DocumentId,
  pub filename:    String,
  pub snippet:     String,
}

/// `GET /search?q=<text>`
pub async fn handler<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
  params: Result<Query<SearchParams>, QueryRejection>,
) -> Result<Json<Vec<SearchResult>>, ApiError>
where
  S: DocumentStore + 'static,
{
  let Query(params) = params?;
  let query = params
    .q
    .filter(|q| !q.is_empty())
    .ok_or_else(|| ApiError::BadRequest("missing query parameter `q`".into()))?;

  let hits = store.search(&query).await.map_err(ApiError::store)?;
  tracing::debug!(%user_id, %query, hits = hits.len(), "search");

  let mut results = Vec::with_capacity(hits.len());
  for hit in hits {
    let shown = snippet(&hit.text, SNIPPET_CHARS).to_owned();
    store
      .record(user_id, &query, &shown)
      .await
      .map_err(ApiError::store)?;
    results.push(SearchResult {
      document_id: hit.document_id,
      filename:    hit.filename,
      snippet:     shown,
    });
  }

  Ok(Json(results))
}
