//! Handlers for `/documents` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/documents?filename=…[&format=…]` | Raw body; returns 201 + id |
//! | `GET`  | `/documents/:id` | Filename, format and a text snippet; logged to history |
//! | `GET`  | `/documents/:id/raw` | The stored bytes, served as the declared format |

use std::sync::Arc;

use axum::{
  Json,
  extract::{
    Path, Query, State,
    rejection::{PathRejection, QueryRejection},
  },
  http::{HeaderMap, HeaderValue, StatusCode, header},
  response::{IntoResponse, Response},
};
use bytes::Bytes;
use docq_core::{
  document::{DocumentId, NewDocument},
  search::{SNIPPET_CHARS, snippet},
  store::DocumentStore,
};
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::ApiError};

const FALLBACK_FORMAT: &str = "application/octet-stream";

// ─── Upload ───────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct UploadParams {
  pub filename: String,
  /// Overrides the request's `Content-Type`.
  pub format:   Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UploadedBody {
  pub document_id: DocumentId,
}

/// `POST /documents?filename=<name>[&format=<mime>]` — body is stored verbatim.
pub async fn upload<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
  params: Result<Query<UploadParams>, QueryRejection>,
  headers: HeaderMap,
  body: Bytes,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
{
  let Query(params) = params?;
  if params.filename.is_empty() {
    return Err(ApiError::BadRequest("filename must not be empty".into()));
  }

  let format = params
    .format
    .or_else(|| {
      headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(str::to_owned)
    })
    .unwrap_or_else(|| FALLBACK_FORMAT.to_owned());

  let size = body.len();
  let document_id = store
    .insert_document(NewDocument {
      user_id,
      filename: params.filename,
      content: body.to_vec(),
      format,
    })
    .await
    .map_err(ApiError::store)?;

  tracing::info!(%user_id, %document_id, size, "stored document");
  Ok((StatusCode::CREATED, Json(UploadedBody { document_id })))
}

// ─── Lookup ───────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize, Deserialize)]
pub struct DocumentView {
  pub document_id: DocumentId,
  pub filename:    String,
  pub format:      String,
  /// The first [`SNIPPET_CHARS`] characters of the decoded text.
  pub content:     String,
}

/// `GET /documents/:id`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
  id: Result<Path<DocumentId>, PathRejection>,
) -> Result<Json<DocumentView>, ApiError>
where
  S: DocumentStore + 'static,
{
  let Path(id) = id?;
  let doc = store
    .get_document(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {id} not found")))?;

  let text    = doc.text();
  let content = snippet(&text, SNIPPET_CHARS).to_owned();

  store
    .record(user_id, &format!("Search by ID: {id}"), &content)
    .await
    .map_err(ApiError::store)?;

  Ok(Json(DocumentView {
    document_id: doc.document_id,
    filename:    doc.filename,
    format:      doc.format,
    content,
  }))
}

/// `GET /documents/:id/raw`
pub async fn get_raw<S>(
  State(store): State<Arc<S>>,
  CurrentUser(_): CurrentUser,
  id: Result<Path<DocumentId>, PathRejection>,
) -> Result<Response, ApiError>
where
  S: DocumentStore + 'static,
{
  let Path(id) = id?;
  let doc = store
    .get_document(id)
    .await
    .map_err(ApiError::store)?
    .ok_or_else(|| ApiError::NotFound(format!("document {id} not found")))?;

  let content_type = HeaderValue::from_str(&doc.format)
    .unwrap_or_else(|_| HeaderValue::from_static(FALLBACK_FORMAT));

  Ok(([(header::CONTENT_TYPE, content_type)], doc.content).into_response())
}
