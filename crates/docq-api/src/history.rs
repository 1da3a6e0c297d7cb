//! Handlers for `/history` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/history` | The caller's entries, oldest first |
//! | `GET`  | `/history/export` | Same entries as a CSV attachment |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::header,
  response::IntoResponse,
};
use docq_core::{
  history::{HistoryEntry, to_csv},
  store::DocumentStore,
};

use crate::{auth::CurrentUser, error::ApiError};

/// `GET /history`
pub async fn list<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<Json<Vec<HistoryEntry>>, ApiError>
where
  S: DocumentStore + 'static,
{
  let entries = store
    .get_history(user_id)
    .await
    .map_err(ApiError::store)?;
  Ok(Json(entries))
}

/// `GET /history/export`
pub async fn export<S>(
  State(store): State<Arc<S>>,
  CurrentUser(user_id): CurrentUser,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore + 'static,
{
  let entries = store
    .get_history(user_id)
    .await
    .map_err(ApiError::store)?;

  let disposition = format!("attachment; filename=\"chat_history_{user_id}.csv\"");
  Ok((
    [
      (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
      (header::CONTENT_DISPOSITION, disposition),
    ],
    to_csv(&entries),
  ))
}
