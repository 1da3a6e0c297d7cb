//! Handlers for account endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `POST` | `/register` | Body: `{"username":"…","password":"…"}`; 201, or 409 if taken |
//! | `POST` | `/login` | Basic auth; returns the caller's id |

use std::sync::Arc;

use axum::{
  Json,
  extract::{State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use docq_core::{
  account::{Registration, UserId},
  store::DocumentStore,
};
use serde::{Deserialize, Serialize};

use crate::{auth::CurrentUser, error::ApiError};

#[derive(Debug, Deserialize)]
pub struct RegisterBody {
  pub username: String,
  pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct UserBody {
  pub user_id: UserId,
}

/// `POST /register`
pub async fn register<S>(
  State(store): State<Arc<S>>,
  body: Result<Json<RegisterBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: DocumentStore,
{
  let Json(body) = body?;
  if body.username.is_empty() || body.password.is_empty() {
    return Err(ApiError::BadRequest(
      "username and password must not be empty".into(),
    ));
  }

  match store
    .register(&body.username, &body.password)
    .await
    .map_err(ApiError::store)?
  {
    Registration::Registered(user_id) => {
      tracing::info!(%user_id, username = %body.username, "registered user");
      Ok((StatusCode::CREATED, Json(UserBody { user_id })))
    }
    Registration::UsernameTaken => Err(ApiError::Conflict(format!(
      "username {:?} already exists",
      body.username
    ))),
  }
}

/// `POST /login` — succeeds only if the Basic credentials verify.
pub async fn login(CurrentUser(user_id): CurrentUser) -> Json<UserBody> {
  Json(UserBody { user_id })
}
