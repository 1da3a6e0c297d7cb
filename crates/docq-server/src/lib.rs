//! HTTP server assembly for docq.
//!
//! Loads [`ServerConfig`] and mounts the JSON API from `docq-api` under
//! `/api`, wrapped in request tracing and the configured body limit.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use anyhow::Context as _;
use axum::{Router, extract::DefaultBodyLimit};
use docq_store_sqlite::SqliteStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `DOCQ_*` environment variables.
#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
  pub host:             String,
  pub port:             u16,
  pub store_path:       PathBuf,
  /// Largest accepted request body in bytes. Unlimited when unset.
  pub max_upload_bytes: Option<usize>,
}

/// Read configuration from `path` (optional) layered under the environment.
pub fn load_config(path: &Path) -> anyhow::Result<ServerConfig> {
  let settings = config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8501_i64)?
    .set_default("store_path", "document_query_app.db")?
    .add_source(config::File::from(path.to_path_buf()).required(false))
    .add_source(config::Environment::with_prefix("DOCQ"))
    .build()
    .context("failed to read config file")?;

  let mut cfg: ServerConfig = settings
    .try_deserialize()
    .context("failed to deserialise ServerConfig")?;
  cfg.store_path = expand_tilde(&cfg.store_path);
  Ok(cfg)
}

/// Expand a leading `~` to the user's home directory.
fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Router ───────────────────────────────────────────────────────────────────

/// Build the complete application router.
pub fn app(store: Arc<SqliteStore>, config: &ServerConfig) -> Router {
  let body_limit = match config.max_upload_bytes {
    Some(max) => DefaultBodyLimit::max(max),
    None => DefaultBodyLimit::disable(),
  };

  Router::new()
    .nest("/api", docq_api::api_router(store))
    .layer(body_limit)
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use docq_core::store::DocumentStore;
  use tower::ServiceExt as _;

  fn config(max_upload_bytes: Option<usize>) -> ServerConfig {
    ServerConfig {
      host: "127.0.0.1".to_string(),
      port: 8501,
      store_path: PathBuf::from(":memory:"),
      max_upload_bytes,
    }
  }

  async fn store_with_user() -> (Arc<SqliteStore>, String) {
    use base64::Engine as _;
    let store = SqliteStore::open_in_memory().await.unwrap();
    store.register("alice", "pw").await.unwrap();
    let auth = format!(
      "Basic {}",
      base64::engine::general_purpose::STANDARD.encode("alice:pw")
    );
    (Arc::new(store), auth)
  }

  fn upload_request(auth: &str, size: usize) -> Request<Body> {
    Request::builder()
      .method("POST")
      .uri("/api/documents?filename=big.txt")
      .header(header::AUTHORIZATION, auth)
      .body(Body::from(vec![b'a'; size]))
      .unwrap()
  }

  #[test]
  fn missing_config_file_uses_defaults() {
    let cfg = load_config(Path::new("/nonexistent/docq-config.toml")).unwrap();
    assert_eq!(cfg.host, "127.0.0.1");
    assert_eq!(cfg.port, 8501);
    assert_eq!(cfg.store_path, PathBuf::from("document_query_app.db"));
    assert_eq!(cfg.max_upload_bytes, None);
  }

  #[test]
  fn tilde_is_expanded() {
    let Ok(home) = std::env::var("HOME") else { return };
    assert_eq!(
      expand_tilde(Path::new("~/docq.db")),
      PathBuf::from(home).join("docq.db")
    );
    assert_eq!(expand_tilde(Path::new("/abs/docq.db")), PathBuf::from("/abs/docq.db"));
  }

  #[tokio::test]
  async fn api_is_nested_under_prefix() {
    let (store, _) = store_with_user().await;
    let req = Request::builder()
      .method("POST")
      .uri("/api/register")
      .header(header::CONTENT_TYPE, "application/json")
      .body(Body::from(r#"{"username":"bob","password":"pw"}"#))
      .unwrap();
    let resp = app(store, &config(None)).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn uploads_beyond_default_limit_are_accepted_when_unlimited() {
    let (store, auth) = store_with_user().await;
    let resp = app(store, &config(None))
      .oneshot(upload_request(&auth, 3 * 1024 * 1024))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);
  }

  #[tokio::test]
  async fn configured_limit_rejects_large_uploads() {
    let (store, auth) = store_with_user().await;
    let resp = app(store, &config(Some(1024)))
      .oneshot(upload_request(&auth, 4096))
      .await
      .unwrap();
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
  }
}
