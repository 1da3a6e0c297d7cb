//! JSON REST API for docq.
//!
//! Exposes an axum [`Router`] backed by any [`DocumentStore`]. Everything but
//! `/register` requires HTTP Basic credentials of a registered user. TLS and
//! transport concerns are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", docq_api::api_router(store.clone()))
//! ```

pub mod accounts;
pub mod auth;
pub mod documents;
pub mod error;
pub mod history;
pub mod search;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use docq_core::store::DocumentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: DocumentStore + 'static,
{
  Router::new()
    // Accounts
    .route("/register", post(accounts::register::<S>))
    .route("/login", post(accounts::login))
    // Documents
    .route("/documents", post(documents::upload::<S>))
    .route("/documents/{id}", get(documents::get_one::<S>))
    .route("/documents/{id}/raw", get(documents::get_raw::<S>))
    // Search
    .route("/search", get(search::handler::<S>))
    // History
    .route("/history", get(history::list::<S>))
    .route("/history/export", get(history::export::<S>))
    .with_state(store)
}

// ─── Integration tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode, header},
  };
  use base64::Engine as _;
  use base64::engine::general_purpose::STANDARD as B64;
  use docq_core::history::HistoryEntry;
  use docq_store_sqlite::SqliteStore;
  use serde::de::DeserializeOwned;
  use tower::ServiceExt as _;

  use crate::{
    accounts::UserBody,
    documents::{DocumentView, UploadedBody},
    search::SearchResult,
  };

  async fn make_store() -> Arc<SqliteStore> {
    Arc::new(SqliteStore::open_in_memory().await.unwrap())
  }

  fn auth_header(user: &str, pass: &str) -> String {
    format!("Basic {}", B64.encode(format!("{user}:{pass}")))
  }

  async fn oneshot_raw(
    store:   Arc<SqliteStore>,
    method:  &str,
    uri:     &str,
    headers: Vec<(header::HeaderName, &str)>,
    body:    impl Into<Body>,
  ) -> axum::response::Response {
    let mut builder = Request::builder().method(method).uri(uri);
    for (k, v) in headers {
      builder = builder.header(k, v);
    }
    let req = builder.body(body.into()).unwrap();
    api_router(store).oneshot(req).await.unwrap()
  }

  async fn body_bytes(resp: axum::response::Response) -> Vec<u8> {
    axum::body::to_bytes(resp.into_body(), usize::MAX)
      .await
      .unwrap()
      .to_vec()
  }

  async fn body_json<T: DeserializeOwned>(resp: axum::response::Response) -> T {
    serde_json::from_slice(&body_bytes(resp).await).unwrap()
  }

  async fn register(store: &Arc<SqliteStore>, user: &str, pass: &str) -> axum::response::Response {
    let body = serde_json::json!({ "username": user, "password": pass }).to_string();
    oneshot_raw(
      store.clone(),
      "POST",
      "/register",
      vec![(header::CONTENT_TYPE, "application/json")],
      body,
    )
    .await
  }

  async fn upload(store: &Arc<SqliteStore>, auth: &str, filename: &str, content: &[u8]) -> UploadedBody {
    let resp = oneshot_raw(
      store.clone(),
      "POST",
      &format!("/documents?filename={filename}"),
      vec![(header::AUTHORIZATION, auth), (header::CONTENT_TYPE, "text/plain")],
      content.to_vec(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    body_json(resp).await
  }

  // ── Accounts ─────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_then_login() {
    let store = make_store().await;
    let resp  = register(&store, "alice", "secret").await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let registered: UserBody = body_json(resp).await;

    let auth = auth_header("alice", "secret");
    let resp = oneshot_raw(
      store,
      "POST",
      "/login",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let logged_in: UserBody = body_json(resp).await;
    assert_eq!(logged_in.user_id, registered.user_id);
  }

  #[tokio::test]
  async fn duplicate_registration_returns_409() {
    let store = make_store().await;
    assert_eq!(register(&store, "alice", "a").await.status(), StatusCode::CREATED);
    assert_eq!(register(&store, "alice", "b").await.status(), StatusCode::CONFLICT);
  }

  #[tokio::test]
  async fn empty_credentials_return_400() {
    let store = make_store().await;
    assert_eq!(register(&store, "", "pw").await.status(), StatusCode::BAD_REQUEST);
    assert_eq!(register(&store, "bob", "").await.status(), StatusCode::BAD_REQUEST);
  }

  #[tokio::test]
  async fn wrong_password_returns_401_with_challenge() {
    let store = make_store().await;
    register(&store, "alice", "secret").await;

    let auth = auth_header("alice", "wrong");
    let resp = oneshot_raw(
      store,
      "POST",
      "/login",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    assert!(resp.headers().contains_key(header::WWW_AUTHENTICATE));
  }

  #[tokio::test]
  async fn unauthenticated_requests_return_401() {
    let store = make_store().await;
    for (method, uri) in [
      ("GET", "/history"),
      ("GET", "/search?q=x"),
      ("GET", "/documents/1"),
      ("POST", "/documents?filename=a.txt"),
    ] {
      let resp = oneshot_raw(store.clone(), method, uri, vec![], Body::empty()).await;
      assert_eq!(resp.status(), StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
  }

  // ── Documents ────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn upload_then_lookup_records_history() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    let auth = auth_header("alice", "pw");

    let uploaded = upload(&store, &auth, "notes.txt", b"meeting notes").await;
    let id = uploaded.document_id;

    let resp = oneshot_raw(
      store.clone(),
      "GET",
      &format!("/documents/{id}"),
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let view: DocumentView = body_json(resp).await;
    assert_eq!(view.document_id, id);
    assert_eq!(view.filename, "notes.txt");
    assert_eq!(view.format, "text/plain");
    assert_eq!(view.content, "meeting notes");

    let resp = oneshot_raw(
      store,
      "GET",
      "/history",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    let history: Vec<HistoryEntry> = body_json(resp).await;
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].query, format!("Search by ID: {id}"));
    assert_eq!(history[0].response, "meeting notes");
  }

  #[tokio::test]
  async fn unknown_document_returns_404_and_records_nothing() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    let auth = auth_header("alice", "pw");

    let resp = oneshot_raw(
      store.clone(),
      "GET",
      "/documents/77",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = oneshot_raw(
      store,
      "GET",
      "/history",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    let history: Vec<HistoryEntry> = body_json(resp).await;
    assert!(history.is_empty());
  }

  #[tokio::test]
  async fn raw_download_returns_exact_bytes() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    let auth  = auth_header("alice", "pw");
    let bytes = b"\x89PNG\r\n\x1a\n\xff\x00".to_vec();

    let resp = oneshot_raw(
      store.clone(),
      "POST",
      "/documents?filename=pic.png&format=image/png",
      vec![(header::AUTHORIZATION, auth.as_str())],
      bytes.clone(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let uploaded: UploadedBody = body_json(resp).await;

    let resp = oneshot_raw(
      store,
      "GET",
      &format!("/documents/{}/raw", uploaded.document_id),
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers().get(header::CONTENT_TYPE).unwrap(), "image/png");
    assert_eq!(body_bytes(resp).await, bytes);
  }

  async fn assert_json_400(resp: axum::response::Response) {
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value = body_json(resp).await;
    assert!(body["error"].is_string(), "body: {body}");
  }

  #[tokio::test]
  async fn malformed_request_parts_return_json_400() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    let auth = auth_header("alice", "pw");

    for (method, uri) in [
      ("POST", "/documents"),
      ("GET", "/documents/not-a-number"),
      ("GET", "/documents/abc/raw"),
    ] {
      let resp = oneshot_raw(
        store.clone(),
        method,
        uri,
        vec![(header::AUTHORIZATION, auth.as_str())],
        Body::empty(),
      )
      .await;
      assert_json_400(resp).await;
    }
  }

  #[tokio::test]
  async fn malformed_register_body_returns_json_400() {
    let store = make_store().await;
    let resp = oneshot_raw(
      store,
      "POST",
      "/register",
      vec![(header::CONTENT_TYPE, "application/json")],
      r#"{"username":"alice"}"#,
    )
    .await;
    assert_json_400(resp).await;
  }

  // ── Search ───────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn search_returns_matches_and_records_each_hit() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    let auth = auth_header("alice", "pw");

    let hello = upload(&store, &auth, "hello.txt", b"hello world").await;
    upload(&store, &auth, "bye.txt", b"goodbye").await;
    let again = upload(&store, &auth, "again.txt", b"Hello again").await;

    let resp = oneshot_raw(
      store.clone(),
      "GET",
      "/search?q=HELLO",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let results: Vec<SearchResult> = body_json(resp).await;
    let ids: Vec<_> = results.iter().map(|r| r.document_id).collect();
    assert_eq!(ids, vec![hello.document_id, again.document_id]);
    assert_eq!(results[0].snippet, "hello world");

    let resp = oneshot_raw(
      store,
      "GET",
      "/history",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    let history: Vec<HistoryEntry> = body_json(resp).await;
    assert_eq!(history.len(), 2);
    assert!(history.iter().all(|e| e.query == "HELLO"));
    assert_eq!(history[1].response, "Hello again");
  }

  #[tokio::test]
  async fn search_without_query_returns_400() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    let auth = auth_header("alice", "pw");

    for uri in ["/search", "/search?q="] {
      let resp = oneshot_raw(
        store.clone(),
        "GET",
        uri,
        vec![(header::AUTHORIZATION, auth.as_str())],
        Body::empty(),
      )
      .await;
      assert_eq!(resp.status(), StatusCode::BAD_REQUEST, "{uri}");
    }
  }

  // ── History ──────────────────────────────────────────────────────────────────

  #[tokio::test]
  async fn history_export_is_csv_attachment() {
    let store = make_store().await;
    let resp = register(&store, "alice", "pw").await;
    let user: UserBody = body_json(resp).await;
    let auth = auth_header("alice", "pw");

    upload(&store, &auth, "a.txt", b"needle, in a haystack").await;
    oneshot_raw(
      store.clone(),
      "GET",
      "/search?q=needle",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;

    let resp = oneshot_raw(
      store,
      "GET",
      "/history/export",
      vec![(header::AUTHORIZATION, auth.as_str())],
      Body::empty(),
    )
    .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let ct = resp.headers().get(header::CONTENT_TYPE).unwrap().to_str().unwrap();
    assert!(ct.starts_with("text/csv"), "Content-Type: {ct}");
    let cd = resp.headers().get(header::CONTENT_DISPOSITION).unwrap().to_str().unwrap();
    assert!(cd.contains(&format!("chat_history_{}.csv", user.user_id)), "{cd}");

    let csv = String::from_utf8(body_bytes(resp).await).unwrap();
    let lines: Vec<&str> = csv.lines().collect();
    assert_eq!(lines[0], "ID,User ID,Query,Response,Timestamp");
    assert_eq!(lines.len(), 2);
    assert!(lines[1].contains("\"needle, in a haystack\""), "{}", lines[1]);
  }

  #[tokio::test]
  async fn history_is_scoped_to_caller() {
    let store = make_store().await;
    register(&store, "alice", "pw").await;
    register(&store, "bob", "pw").await;
    let alice = auth_header("alice", "pw");
    let bob   = auth_header("bob", "pw");

    let doc = upload(&store, &alice, "a.txt", b"shared text").await;
    oneshot_raw(
      store.clone(),
      "GET",
      &format!("/documents/{}", doc.document_id),
      vec![(header::AUTHORIZATION, bob.as_str())],
      Body::empty(),
    )
    .await;

    let resp = oneshot_raw(
      store.clone(),
      "GET",
      "/history",
      vec![(header::AUTHORIZATION, alice.as_str())],
      Body::empty(),
    )
    .await;
    let alice_history: Vec<HistoryEntry> = body_json(resp).await;
    assert!(alice_history.is_empty());

    let resp = oneshot_raw(
      store,
      "GET",
      "/history",
      vec![(header::AUTHORIZATION, bob.as_str())],
      Body::empty(),
    )
    .await;
    let bob_history: Vec<HistoryEntry> = body_json(resp).await;
    assert_eq!(bob_history.len(), 1);
  }
}
