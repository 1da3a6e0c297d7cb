//! The `DocumentStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `docq-store-sqlite`).
//! Higher layers (`docq-api`, `docq-server`) depend on this abstraction, not
//! on any concrete backend.
//!
//! Expected outcomes are values: a taken username is
//! [`Registration::UsernameTaken`], bad credentials and unknown ids are
//! `None`, a user with no history gets an empty `Vec`. `Self::Error` is
//! reserved for backend failures.

use std::future::Future;

use crate::{
  account::{Registration, UserId},
  document::{Document, DocumentId, NewDocument},
  history::HistoryEntry,
  search::SearchHit,
};

/// Abstraction over a docq storage backend.
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait DocumentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  // ── Accounts ──────────────────────────────────────────────────────────

  /// Create a user. Only a salted hash of `password` is persisted.
  fn register<'a>(
    &'a self,
    username: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Registration, Self::Error>> + Send + 'a;

  /// Return the id of the user with exactly this username whose password
  /// verifies, or `None`.
  fn authenticate<'a>(
    &'a self,
    username: &'a str,
    password: &'a str,
  ) -> impl Future<Output = Result<Option<UserId>, Self::Error>> + Send + 'a;

  // ── Documents ─────────────────────────────────────────────────────────

  /// Store the document bytes verbatim and return the new id.
  fn insert_document(
    &self,
    input: NewDocument,
  ) -> impl Future<Output = Result<DocumentId, Self::Error>> + Send + '_;

  /// Retrieve a document by id. Returns `None` if not found.
  fn get_document(
    &self,
    id: DocumentId,
  ) -> impl Future<Output = Result<Option<Document>, Self::Error>> + Send + '_;

  // ── Search ────────────────────────────────────────────────────────────

  /// Every document whose decoded text contains `query`, ignoring case, in
  /// insertion order.
  fn search<'a>(
    &'a self,
    query: &'a str,
  ) -> impl Future<Output = Result<Vec<SearchHit>, Self::Error>> + Send + 'a;

  // ── History ───────────────────────────────────────────────────────────

  /// Append a history entry. The response is truncated to
  /// [`SNIPPET_CHARS`](crate::search::SNIPPET_CHARS) characters and the
  /// timestamp is set by the store.
  fn record<'a>(
    &'a self,
    user_id: UserId,
    query: &'a str,
    response: &'a str,
  ) -> impl Future<Output = Result<HistoryEntry, Self::Error>> + Send + 'a;

  /// All history entries for `user_id`, oldest first.
  fn get_history(
    &self,
    user_id: UserId,
  ) -> impl Future<Output = Result<Vec<HistoryEntry>, Self::Error>> + Send + '_;
}
