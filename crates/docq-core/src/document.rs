//! Uploaded documents.
//!
//! Content is kept as the exact bytes that were uploaded. The declared format
//! is free text supplied by the uploader and is never checked against the
//! bytes; no format-specific parsing happens anywhere.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{account::UserId, search::decode_text};

/// Store-assigned identifier of an uploaded document.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct DocumentId(pub i64);

impl fmt::Display for DocumentId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// Input to [`DocumentStore::insert_document`](crate::store::DocumentStore::insert_document).
#[derive(Debug, Clone)]
pub struct NewDocument {
  /// Owner of the document. Not checked against the users table.
  pub user_id:  UserId,
  pub filename: String,
  pub content:  Vec<u8>,
  /// MIME type or extension as declared by the uploader.
  pub format:   String,
}

/// A stored document. Immutable once written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
  pub document_id: DocumentId,
  pub user_id:     UserId,
  pub filename:    String,
  pub content:     Vec<u8>,
  pub format:      String,
}

impl Document {
  /// The content decoded as UTF-8, with undecodable sequences dropped.
  pub fn text(&self) -> String { decode_text(&self.content) }
}
