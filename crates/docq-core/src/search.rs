//! Plain-text search helpers.
//!
//! Matching is a case-insensitive substring test over the decoded document
//! text. There is no tokenisation, index or ranking; backends scan every
//! document and keep the ones that match, in storage order.

use serde::Serialize;

use crate::document::DocumentId;

/// Maximum number of characters of a document shown to a user or written to
/// the history log.
pub const SNIPPET_CHARS: usize = 500;

/// A document that matched a search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SearchHit {
  pub document_id: DocumentId,
  pub filename:    String,
  /// The full decoded text of the document.
  pub text:        String,
}

/// Decode `bytes` as UTF-8, dropping any invalid sequences.
///
/// This never fails: a document that is mostly binary decodes to whatever
/// valid fragments it contains, possibly the empty string.
pub fn decode_text(bytes: &[u8]) -> String {
  let mut out = String::with_capacity(bytes.len());
  for chunk in bytes.utf8_chunks() {
    out.push_str(chunk.valid());
  }
  out
}

/// Case-insensitive substring matcher. The query is lowercased once so a
/// full scan only lowercases each document.
#[derive(Debug, Clone)]
pub struct SubstringMatcher {
  needle: String,
}

impl SubstringMatcher {
  pub fn new(query: &str) -> Self {
    Self { needle: query.to_lowercase() }
  }

  pub fn matches(&self, text: &str) -> bool {
    text.to_lowercase().contains(&self.needle)
  }
}

/// The first `max_chars` characters of `text`.
pub fn snippet(text: &str, max_chars: usize) -> &str {
  match text.char_indices().nth(max_chars) {
    Some((end, _)) => &text[..end],
    None => text,
  }
}
