//! Encoding and decoding helpers between domain types and the plain values
//! stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings. Ids are the tables' integer
//! row ids.

use chrono::{DateTime, Utc};
use docq_core::{
  account::UserId,
  document::{Document, DocumentId},
  history::{HistoryEntry, HistoryId},
};
use rusqlite::types::ValueRef;

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Content ─────────────────────────────────────────────────────────────────

/// The bytes of a `content` cell, or `None` if the cell holds something
/// other than a blob or text (SQLite does not enforce column types).
pub fn content_bytes(value: ValueRef<'_>) -> Option<&[u8]> {
  match value {
    ValueRef::Blob(b) | ValueRef::Text(b) => Some(b),
    ValueRef::Null | ValueRef::Integer(_) | ValueRef::Real(_) => None,
  }
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Raw values read directly from a `documents` row.
pub struct RawDocument {
  pub id:       i64,
  pub user_id:  i64,
  pub filename: String,
  /// `None` when the cell holds neither a blob nor text.
  pub content:  Option<Vec<u8>>,
  pub format:   String,
}

impl RawDocument {
  /// `None` if the content cell could not be read as bytes.
  pub fn into_document(self) -> Option<Document> {
    Some(Document {
      document_id: DocumentId(self.id),
      user_id:     UserId(self.user_id),
      filename:    self.filename,
      content:     self.content?,
      format:      self.format,
    })
  }
}

/// Raw values read directly from a `user_history` row.
pub struct RawHistoryEntry {
  pub id:        i64,
  pub user_id:   i64,
  pub query:     String,
  pub response:  String,
  pub timestamp: String,
}

impl RawHistoryEntry {
  pub fn into_entry(self) -> Result<HistoryEntry> {
    Ok(HistoryEntry {
      history_id: HistoryId(self.id),
      user_id:    UserId(self.user_id),
      query:      self.query,
      response:   self.response,
      timestamp:  decode_dt(&self.timestamp)?,
    })
  }
}
