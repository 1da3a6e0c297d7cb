//! The per-user query history log and its CSV export.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::account::UserId;

/// Store-assigned identifier of a history entry.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct HistoryId(pub i64);

impl fmt::Display for HistoryId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

/// One recorded interaction: what the user asked and the snippet they were
/// shown. Entries are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
  pub history_id: HistoryId,
  pub user_id:    UserId,
  pub query:      String,
  /// At most [`SNIPPET_CHARS`](crate::search::SNIPPET_CHARS) characters.
  pub response:   String,
  /// Server-assigned at write time.
  pub timestamp:  DateTime<Utc>,
}

/// Header row of the CSV export.
pub const CSV_HEADER: [&str; 5] = ["ID", "User ID", "Query", "Response", "Timestamp"];

/// Render `entries` as a CSV table, one row per entry, header first.
pub fn to_csv(entries: &[HistoryEntry]) -> String {
  let mut out = String::new();
  push_row(&mut out, CSV_HEADER.iter().copied());
  for e in entries {
    let id = e.history_id.to_string();
    let user = e.user_id.to_string();
    let ts = e.timestamp.to_rfc3339();
    push_row(&mut out, [id.as_str(), user.as_str(), &e.query, &e.response, &ts]);
  }
  out
}

fn push_row<'a>(out: &mut String, fields: impl IntoIterator<Item = &'a str>) {
  for (i, field) in fields.into_iter().enumerate() {
    if i > 0 {
      out.push(',');
    }
    push_field(out, field);
  }
  out.push('\n');
}

/// Quote only when needed; embedded quotes are doubled.
fn push_field(out: &mut String, field: &str) {
  if field.contains([',', '"', '\n', '\r']) {
    out.push('"');
    out.push_str(&field.replace('"', "\"\""));
    out.push('"');
  } else {
    out.push_str(field);
  }
}
