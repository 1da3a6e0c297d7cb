//! [`SqliteStore`] — the SQLite implementation of [`DocumentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::{ErrorCode, OptionalExtension as _};

use docq_core::{
  account::{Registration, UserId},
  document::{Document, DocumentId, NewDocument},
  history::{HistoryEntry, HistoryId},
  search::{SNIPPET_CHARS, SearchHit, SubstringMatcher, decode_text, snippet},
  store::DocumentStore,
};

use crate::{
  Result,
  encode::{RawDocument, RawHistoryEntry, content_bytes, encode_dt},
  password::{hash_password, verify_password},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A docq store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted. Each
/// operation is one `call` on the connection thread; statements run under
/// SQLite's default locking with no application-level transactions.
#[derive(Clone)]
pub struct SqliteStore {
  pub(crate) conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Create any missing tables. Safe to run against an existing database.
  pub(crate) async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
  matches!(
    err,
    rusqlite::Error::SqliteFailure(e, _)
      if e.code == ErrorCode::ConstraintViolation
        && e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
  )
}

// ─── DocumentStore impl ──────────────────────────────────────────────────────

impl DocumentStore for SqliteStore {
  type Error = crate::Error;

  // ── Accounts ──────────────────────────────────────────────────────────────

  async fn register(&self, username: &str, password: &str) -> Result<Registration> {
    let username = username.to_owned();
    let phc      = hash_password(password)?;

    let outcome = self
      .conn
      .call(move |conn| {
        match conn.execute(
          "INSERT INTO users (username, password_hash) VALUES (?1, ?2)",
          rusqlite::params![username, phc],
        ) {
          Ok(_) => Ok(Registration::Registered(UserId(conn.last_insert_rowid()))),
          Err(e) if is_unique_violation(&e) => Ok(Registration::UsernameTaken),
          Err(e) => Err(e.into()),
        }
      })
      .await?;

    Ok(outcome)
  }

  async fn authenticate(&self, username: &str, password: &str) -> Result<Option<UserId>> {
    let username = username.to_owned();

    let row: Option<(i64, String)> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, password_hash FROM users WHERE username = ?1",
            rusqlite::params![username],
            |r| Ok((r.get(0)?, r.get(1)?)),
          )
          .optional()?)
      })
      .await?;

    let Some((id, phc)) = row else {
      return Ok(None);
    };

    Ok(verify_password(password, &phc)?.then_some(UserId(id)))
  }

  // ── Documents ─────────────────────────────────────────────────────────────

  async fn insert_document(&self, input: NewDocument) -> Result<DocumentId> {
    let NewDocument { user_id, filename, content, format } = input;

    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO documents (user_id, filename, content, format)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id.0, filename, content, format],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(DocumentId(id))
  }

  async fn get_document(&self, id: DocumentId) -> Result<Option<Document>> {
    let raw: Option<RawDocument> = self
      .conn
      .call(move |conn| {
        Ok(conn
          .query_row(
            "SELECT id, user_id, filename, content, format FROM documents WHERE id = ?1",
            rusqlite::params![id.0],
            |row| {
              Ok(RawDocument {
                id:       row.get(0)?,
                user_id:  row.get(1)?,
                filename: row.get(2)?,
                content:  content_bytes(row.get_ref(3)?).map(<[u8]>::to_vec),
                format:   row.get(4)?,
              })
            },
          )
          .optional()?)
      })
      .await?;

    let Some(raw) = raw else {
      return Ok(None);
    };
    if raw.content.is_none() {
      // Same rows search skips; a lookup treats them as absent.
      tracing::warn!(
        document_id = raw.id,
        filename = %raw.filename,
        "document content is not text or bytes"
      );
    }
    Ok(raw.into_document())
  }

  // ── Search ────────────────────────────────────────────────────────────────

  async fn search(&self, query: &str) -> Result<Vec<SearchHit>> {
    let matcher = SubstringMatcher::new(query);

    let hits = self
      .conn
      .call(move |conn| {
        // Full scan; decoding and matching happen here so only hits leave
        // the connection thread.
        let mut stmt =
          conn.prepare("SELECT id, filename, content FROM documents ORDER BY id")?;
        let mut rows = stmt.query([])?;

        let mut hits = Vec::new();
        while let Some(row) = rows.next()? {
          let id: i64          = row.get(0)?;
          let filename: String = row.get(1)?;
          let Some(bytes) = content_bytes(row.get_ref(2)?) else {
            tracing::warn!(
              document_id = id,
              %filename,
              "skipping document whose content is not text or bytes"
            );
            continue;
          };

          let text = decode_text(bytes);
          if matcher.matches(&text) {
            hits.push(SearchHit { document_id: DocumentId(id), filename, text });
          }
        }
        Ok(hits)
      })
      .await?;

    Ok(hits)
  }

  // ── History ───────────────────────────────────────────────────────────────

  async fn record(
    &self,
    user_id:  UserId,
    query:    &str,
    response: &str,
  ) -> Result<HistoryEntry> {
    let query     = query.to_owned();
    let response  = snippet(response, SNIPPET_CHARS).to_owned();
    let timestamp = Utc::now();
    let ts_str    = encode_dt(timestamp);

    let (q, r) = (query.clone(), response.clone());
    let id = self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO user_history (user_id, query, response, timestamp)
           VALUES (?1, ?2, ?3, ?4)",
          rusqlite::params![user_id.0, q, r, ts_str],
        )?;
        Ok(conn.last_insert_rowid())
      })
      .await?;

    Ok(HistoryEntry {
      history_id: HistoryId(id),
      user_id,
      query,
      response,
      timestamp,
    })
  }

  async fn get_history(&self, user_id: UserId) -> Result<Vec<HistoryEntry>> {
    let raws: Vec<RawHistoryEntry> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(
          "SELECT id, user_id, query, response, timestamp
           FROM user_history
           WHERE user_id = ?1
           ORDER BY id",
        )?;
        let rows = stmt
          .query_map(rusqlite::params![user_id.0], |row| {
            Ok(RawHistoryEntry {
              id:        row.get(0)?,
              user_id:   row.get(1)?,
              query:     row.get(2)?,
              response:  row.get(3)?,
              timestamp: row.get(4)?,
            })
          })?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawHistoryEntry::into_entry).collect()
  }
}
