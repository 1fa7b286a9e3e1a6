//! [`SqliteStore`], the SQLite implementation of [`RequestStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;

use datareq_core::{
  request::{NewRequest, Request, RequestId, RequestStatus},
  store::{RequestStore, StatusGuard},
};

use crate::{
  Error, Result,
  encode::{REQUEST_COLUMNS, RawRequest, encode_dt, encode_status},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A request store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  /// Missing parent directories are created.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let path = path.as_ref();
    if let Some(parent) = path.parent()
      && !parent.as_os_str().is_empty()
    {
      tokio::fs::create_dir_all(parent).await?;
    }
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    tracing::debug!(path = %path.display(), "opened request store");
    Ok(store)
  }

  /// Open an in-memory store, useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
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

// ─── RequestStore impl ───────────────────────────────────────────────────────

impl RequestStore for SqliteStore {
  type Error = Error;

  async fn insert(&self, input: NewRequest) -> Result<Request> {
    let created_at = encode_dt(Utc::now());

    // `status` is left to the column default so every row starts Pending.
    let raw: RawRequest = self
      .conn
      .call(move |conn| {
        Ok(conn.query_row(
          &format!(
            "INSERT INTO requests (
               requester_name, requester_email, request_type, requested_date,
               authorized_by, authorized_email, notes, created_at
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
             RETURNING {REQUEST_COLUMNS}"
          ),
          rusqlite::params![
            input.requester_name,
            input.requester_email,
            input.request_type.0,
            input.requested_date,
            input.authorized_by,
            input.authorized_email,
            input.notes,
            created_at,
          ],
          RawRequest::from_row,
        )?)
      })
      .await?;

    raw.into_request()
  }

  async fn get(&self, id: RequestId) -> Result<Option<Request>> {
    let raw: Option<RawRequest> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!("SELECT {REQUEST_COLUMNS} FROM requests WHERE id = ?1"),
              rusqlite::params![id.0],
              RawRequest::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawRequest::into_request).transpose()
  }

  async fn set_status(
    &self,
    id:     RequestId,
    status: RequestStatus,
    guard:  StatusGuard,
  ) -> Result<bool> {
    let status_str = encode_status(status);
    let sql = match guard {
      StatusGuard::Unconditional => {
        "UPDATE requests SET status = ?1 WHERE id = ?2"
      }
      StatusGuard::OnlyIfPending => {
        "UPDATE requests SET status = ?1 WHERE id = ?2 AND status = 'Pending'"
      }
    };

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(sql, rusqlite::params![status_str, id.0])?)
      })
      .await?;

    Ok(changed > 0)
  }

  async fn list(&self) -> Result<Vec<Request>> {
    let raws: Vec<RawRequest> = self
      .conn
      .call(|conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {REQUEST_COLUMNS} FROM requests ORDER BY id DESC"
        ))?;
        let rows = stmt
          .query_map([], RawRequest::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawRequest::into_request).collect()
  }
}
