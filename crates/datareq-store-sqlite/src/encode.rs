//! Encoding and decoding helpers between domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings and statuses by their display
//! name.

use chrono::{DateTime, Utc};
use datareq_core::request::{Request, RequestId, RequestStatus, RequestType};

use crate::{Error, Result};

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── RequestStatus ───────────────────────────────────────────────────────────

pub fn encode_status(s: RequestStatus) -> &'static str { s.as_str() }

pub fn decode_status(s: &str) -> Result<RequestStatus> {
  RequestStatus::parse(s).ok_or_else(|| Error::UnknownStatus(s.to_owned()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawRequest::from_row`].
pub const REQUEST_COLUMNS: &str = "id, requester_name, requester_email, \
  request_type, authorized_by, authorized_email, requested_date, notes, \
  status, created_at";

/// Raw values read directly from a `requests` row.
pub struct RawRequest {
  pub id:               i64,
  pub requester_name:   String,
  pub requester_email:  String,
  pub request_type:     String,
  pub authorized_by:    String,
  pub authorized_email: String,
  pub requested_date:   String,
  pub notes:            Option<String>,
  pub status:           String,
  pub created_at:       String,
}

impl RawRequest {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      id:               row.get(0)?,
      requester_name:   row.get(1)?,
      requester_email:  row.get(2)?,
      request_type:     row.get(3)?,
      authorized_by:    row.get(4)?,
      authorized_email: row.get(5)?,
      requested_date:   row.get(6)?,
      notes:            row.get(7)?,
      status:           row.get(8)?,
      created_at:       row.get(9)?,
    })
  }

  pub fn into_request(self) -> Result<Request> {
    Ok(Request {
      id:               RequestId(self.id),
      requester_name:   self.requester_name,
      requester_email:  self.requester_email,
      request_type:     RequestType(self.request_type),
      authorized_by:    self.authorized_by,
      authorized_email: self.authorized_email,
      requested_date:   self.requested_date,
      notes:            self.notes,
      status:           decode_status(&self.status)?,
      created_at:       decode_dt(&self.created_at)?,
    })
  }
}
