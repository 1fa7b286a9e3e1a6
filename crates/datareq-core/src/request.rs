//! The request entity and its creation input.
//!
//! A request is written once by the creation operation and afterwards only its
//! `status` changes. The approver identity is derived from the request type a
//! single time, when the [`NewRequest`] is built, and stored alongside it.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Approver name used when the request type carries no approver.
pub const UNKNOWN_APPROVER: &str = "Unknown";

/// Approver address used when the request type carries no approver.
pub const NO_APPROVER_EMAIL: &str = "no-email";

// ─── Identity ────────────────────────────────────────────────────────────────

/// Store-assigned identifier of a request.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct RequestId(pub i64);

impl fmt::Display for RequestId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { self.0.fmt(f) }
}

// ─── Status ──────────────────────────────────────────────────────────────────

/// Where a request is in its lifecycle.
///
/// ```text
///         approve
/// Pending -------> Approved
///         reject
/// Pending -------> Rejected
/// ```
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
pub enum RequestStatus {
  #[default]
  Pending,
  Approved,
  Rejected,
}

impl RequestStatus {
  /// The string stored in the `status` column and sent over the API.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Pending => "Pending",
      Self::Approved => "Approved",
      Self::Rejected => "Rejected",
    }
  }

  pub fn parse(s: &str) -> Option<Self> {
    match s {
      "Pending" => Some(Self::Pending),
      "Approved" => Some(Self::Approved),
      "Rejected" => Some(Self::Rejected),
      _ => None,
    }
  }

  pub fn is_terminal(self) -> bool { !matches!(self, Self::Pending) }
}

impl fmt::Display for RequestStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// The approver's verdict on a pending request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
  Approve,
  Reject,
}

impl Decision {
  /// The status a request ends up in after this decision.
  pub fn target_status(self) -> RequestStatus {
    match self {
      Self::Approve => RequestStatus::Approved,
      Self::Reject => RequestStatus::Rejected,
    }
  }

  /// Past-tense verb used in messages, e.g. "approved".
  pub fn past_tense(self) -> &'static str {
    match self {
      Self::Approve => "approved",
      Self::Reject => "rejected",
    }
  }

  /// Path segment of the action link, e.g. `approve`.
  pub fn action(self) -> &'static str {
    match self {
      Self::Approve => "approve",
      Self::Reject => "reject",
    }
  }
}

// ─── Request type and approver ───────────────────────────────────────────────

/// The selected request type, encoded as `"<approver name>:<approver email>"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestType(pub String);

impl RequestType {
  /// Encode an explicit approver selection.
  pub fn for_approver(name: &str, email: &str) -> Self {
    Self(format!("{name}:{email}"))
  }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Split on the first `:`. Missing or empty halves fall back to
  /// [`UNKNOWN_APPROVER`] and [`NO_APPROVER_EMAIL`].
  pub fn approver(&self) -> Approver {
    let (name, email) = self.0.split_once(':').unwrap_or(("", ""));
    let or = |s: &str, fallback: &str| {
      if s.is_empty() { fallback.to_owned() } else { s.to_owned() }
    };
    Approver {
      name:  or(name, UNKNOWN_APPROVER),
      email: or(email, NO_APPROVER_EMAIL),
    }
  }
}

impl fmt::Display for RequestType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.0)
  }
}

/// Who is authorized to decide a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Approver {
  pub name:  String,
  pub email: String,
}

impl Approver {
  /// `true` when no address could be derived from the request type.
  pub fn is_unknown(&self) -> bool { self.email == NO_APPROVER_EMAIL }
}

// ─── Request ─────────────────────────────────────────────────────────────────

/// A persisted data request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
  pub id:               RequestId,
  pub requester_name:   String,
  pub requester_email:  String,
  pub request_type:     RequestType,
  pub authorized_by:    String,
  pub authorized_email: String,
  pub requested_date:   String,
  pub notes:            Option<String>,
  pub status:           RequestStatus,
  /// Store-assigned; never changes after creation.
  pub created_at:       DateTime<Utc>,
}

impl Request {
  pub fn approver(&self) -> Approver {
    Approver {
      name:  self.authorized_by.clone(),
      email: self.authorized_email.clone(),
    }
  }
}

// ─── Creation input ──────────────────────────────────────────────────────────

/// Caller-supplied fields of a new request, as received from the form.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CreateRequest {
  pub requester_name:  String,
  pub requester_email: String,
  pub request_type:    String,
  pub requested_date:  String,
  #[serde(default)]
  pub notes:           Option<String>,
}

/// A validated request ready for insertion.
///
/// Has no `status` field: the store always records new requests as
/// [`RequestStatus::Pending`]. `id` and `created_at` are assigned by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewRequest {
  pub requester_name:   String,
  pub requester_email:  String,
  pub request_type:     RequestType,
  pub authorized_by:    String,
  pub authorized_email: String,
  pub requested_date:   String,
  pub notes:            Option<String>,
}

impl TryFrom<CreateRequest> for NewRequest {
  type Error = Error;

  fn try_from(input: CreateRequest) -> Result<Self> {
    require("requester_name", &input.requester_name)?;
    require("requester_email", &input.requester_email)?;
    require("request_type", &input.request_type)?;
    require("requested_date", &input.requested_date)?;

    let request_type = RequestType(input.request_type);
    let Approver { name, email } = request_type.approver();

    Ok(Self {
      requester_name: input.requester_name,
      requester_email: input.requester_email,
      request_type,
      authorized_by: name,
      authorized_email: email,
      requested_date: input.requested_date,
      notes: input.notes,
    })
  }
}

fn require(field: &'static str, value: &str) -> Result<()> {
  if value.trim().is_empty() {
    return Err(Error::missing(field));
  }
  Ok(())
}
