//! Error types for `datareq-core`.

use thiserror::Error;

use crate::request::{RequestId, RequestStatus};

#[derive(Debug, Error)]
pub enum Error {
  /// A required field was missing or blank.
  #[error("invalid {field}: {reason}")]
  Validation {
    field:  &'static str,
    reason: String,
  },

  #[error("request not found: {0}")]
  NotFound(RequestId),

  /// Only raised under [`TransitionPolicy::FirstDecisionWins`](crate::lifecycle::TransitionPolicy).
  #[error("request {id} is no longer pending (status: {status})")]
  AlreadyDecided {
    id:     RequestId,
    status: RequestStatus,
  },

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  pub(crate) fn missing(field: &'static str) -> Self {
    Self::Validation { field, reason: "must not be empty".to_owned() }
  }

  pub(crate) fn store<E>(e: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(e))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
