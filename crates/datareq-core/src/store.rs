//! The `RequestStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `datareq-store-sqlite`
//! and the in-memory [`MemoryStore`](crate::memory::MemoryStore)). The
//! lifecycle manager depends on this abstraction, not on any concrete backend.

use std::future::Future;

use crate::request::{NewRequest, Request, RequestId, RequestStatus};

/// Precondition attached to a status update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusGuard {
  /// Overwrite whatever status the request currently has.
  Unconditional,
  /// Only update while the request is still [`RequestStatus::Pending`].
  OnlyIfPending,
}

impl StatusGuard {
  /// Whether a request currently in `current` may be updated.
  pub fn permits(self, current: RequestStatus) -> bool {
    match self {
      Self::Unconditional => true,
      Self::OnlyIfPending => !current.is_terminal(),
    }
  }
}

/// Abstraction over a request store backend.
///
/// Requests are never deleted; the only mutation after insertion is
/// [`set_status`](RequestStore::set_status).
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RequestStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Persist a new request. The store assigns `id` and `created_at`, and the
  /// status is always [`RequestStatus::Pending`].
  fn insert(
    &self,
    input: NewRequest,
  ) -> impl Future<Output = Result<Request, Self::Error>> + Send + '_;

  /// Retrieve a request by id. Returns `None` if not found.
  fn get(
    &self,
    id: RequestId,
  ) -> impl Future<Output = Result<Option<Request>, Self::Error>> + Send + '_;

  /// Set the status of a request in a single atomic step.
  ///
  /// Returns `false` when no row was changed: either the id does not exist or
  /// `guard` did not permit the update.
  fn set_status(
    &self,
    id: RequestId,
    status: RequestStatus,
    guard: StatusGuard,
  ) -> impl Future<Output = Result<bool, Self::Error>> + Send + '_;

  /// All requests, most recently created (highest id) first.
  fn list(
    &self,
  ) -> impl Future<Output = Result<Vec<Request>, Self::Error>> + Send + '_;
}
