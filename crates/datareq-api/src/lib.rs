//! HTTP API for the datareq workflow.
//!
//! Exposes an axum [`Router`] backed by a [`LifecycleManager`] over any
//! [`RequestStore`] and [`Notifier`]. TLS and transport concerns are the
//! caller's responsibility. The approve/reject routes are plain `GET`s so they
//! work as links in an e-mail; nothing authenticates them.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", datareq_api::api_router(manager.clone()))
//! ```

pub mod error;
pub mod requests;

use axum::{Router, routing::get};
use datareq_core::{
  lifecycle::LifecycleManager, notify::Notifier, store::RequestStore,
};

pub use error::ApiError;

/// Build a fully-materialised API router for `manager`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S, N>(manager: LifecycleManager<S, N>) -> Router<()>
where
  S: RequestStore + 'static,
  N: Notifier + 'static,
{
  Router::new()
    .route(
      "/requests",
      get(requests::list::<S, N>).post(requests::create::<S, N>),
    )
    .route("/requests/{id}", get(requests::get_one::<S, N>))
    .route("/requests/{id}/approve", get(requests::approve::<S, N>))
    .route("/requests/{id}/reject", get(requests::reject::<S, N>))
    .with_state(manager)
}
