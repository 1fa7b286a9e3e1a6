//! Core types and trait definitions for the datareq request workflow.
//!
//! This crate is deliberately free of HTTP, database and mail dependencies.
//! Storage backends implement [`store::RequestStore`], mail transports
//! implement [`notify::Notifier`], and the [`lifecycle::LifecycleManager`]
//! ties the two together.

// We intentionally use native `async fn` in traits (stabilised in Rust 1.75).
// Suppress the advisory lint about `Send` bounds on the returned futures.
#![allow(async_fn_in_trait)]

pub mod compose;
pub mod error;
pub mod lifecycle;
pub mod memory;
pub mod notify;
pub mod request;
pub mod store;

pub use error::{Error, Result};
