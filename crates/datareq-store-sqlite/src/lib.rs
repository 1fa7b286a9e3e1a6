//! SQLite-backed [`RequestStore`](datareq_core::store::RequestStore).
//!
//! Requests live in a single `requests` table. Ids come from SQLite's
//! `AUTOINCREMENT`, so they are never reused even after rows are deleted by
//! hand. Every call goes through one [`tokio_rusqlite`] connection thread.
//!
//! ```rust,ignore
//! let store = datareq_store_sqlite::SqliteStore::open("data/database.sqlite").await?;
//! ```

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::SqliteStore;
