//! SQLite backend for the steward record store.
//!
//! Wraps [`tokio_rusqlite`] so all database access runs on a dedicated thread
//! without blocking the async runtime. Live queries are driven by an
//! in-process change bus: every insert wakes the subscriptions whose filter
//! it can affect, and each wake re-queries and delivers a full snapshot.

mod encode;
mod schema;
mod store;

pub mod error;

pub use error::{Error, Result};
pub use store::{LiveRecords, SqliteStore};
