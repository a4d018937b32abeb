//! Error type for `steward-store-sqlite`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  #[error("core error: {0}")]
  Core(#[from] steward_core::Error),

  #[error("database error: {0}")]
  Database(#[from] tokio_rusqlite::Error),

  #[error("json error: {0}")]
  Json(#[from] serde_json::Error),

  #[error("uuid parse error: {0}")]
  Uuid(#[from] uuid::Error),

  #[error("date/time parse error: {0}")]
  DateParse(String),

  /// The change bus behind a live query went away without a cancel —
  /// the store was dropped while the subscription was still open.
  #[error("live query lost its change feed")]
  SubscriptionLost,
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
