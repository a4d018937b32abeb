//! Error types for `steward-core`.

use thiserror::Error;
use uuid::Uuid;

/// Validation and decode failures. Validation errors are always raised
/// before any store call; decode errors come from the storage read path.
#[derive(Debug, Error)]
pub enum Error {
  #[error("required field is empty: {field}")]
  EmptyField { field: &'static str },

  #[error("unknown service type: {0:?}")]
  UnknownServiceType(String),

  #[error("setup date is not a calendar date: {0:?}")]
  InvalidSetupDate(String),

  #[error("unknown record kind: {0:?}")]
  UnknownRecordKind(String),

  #[error("asset document {0} has no owner")]
  MissingOwner(Uuid),

  #[error("serialization error: {0}")]
  Serialization(#[from] serde_json::Error),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
