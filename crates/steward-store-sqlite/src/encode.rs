//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! Timestamps are stored as RFC 3339 strings (which also sort correctly as
//! text). UUIDs are stored as hyphenated lowercase strings. The payload
//! column is compact JSON.

use chrono::{DateTime, Utc};
use steward_core::{identity::SessionId, record::Record};
use uuid::Uuid;

use crate::{Error, Result};

// ─── Uuid ────────────────────────────────────────────────────────────────────

pub fn encode_uuid(id: Uuid) -> String { id.hyphenated().to_string() }

pub fn decode_uuid(s: &str) -> Result<Uuid> { Ok(Uuid::parse_str(s)?) }

// ─── DateTime<Utc> ───────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row type ────────────────────────────────────────────────────────────────

/// Raw strings read directly from a `records` row.
pub struct RawRecord {
  pub record_id:  String,
  pub kind:       String,
  pub owner_id:   Option<String>,
  pub created_at: String,
  pub payload:    String,
}

impl RawRecord {
  pub fn into_record(self) -> Result<Record> {
    let record_id = decode_uuid(&self.record_id)?;
    let created_at = decode_dt(&self.created_at)?;
    let payload: serde_json::Value = serde_json::from_str(&self.payload)?;
    let owner_id = self.owner_id.map(SessionId::from);

    Ok(Record::from_parts(
      record_id,
      &self.kind,
      owner_id,
      created_at,
      payload,
    )?)
  }
}
