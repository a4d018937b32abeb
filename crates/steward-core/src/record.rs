//! Record types — the two document kinds sharing the steward collection.
//!
//! Storage keeps a flat, loosely-typed document shape: a `kind` discriminant
//! plus a JSON payload. Decoding into the typed [`Record`] variants happens
//! at the application boundary; an unrecognized `kind` is a decode failure.
//! Both kinds are create-only — no field is ever updated after insert.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Error, Result, identity::SessionId};

// ─── Kind discriminator ──────────────────────────────────────────────────────

/// Distinguishes the two document kinds stored in the single collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RecordKind {
  ServiceRequest,
  Asset,
}

impl RecordKind {
  /// The discriminant string stored in the `kind` column.
  /// Must match the `rename_all = "camelCase"` serde tags above.
  pub fn as_str(self) -> &'static str {
    match self {
      Self::ServiceRequest => "serviceRequest",
      Self::Asset => "asset",
    }
  }

  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "serviceRequest" => Ok(Self::ServiceRequest),
      "asset" => Ok(Self::Asset),
      other => Err(Error::UnknownRecordKind(other.to_owned())),
    }
  }
}

// ─── Enumerations ────────────────────────────────────────────────────────────

/// The fixed enumeration offered on the service-request form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
  Consultation,
  Maintenance,
  Emergency,
  Other,
}

impl ServiceType {
  pub fn as_str(self) -> &'static str {
    match self {
      Self::Consultation => "consultation",
      Self::Maintenance => "maintenance",
      Self::Emergency => "emergency",
      Self::Other => "other",
    }
  }

  /// Parse a raw form value. Anything outside the enumeration is a
  /// validation failure.
  pub fn parse(s: &str) -> Result<Self> {
    match s {
      "consultation" => Ok(Self::Consultation),
      "maintenance" => Ok(Self::Maintenance),
      "emergency" => Ok(Self::Emergency),
      "other" => Ok(Self::Other),
      other => Err(Error::UnknownServiceType(other.to_owned())),
    }
  }
}

/// Workflow state of a service request. Requests are created as `New`; no
/// transition operation is exposed anywhere yet.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
  #[default]
  New,
  Quoted,
  Completed,
}

// ─── Stored records ──────────────────────────────────────────────────────────

/// A customer's request for service, submitted from the public form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
  pub record_id:    Uuid,
  pub client_name:  String,
  pub client_email: String,
  pub service_type: ServiceType,
  pub description:  String,
  /// Store-assigned; never changes after creation.
  pub submitted_at: DateTime<Utc>,
  pub status:       RequestStatus,
}

/// A piece of equipment registered by a customer session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Asset {
  pub record_id:       Uuid,
  /// Session identifier of the registrant — application-level convention,
  /// not enforced by the store.
  pub owner_id:        SessionId,
  pub asset_type:      String,
  pub model_or_serial: String,
  /// User-supplied calendar date.
  pub setup_date:      NaiveDate,
  /// Store-assigned; never changes after creation.
  pub registered_at:   DateTime<Utc>,
}

// ─── Record ──────────────────────────────────────────────────────────────────

/// A decoded document from the shared collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Record {
  ServiceRequest(ServiceRequest),
  Asset(Asset),
}

/// Flat payload stored alongside the `kind` column for a service request.
/// Identity and the store-assigned timestamp live in their own columns.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ServiceRequestPayload {
  client_name:  String,
  client_email: String,
  service_type: ServiceType,
  description:  String,
  status:       RequestStatus,
}

/// Flat payload for an asset. The owner lives in its own (indexed) column.
#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetPayload {
  asset_type:      String,
  model_or_serial: String,
  setup_date:      NaiveDate,
}

impl Record {
  pub fn kind(&self) -> RecordKind {
    match self {
      Self::ServiceRequest(_) => RecordKind::ServiceRequest,
      Self::Asset(_) => RecordKind::Asset,
    }
  }

  pub fn record_id(&self) -> Uuid {
    match self {
      Self::ServiceRequest(r) => r.record_id,
      Self::Asset(a) => a.record_id,
    }
  }

  /// The store-assigned creation timestamp (`submitted_at` for requests,
  /// `registered_at` for assets). Lists are ordered by it, newest first.
  pub fn created_at(&self) -> DateTime<Utc> {
    match self {
      Self::ServiceRequest(r) => r.submitted_at,
      Self::Asset(a) => a.registered_at,
    }
  }

  /// The owning session, for records that have one.
  pub fn owner_id(&self) -> Option<&SessionId> {
    match self {
      Self::ServiceRequest(_) => None,
      Self::Asset(a) => Some(&a.owner_id),
    }
  }

  /// Serialise the payload for the `payload` storage column. Fields held in
  /// dedicated columns (id, kind, owner, creation timestamp) are excluded.
  pub fn to_payload(&self) -> Result<serde_json::Value> {
    let value = match self {
      Self::ServiceRequest(r) => {
        serde_json::to_value(ServiceRequestPayload {
          client_name:  r.client_name.clone(),
          client_email: r.client_email.clone(),
          service_type: r.service_type,
          description:  r.description.clone(),
          status:       r.status,
        })?
      }
      Self::Asset(a) => {
        serde_json::to_value(AssetPayload {
          asset_type:      a.asset_type.clone(),
          model_or_serial: a.model_or_serial.clone(),
          setup_date:      a.setup_date,
        })?
      }
    };
    Ok(value)
  }

  /// Reassemble a record from its stored columns and payload.
  ///
  /// Fails with [`Error::UnknownRecordKind`] on an unrecognized discriminant
  /// and [`Error::MissingOwner`] for an asset row without an owner column.
  pub fn from_parts(
    record_id:  Uuid,
    kind:       &str,
    owner_id:   Option<SessionId>,
    created_at: DateTime<Utc>,
    payload:    serde_json::Value,
  ) -> Result<Self> {
    match RecordKind::parse(kind)? {
      RecordKind::ServiceRequest => {
        let p: ServiceRequestPayload = serde_json::from_value(payload)?;
        Ok(Self::ServiceRequest(ServiceRequest {
          record_id,
          client_name:  p.client_name,
          client_email: p.client_email,
          service_type: p.service_type,
          description:  p.description,
          submitted_at: created_at,
          status:       p.status,
        }))
      }
      RecordKind::Asset => {
        let owner_id = owner_id.ok_or(Error::MissingOwner(record_id))?;
        let p: AssetPayload = serde_json::from_value(payload)?;
        Ok(Self::Asset(Asset {
          record_id,
          owner_id,
          asset_type:      p.asset_type,
          model_or_serial: p.model_or_serial,
          setup_date:      p.setup_date,
          registered_at:   created_at,
        }))
      }
    }
  }

  pub fn into_service_request(self) -> Option<ServiceRequest> {
    match self {
      Self::ServiceRequest(r) => Some(r),
      Self::Asset(_) => None,
    }
  }

  pub fn into_asset(self) -> Option<Asset> {
    match self {
      Self::ServiceRequest(_) => None,
      Self::Asset(a) => Some(a),
    }
  }
}

// ─── New records ─────────────────────────────────────────────────────────────

/// A validated service request, ready for the store to assign identity and
/// timestamp. Produced by the access layer — `status` always starts at its
/// default there.
#[derive(Debug, Clone)]
pub struct NewServiceRequest {
  pub client_name:  String,
  pub client_email: String,
  pub service_type: ServiceType,
  pub description:  String,
  pub status:       RequestStatus,
}

/// A validated asset registration, tagged with the submitting session.
#[derive(Debug, Clone)]
pub struct NewAsset {
  pub owner_id:        SessionId,
  pub asset_type:      String,
  pub model_or_serial: String,
  pub setup_date:      NaiveDate,
}

/// Input to [`crate::store::RecordStore::insert`].
/// `record_id` and the creation timestamp are always set by the store; they
/// are not accepted from callers.
#[derive(Debug, Clone)]
pub enum NewRecord {
  ServiceRequest(NewServiceRequest),
  Asset(NewAsset),
}

impl NewRecord {
  pub fn kind(&self) -> RecordKind {
    match self {
      Self::ServiceRequest(_) => RecordKind::ServiceRequest,
      Self::Asset(_) => RecordKind::Asset,
    }
  }

  pub fn owner_id(&self) -> Option<&SessionId> {
    match self {
      Self::ServiceRequest(_) => None,
      Self::Asset(a) => Some(&a.owner_id),
    }
  }

  /// Materialise the stored record with store-assigned identity and
  /// creation timestamp. Every backend goes through this, so the echo a
  /// caller gets back is exactly what was persisted.
  pub fn into_record(self, record_id: Uuid, created_at: DateTime<Utc>) -> Record {
    match self {
      Self::ServiceRequest(r) => Record::ServiceRequest(ServiceRequest {
        record_id,
        client_name:  r.client_name,
        client_email: r.client_email,
        service_type: r.service_type,
        description:  r.description,
        submitted_at: created_at,
        status:       r.status,
      }),
      Self::Asset(a) => Record::Asset(Asset {
        record_id,
        owner_id:        a.owner_id,
        asset_type:      a.asset_type,
        model_or_serial: a.model_or_serial,
        setup_date:      a.setup_date,
        registered_at:   created_at,
      }),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn kind_discriminant_roundtrip() {
    for kind in [RecordKind::ServiceRequest, RecordKind::Asset] {
      assert_eq!(RecordKind::parse(kind.as_str()).unwrap(), kind);
    }
    assert!(matches!(
      RecordKind::parse("invoice"),
      Err(Error::UnknownRecordKind(_))
    ));
  }

  #[test]
  fn payload_roundtrip_service_request() {
    let record = Record::ServiceRequest(ServiceRequest {
      record_id:    Uuid::new_v4(),
      client_name:  "John Smith".into(),
      client_email: "john@example.com".into(),
      service_type: ServiceType::Emergency,
      description:  "no heat".into(),
      submitted_at: Utc::now(),
      status:       RequestStatus::New,
    });

    let payload = record.to_payload().unwrap();
    let back = Record::from_parts(
      record.record_id(),
      record.kind().as_str(),
      None,
      record.created_at(),
      payload,
    )
    .unwrap();

    assert_eq!(back, record);
  }

  #[test]
  fn payload_roundtrip_asset() {
    let record = Record::Asset(Asset {
      record_id:       Uuid::new_v4(),
      owner_id:        SessionId::new("user-42"),
      asset_type:      "HVAC Unit".into(),
      model_or_serial: "SN-9981".into(),
      setup_date:      NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
      registered_at:   Utc::now(),
    });

    let payload = record.to_payload().unwrap();
    let back = Record::from_parts(
      record.record_id(),
      record.kind().as_str(),
      Some(SessionId::new("user-42")),
      record.created_at(),
      payload,
    )
    .unwrap();

    assert_eq!(back, record);
  }

  #[test]
  fn asset_without_owner_column_fails_decode() {
    let record = Record::Asset(Asset {
      record_id:       Uuid::new_v4(),
      owner_id:        SessionId::new("user-42"),
      asset_type:      "HVAC Unit".into(),
      model_or_serial: "SN-9981".into(),
      setup_date:      NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
      registered_at:   Utc::now(),
    });
    let payload = record.to_payload().unwrap();

    let err = Record::from_parts(
      record.record_id(),
      "asset",
      None,
      record.created_at(),
      payload,
    )
    .unwrap_err();
    assert!(matches!(err, Error::MissingOwner(_)));
  }
}
