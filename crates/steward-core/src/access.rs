//! The Record Access Layer — the sole mediator between views and storage.
//!
//! Three domain operations are translated into store calls: submit a service
//! request, register an asset, and read records back (one-shot or live).
//! Validation runs before any store call; storage failures are surfaced to
//! the caller unmodified, with no retry and no recovery.

use chrono::NaiveDate;
use serde::Deserialize;
use thiserror::Error;

use crate::{
  error::Error as ValidationError,
  identity::SessionId,
  record::{
    Asset, NewAsset, NewRecord, NewServiceRequest, Record, RecordKind,
    RequestStatus, ServiceRequest, ServiceType,
  },
  store::{LiveQuery, RecordFilter, RecordStore},
};

// ─── Error ───────────────────────────────────────────────────────────────────

/// Failure of an access-layer operation.
///
/// `Validation` is raised synchronously, before any side effect; `Storage`
/// wraps the backend's error verbatim.
#[derive(Debug, Error)]
pub enum AccessError<E> {
  #[error("validation failed: {0}")]
  Validation(#[source] ValidationError),

  #[error("storage error: {0}")]
  Storage(#[source] E),
}

impl<E> AccessError<E> {
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation(_))
  }
}

// ─── Inputs ──────────────────────────────────────────────────────────────────

/// Form-shaped input for [`RecordAccess::submit_service_request`]. Values
/// arrive exactly as typed; `service_type` is parsed against the fixed
/// enumeration during validation.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequestInput {
  pub client_name:  String,
  pub client_email: String,
  pub service_type: String,
  pub description:  String,
}

/// Form-shaped input for [`RecordAccess::register_asset`].
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetInput {
  pub asset_type:      String,
  pub model_or_serial: String,
  /// `YYYY-MM-DD`, as produced by a date form control.
  pub setup_date:      String,
}

// ─── Validation ──────────────────────────────────────────────────────────────

fn require(field: &'static str, value: &str) -> Result<(), ValidationError> {
  if value.trim().is_empty() {
    return Err(ValidationError::EmptyField { field });
  }
  Ok(())
}

/// Field names in errors use the stored (camelCase) spelling so the view can
/// attach the failure to the matching form control.
fn validate_service_request(
  input: ServiceRequestInput,
) -> Result<NewServiceRequest, ValidationError> {
  require("clientName", &input.client_name)?;
  require("clientEmail", &input.client_email)?;
  require("serviceType", &input.service_type)?;
  require("description", &input.description)?;
  let service_type = ServiceType::parse(input.service_type.trim())?;

  Ok(NewServiceRequest {
    client_name:  input.client_name,
    client_email: input.client_email,
    service_type,
    description:  input.description,
    status:       RequestStatus::default(),
  })
}

fn validate_asset(
  owner: &SessionId,
  input: AssetInput,
) -> Result<NewAsset, ValidationError> {
  require("ownerId", owner.as_str())?;
  require("assetType", &input.asset_type)?;
  require("modelOrSerial", &input.model_or_serial)?;
  require("setupDate", &input.setup_date)?;
  let setup_date =
    NaiveDate::parse_from_str(input.setup_date.trim(), "%Y-%m-%d")
      .map_err(|_| ValidationError::InvalidSetupDate(input.setup_date.clone()))?;

  Ok(NewAsset {
    owner_id: owner.clone(),
    asset_type: input.asset_type,
    model_or_serial: input.model_or_serial,
    setup_date,
  })
}

// ─── Access layer ────────────────────────────────────────────────────────────

/// The Record Access Layer. Generic over the storage backend; constructed
/// with the store rather than reaching for ambient state, so tests can hand
/// it a fake.
#[derive(Debug, Clone)]
pub struct RecordAccess<S> {
  store: S,
}

impl<S: RecordStore> RecordAccess<S> {
  pub fn new(store: S) -> Self { Self { store } }

  pub fn store(&self) -> &S { &self.store }

  // ── Writes ────────────────────────────────────────────────────────────

  /// Validate and persist one service request. The store assigns the
  /// identifier and `submitted_at`; `status` starts at its default.
  pub async fn submit_service_request(
    &self,
    input: ServiceRequestInput,
  ) -> Result<Record, AccessError<S::Error>> {
    let new = validate_service_request(input).map_err(AccessError::Validation)?;
    self
      .store
      .insert(NewRecord::ServiceRequest(new))
      .await
      .map_err(AccessError::Storage)
  }

  /// Validate and persist one asset, tagged with the submitting session.
  pub async fn register_asset(
    &self,
    owner: &SessionId,
    input: AssetInput,
  ) -> Result<Record, AccessError<S::Error>> {
    let new = validate_asset(owner, input).map_err(AccessError::Validation)?;
    self
      .store
      .insert(NewRecord::Asset(new))
      .await
      .map_err(AccessError::Storage)
  }

  // ── Live reads ────────────────────────────────────────────────────────

  /// Live feed of the assets owned by `owner` (Customer Asset Portal).
  pub async fn subscribe_own_assets(
    &self,
    owner: &SessionId,
  ) -> Result<AssetFeed<S::Subscription>, AccessError<S::Error>> {
    let inner = self
      .store
      .subscribe(RecordFilter::assets_of(owner.clone()))
      .await
      .map_err(AccessError::Storage)?;
    Ok(AssetFeed { inner })
  }

  /// Live feed of every asset regardless of owner (Administration Panel).
  pub async fn subscribe_all_assets(
    &self,
  ) -> Result<AssetFeed<S::Subscription>, AccessError<S::Error>> {
    let inner = self
      .store
      .subscribe(RecordFilter::kind(RecordKind::Asset))
      .await
      .map_err(AccessError::Storage)?;
    Ok(AssetFeed { inner })
  }

  /// Live feed of every service request (Administration Panel).
  pub async fn subscribe_all_service_requests(
    &self,
  ) -> Result<RequestFeed<S::Subscription>, AccessError<S::Error>> {
    let inner = self
      .store
      .subscribe(RecordFilter::kind(RecordKind::ServiceRequest))
      .await
      .map_err(AccessError::Storage)?;
    Ok(RequestFeed { inner })
  }

  // ── One-shot reads ────────────────────────────────────────────────────

  /// All service requests, newest first.
  pub async fn list_service_requests(
    &self,
  ) -> Result<Vec<ServiceRequest>, AccessError<S::Error>> {
    let records = self
      .store
      .list(RecordFilter::kind(RecordKind::ServiceRequest))
      .await
      .map_err(AccessError::Storage)?;
    Ok(
      records
        .into_iter()
        .filter_map(Record::into_service_request)
        .collect(),
    )
  }

  /// Assets, newest first — all of them, or only one owner's.
  pub async fn list_assets(
    &self,
    owner: Option<&SessionId>,
  ) -> Result<Vec<Asset>, AccessError<S::Error>> {
    let filter = match owner {
      Some(owner) => RecordFilter::assets_of(owner.clone()),
      None => RecordFilter::kind(RecordKind::Asset),
    };
    let records =
      self.store.list(filter).await.map_err(AccessError::Storage)?;
    Ok(records.into_iter().filter_map(Record::into_asset).collect())
  }
}

// ─── Typed feeds ─────────────────────────────────────────────────────────────

/// Live feed of assets, decoded from the underlying [`LiveQuery`].
pub struct AssetFeed<Q> {
  inner: Q,
}

impl<Q: LiveQuery> AssetFeed<Q> {
  /// Next full snapshot, newest first. Terminal semantics follow
  /// [`LiveQuery::next_snapshot`].
  pub async fn next_snapshot(&mut self) -> Option<Result<Vec<Asset>, Q::Error>> {
    let snapshot = self.inner.next_snapshot().await?;
    Some(snapshot.map(|records| {
      records.into_iter().filter_map(Record::into_asset).collect()
    }))
  }

  pub fn cancel(&mut self) { self.inner.cancel(); }
}

/// Live feed of service requests.
pub struct RequestFeed<Q> {
  inner: Q,
}

impl<Q: LiveQuery> RequestFeed<Q> {
  pub async fn next_snapshot(
    &mut self,
  ) -> Option<Result<Vec<ServiceRequest>, Q::Error>> {
    let snapshot = self.inner.next_snapshot().await?;
    Some(snapshot.map(|records| {
      records
        .into_iter()
        .filter_map(Record::into_service_request)
        .collect()
    }))
  }

  pub fn cancel(&mut self) { self.inner.cancel(); }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
  use std::{
    collections::VecDeque,
    sync::{Arc, Mutex},
  };

  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::store::Snapshot;

  // ── Mock store ────────────────────────────────────────────────────────

  #[derive(Debug, Error)]
  #[error("mock store failure")]
  struct MockError;

  /// In-memory fake. Subscriptions are one-shot: they deliver the snapshot
  /// taken at subscribe time, which is enough to test filter wiring here —
  /// push behavior is covered by the real backend's tests.
  #[derive(Clone, Default)]
  struct MockStore {
    records:     Arc<Mutex<Vec<Record>>>,
    fail_writes: bool,
  }

  impl MockStore {
    fn failing() -> Self {
      Self { fail_writes: true, ..Self::default() }
    }

    fn write_count(&self) -> usize {
      self.records.lock().unwrap().len()
    }
  }

  struct MockQuery {
    pending:   VecDeque<Snapshot>,
    cancelled: bool,
  }

  impl LiveQuery for MockQuery {
    type Error = MockError;

    async fn next_snapshot(&mut self) -> Option<Result<Snapshot, MockError>> {
      if self.cancelled {
        return None;
      }
      self.pending.pop_front().map(Ok)
    }

    fn cancel(&mut self) { self.cancelled = true; }
  }

  impl RecordStore for MockStore {
    type Error = MockError;
    type Subscription = MockQuery;

    async fn insert(&self, record: NewRecord) -> Result<Record, MockError> {
      if self.fail_writes {
        return Err(MockError);
      }
      let record = record.into_record(Uuid::new_v4(), Utc::now());
      self.records.lock().unwrap().push(record.clone());
      Ok(record)
    }

    async fn list(&self, filter: RecordFilter) -> Result<Vec<Record>, MockError> {
      let mut matching: Vec<Record> = self
        .records
        .lock()
        .unwrap()
        .iter()
        .filter(|r| filter.matches(r))
        .cloned()
        .collect();
      matching.reverse();
      Ok(matching)
    }

    async fn subscribe(&self, filter: RecordFilter) -> Result<MockQuery, MockError> {
      let snapshot = self.list(filter).await?;
      Ok(MockQuery {
        pending:   VecDeque::from([snapshot]),
        cancelled: false,
      })
    }
  }

  // ── Fixtures ──────────────────────────────────────────────────────────

  fn request_input() -> ServiceRequestInput {
    ServiceRequestInput {
      client_name:  "John Smith".into(),
      client_email: "john@example.com".into(),
      service_type: "maintenance".into(),
      description:  "annual filter service".into(),
    }
  }

  fn asset_input() -> AssetInput {
    AssetInput {
      asset_type:      "HVAC Unit".into(),
      model_or_serial: "SN-9981".into(),
      setup_date:      "2024-01-15".into(),
    }
  }

  // ── submit_service_request ────────────────────────────────────────────

  #[tokio::test]
  async fn submit_creates_one_request_with_fields_unchanged() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());

    let before = Utc::now();
    let record = access.submit_service_request(request_input()).await.unwrap();

    assert_eq!(store.write_count(), 1);
    assert_eq!(record.kind(), RecordKind::ServiceRequest);
    let request = record.into_service_request().unwrap();
    assert_eq!(request.client_name, "John Smith");
    assert_eq!(request.client_email, "john@example.com");
    assert_eq!(request.service_type, ServiceType::Maintenance);
    assert_eq!(request.description, "annual filter service");
    assert_eq!(request.status, RequestStatus::New);
    assert!(request.submitted_at >= before);
  }

  #[tokio::test]
  async fn empty_client_name_is_rejected_without_a_write() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());

    let input = ServiceRequestInput {
      client_name: "".into(),
      ..request_input()
    };
    let err = access.submit_service_request(input).await.unwrap_err();

    assert!(matches!(
      err,
      AccessError::Validation(ValidationError::EmptyField { field: "clientName" })
    ));
    assert_eq!(store.write_count(), 0);
  }

  #[tokio::test]
  async fn every_required_request_field_is_checked() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());

    let blank =
      |f: fn(&mut ServiceRequestInput)| -> ServiceRequestInput {
        let mut input = request_input();
        f(&mut input);
        input
      };

    for (input, field) in [
      (blank(|i| i.client_name = "  ".into()), "clientName"),
      (blank(|i| i.client_email = String::new()), "clientEmail"),
      (blank(|i| i.service_type = String::new()), "serviceType"),
      (blank(|i| i.description = "\n".into()), "description"),
    ] {
      let err = access.submit_service_request(input).await.unwrap_err();
      assert!(matches!(
        err,
        AccessError::Validation(ValidationError::EmptyField { field: got })
          if got == field
      ));
    }
    assert_eq!(store.write_count(), 0);
  }

  #[tokio::test]
  async fn service_type_outside_enumeration_is_rejected() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());

    let input = ServiceRequestInput {
      service_type: "plumbing".into(),
      ..request_input()
    };
    let err = access.submit_service_request(input).await.unwrap_err();

    assert!(matches!(
      err,
      AccessError::Validation(ValidationError::UnknownServiceType(t)) if t == "plumbing"
    ));
    assert_eq!(store.write_count(), 0);
  }

  #[tokio::test]
  async fn storage_failure_is_surfaced_verbatim() {
    let access = RecordAccess::new(MockStore::failing());
    let err = access.submit_service_request(request_input()).await.unwrap_err();
    assert!(matches!(err, AccessError::Storage(MockError)));
  }

  // ── register_asset ────────────────────────────────────────────────────

  #[tokio::test]
  async fn register_asset_tags_the_owner() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());
    let owner = SessionId::new("user-42");

    let record = access.register_asset(&owner, asset_input()).await.unwrap();

    assert_eq!(store.write_count(), 1);
    let asset = record.into_asset().unwrap();
    assert_eq!(asset.owner_id, owner);
    assert_eq!(asset.asset_type, "HVAC Unit");
    assert_eq!(asset.model_or_serial, "SN-9981");
    assert_eq!(
      asset.setup_date,
      NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
    );
  }

  #[tokio::test]
  async fn blank_owner_is_rejected_without_a_write() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());

    let err = access
      .register_asset(&SessionId::new(""), asset_input())
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      AccessError::Validation(ValidationError::EmptyField { field: "ownerId" })
    ));
    assert_eq!(store.write_count(), 0);
  }

  #[tokio::test]
  async fn malformed_setup_date_is_rejected() {
    let store = MockStore::default();
    let access = RecordAccess::new(store.clone());

    let input = AssetInput {
      setup_date: "last spring".into(),
      ..asset_input()
    };
    let err = access
      .register_asset(&SessionId::new("user-42"), input)
      .await
      .unwrap_err();

    assert!(matches!(
      err,
      AccessError::Validation(ValidationError::InvalidSetupDate(_))
    ));
    assert_eq!(store.write_count(), 0);
  }

  // ── Subscriptions and lists ───────────────────────────────────────────

  #[tokio::test]
  async fn own_assets_feed_is_scoped_to_the_owner() {
    let access = RecordAccess::new(MockStore::default());
    let owner = SessionId::new("user-42");

    access.register_asset(&owner, asset_input()).await.unwrap();

    let mut own = access.subscribe_own_assets(&owner).await.unwrap();
    let snapshot = own.next_snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].owner_id, owner);
    assert_eq!(snapshot[0].model_or_serial, "SN-9981");

    let mut other = access
      .subscribe_own_assets(&SessionId::new("user-99"))
      .await
      .unwrap();
    let snapshot = other.next_snapshot().await.unwrap().unwrap();
    assert!(snapshot.is_empty());
  }

  #[tokio::test]
  async fn admin_feeds_see_every_owner() {
    let access = RecordAccess::new(MockStore::default());

    access
      .register_asset(&SessionId::new("user-42"), asset_input())
      .await
      .unwrap();
    access
      .register_asset(&SessionId::new("user-99"), asset_input())
      .await
      .unwrap();
    access.submit_service_request(request_input()).await.unwrap();

    let mut assets = access.subscribe_all_assets().await.unwrap();
    let snapshot = assets.next_snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 2);

    let mut requests = access.subscribe_all_service_requests().await.unwrap();
    let snapshot = requests.next_snapshot().await.unwrap().unwrap();
    assert_eq!(snapshot.len(), 1);
  }

  #[tokio::test]
  async fn cancelled_feed_delivers_nothing_further() {
    let access = RecordAccess::new(MockStore::default());
    let mut feed = access.subscribe_all_assets().await.unwrap();
    feed.cancel();
    assert!(feed.next_snapshot().await.is_none());
  }

  #[tokio::test]
  async fn list_assets_filters_by_owner() {
    let access = RecordAccess::new(MockStore::default());
    let owner = SessionId::new("user-42");

    access.register_asset(&owner, asset_input()).await.unwrap();
    access
      .register_asset(&SessionId::new("user-99"), asset_input())
      .await
      .unwrap();

    assert_eq!(access.list_assets(None).await.unwrap().len(), 2);
    let own = access.list_assets(Some(&owner)).await.unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[0].owner_id, owner);
  }
}
