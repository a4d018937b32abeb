//! The `RecordStore` and `LiveQuery` traits plus the equality filter.
//!
//! The traits are implemented by storage backends (e.g.
//! `steward-store-sqlite`). Higher layers depend on this abstraction, not on
//! any concrete backend, so tests can substitute an in-memory fake.

use std::future::Future;

use crate::{
  identity::SessionId,
  record::{NewRecord, Record, RecordKind},
};

// ─── Filter ──────────────────────────────────────────────────────────────────

/// Field-equality filter for list and subscribe operations.
///
/// The empty filter matches every document in the collection.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordFilter {
  pub kind:     Option<RecordKind>,
  pub owner_id: Option<SessionId>,
}

impl RecordFilter {
  /// Match all documents of one kind.
  pub fn kind(kind: RecordKind) -> Self {
    Self { kind: Some(kind), owner_id: None }
  }

  /// Match the assets owned by `owner`.
  pub fn assets_of(owner: SessionId) -> Self {
    Self {
      kind:     Some(RecordKind::Asset),
      owner_id: Some(owner),
    }
  }

  /// Whether a document with the given discriminant columns satisfies every
  /// equality in the filter. Backends use this to decide if a write can
  /// affect a live query before re-running it.
  pub fn matches_parts(
    &self,
    kind:  RecordKind,
    owner: Option<&SessionId>,
  ) -> bool {
    if self.kind.is_some_and(|k| k != kind) {
      return false;
    }
    if let Some(want) = &self.owner_id {
      return owner == Some(want);
    }
    true
  }

  pub fn matches(&self, record: &Record) -> bool {
    self.matches_parts(record.kind(), record.owner_id())
  }
}

// ─── Live query ──────────────────────────────────────────────────────────────

/// The complete, newest-first result set for a filter at a point in time.
pub type Snapshot = Vec<Record>;

/// A cancellable live query over the collection.
///
/// The lifecycle is `subscribed → cancelled`; there are no other states.
/// `next_snapshot` yields `Some(Ok(..))` for each delivered result set,
/// `Some(Err(..))` exactly once if the subscription terminates unexpectedly,
/// and `None` after cancellation or a terminal error. Several writes may be
/// coalesced into one delivered snapshot.
pub trait LiveQuery: Send {
  type Error: std::error::Error + Send + Sync + 'static;

  fn next_snapshot(
    &mut self,
  ) -> impl Future<Output = Option<Result<Snapshot, Self::Error>>> + Send + '_;

  /// Stop the feed. In-flight writes are unaffected; subsequent calls to
  /// `next_snapshot` return `None`.
  fn cancel(&mut self);
}

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Abstraction over the shared document collection.
///
/// Every write is an independent insert — no update or delete is ever
/// issued, so concurrent sessions cannot conflict on a document.
///
/// All methods return `Send` futures so the trait can be used in
/// multi-threaded async runtimes (e.g. tokio with `axum`).
pub trait RecordStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;
  type Subscription: LiveQuery<Error = Self::Error>;

  /// Persist `record`, assigning its identity and creation timestamp.
  /// Returns the stored record exactly as later reads will see it.
  fn insert(
    &self,
    record: NewRecord,
  ) -> impl Future<Output = Result<Record, Self::Error>> + Send + '_;

  /// One-shot field-equality query, newest first.
  fn list(
    &self,
    filter: RecordFilter,
  ) -> impl Future<Output = Result<Vec<Record>, Self::Error>> + Send + '_;

  /// Open a live query. The first snapshot reflects the current contents;
  /// later snapshots follow each matching write until the query is
  /// cancelled.
  fn subscribe(
    &self,
    filter: RecordFilter,
  ) -> impl Future<Output = Result<Self::Subscription, Self::Error>> + Send + '_;
}

#[cfg(test)]
mod tests {
  use chrono::Utc;
  use uuid::Uuid;

  use super::*;
  use crate::record::{Asset, RequestStatus, ServiceRequest, ServiceType};

  fn request() -> Record {
    Record::ServiceRequest(ServiceRequest {
      record_id:    Uuid::new_v4(),
      client_name:  "A".into(),
      client_email: "a@b.com".into(),
      service_type: ServiceType::Maintenance,
      description:  "leak".into(),
      submitted_at: Utc::now(),
      status:       RequestStatus::New,
    })
  }

  fn asset(owner: &str) -> Record {
    Record::Asset(Asset {
      record_id:       Uuid::new_v4(),
      owner_id:        SessionId::new(owner),
      asset_type:      "HVAC Unit".into(),
      model_or_serial: "SN-1".into(),
      setup_date:      chrono::NaiveDate::from_ymd_opt(2024, 1, 15).unwrap(),
      registered_at:   Utc::now(),
    })
  }

  #[test]
  fn empty_filter_matches_everything() {
    let filter = RecordFilter::default();
    assert!(filter.matches(&request()));
    assert!(filter.matches(&asset("user-42")));
  }

  #[test]
  fn kind_filter_excludes_other_kind() {
    let filter = RecordFilter::kind(RecordKind::ServiceRequest);
    assert!(filter.matches(&request()));
    assert!(!filter.matches(&asset("user-42")));
  }

  #[test]
  fn owner_filter_requires_exact_owner() {
    let filter = RecordFilter::assets_of(SessionId::new("user-42"));
    assert!(filter.matches(&asset("user-42")));
    assert!(!filter.matches(&asset("user-99")));
    // Requests carry no owner and can never match an owner filter.
    assert!(!filter.matches(&request()));
  }
}
