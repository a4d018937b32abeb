//! [`SqliteStore`] — the SQLite implementation of [`RecordStore`], plus the
//! [`LiveRecords`] live query it hands out.

use std::path::Path;

use chrono::Utc;
use tokio::sync::broadcast;
use uuid::Uuid;

use steward_core::{
  identity::SessionId,
  record::{NewRecord, Record, RecordKind},
  store::{LiveQuery, RecordFilter, RecordStore},
};

use crate::{
  Error, Result,
  encode::{RawRecord, encode_dt, encode_uuid},
  schema::SCHEMA,
};

/// Capacity of the change bus. A live query that falls this far behind
/// re-queries from scratch, so lagging only coalesces snapshots.
const CHANGE_BUS_CAPACITY: usize = 256;

/// Discriminant columns of an inserted row, broadcast to live queries so they
/// can skip re-querying for writes their filter can never match.
#[derive(Debug, Clone)]
struct ChangeEvent {
  kind:     RecordKind,
  owner_id: Option<SessionId>,
}

// ─── Store ───────────────────────────────────────────────────────────────────

/// A steward record store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted and the
/// change bus sender is shared.
#[derive(Clone)]
pub struct SqliteStore {
  conn:    tokio_rusqlite::Connection,
  changes: broadcast::Sender<ChangeEvent>,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    Self::with_connection(conn).await
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    Self::with_connection(conn).await
  }

  async fn with_connection(conn: tokio_rusqlite::Connection) -> Result<Self> {
    let (changes, _) = broadcast::channel(CHANGE_BUS_CAPACITY);
    let store = Self { conn, changes };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }
}

// ─── Query helper ────────────────────────────────────────────────────────────

/// Run the filter as a one-shot query, newest first. Shared between
/// [`RecordStore::list`] and [`LiveRecords`] snapshots.
async fn query_records(
  conn:   &tokio_rusqlite::Connection,
  filter: &RecordFilter,
) -> Result<Vec<Record>> {
  let kind_str  = filter.kind.map(RecordKind::as_str).map(str::to_owned);
  let owner_str = filter.owner_id.as_ref().map(|o| o.as_str().to_owned());

  let raws: Vec<RawRecord> = conn
    .call(move |conn| {
      // Build the WHERE clause from whichever equalities are present.
      let mut conds:  Vec<String> = vec![];
      let mut params: Vec<String> = vec![];
      if let Some(kind) = kind_str {
        params.push(kind);
        conds.push(format!("kind = ?{}", params.len()));
      }
      if let Some(owner) = owner_str {
        params.push(owner);
        conds.push(format!("owner_id = ?{}", params.len()));
      }

      let where_clause = if conds.is_empty() {
        String::new()
      } else {
        format!("WHERE {}", conds.join(" AND "))
      };

      let sql = format!(
        "SELECT record_id, kind, owner_id, created_at, payload
         FROM records
         {where_clause}
         ORDER BY created_at DESC, rowid DESC"
      );

      let mut stmt = conn.prepare(&sql)?;
      let rows = stmt
        .query_map(rusqlite::params_from_iter(params.iter()), |row| {
          Ok(RawRecord {
            record_id:  row.get(0)?,
            kind:       row.get(1)?,
            owner_id:   row.get(2)?,
            created_at: row.get(3)?,
            payload:    row.get(4)?,
          })
        })?
        .collect::<rusqlite::Result<Vec<_>>>()?;

      Ok(rows)
    })
    .await?;

  raws.into_iter().map(RawRecord::into_record).collect()
}

// ─── RecordStore impl ────────────────────────────────────────────────────────

impl RecordStore for SqliteStore {
  type Error = Error;
  type Subscription = LiveRecords;

  async fn insert(&self, record: NewRecord) -> Result<Record> {
    let record = record.into_record(Uuid::new_v4(), Utc::now());

    let id_str      = encode_uuid(record.record_id());
    let kind_str    = record.kind().as_str().to_owned();
    let owner_str   = record.owner_id().map(|o| o.as_str().to_owned());
    let created_str = encode_dt(record.created_at());
    let payload_str = record.to_payload().map_err(Error::Core)?.to_string();

    self
      .conn
      .call(move |conn| {
        conn.execute(
          "INSERT INTO records (record_id, kind, owner_id, created_at, payload)
           VALUES (?1, ?2, ?3, ?4, ?5)",
          rusqlite::params![
            id_str,
            kind_str,
            owner_str,
            created_str,
            payload_str,
          ],
        )?;
        Ok(())
      })
      .await?;

    // Wake live queries this write can affect. No subscribers is fine.
    let _ = self.changes.send(ChangeEvent {
      kind:     record.kind(),
      owner_id: record.owner_id().cloned(),
    });

    Ok(record)
  }

  async fn list(&self, filter: RecordFilter) -> Result<Vec<Record>> {
    query_records(&self.conn, &filter).await
  }

  async fn subscribe(&self, filter: RecordFilter) -> Result<LiveRecords> {
    // Subscribe to the bus before the first snapshot is taken so no write
    // can fall between the two.
    Ok(LiveRecords {
      conn:              self.conn.clone(),
      filter,
      rx:                self.changes.subscribe(),
      delivered_initial: false,
      done:              false,
    })
  }
}

// ─── Live query ──────────────────────────────────────────────────────────────

/// Live query handle over the `records` collection.
///
/// The first snapshot reflects the contents at subscribe time; each later
/// snapshot is produced after at least one matching write. Consecutive
/// writes that arrive while a snapshot is being produced are coalesced into
/// the next one.
pub struct LiveRecords {
  conn:              tokio_rusqlite::Connection,
  filter:            RecordFilter,
  rx:                broadcast::Receiver<ChangeEvent>,
  delivered_initial: bool,
  done:              bool,
}

impl LiveRecords {
  /// Park until a write that can affect this filter arrives.
  /// Returns `false` if the bus is gone (terminal).
  async fn wait_for_matching_change(&mut self) -> bool {
    loop {
      match self.rx.recv().await {
        Ok(event) => {
          if self
            .filter
            .matches_parts(event.kind, event.owner_id.as_ref())
          {
            return true;
          }
        }
        // Fell behind; whatever was missed is covered by re-querying.
        Err(broadcast::error::RecvError::Lagged(_)) => return true,
        Err(broadcast::error::RecvError::Closed) => return false,
      }
    }
  }

  /// Drain already-queued events so several writes collapse into one
  /// delivered snapshot.
  fn coalesce_pending(&mut self) {
    use tokio::sync::broadcast::error::TryRecvError;
    loop {
      match self.rx.try_recv() {
        Ok(_) | Err(TryRecvError::Lagged(_)) => continue,
        Err(TryRecvError::Empty | TryRecvError::Closed) => break,
      }
    }
  }
}

impl LiveQuery for LiveRecords {
  type Error = Error;

  async fn next_snapshot(&mut self) -> Option<Result<Vec<Record>>> {
    if self.done {
      return None;
    }

    if self.delivered_initial {
      if !self.wait_for_matching_change().await {
        self.done = true;
        return Some(Err(Error::SubscriptionLost));
      }
      self.coalesce_pending();
    }
    self.delivered_initial = true;

    match query_records(&self.conn, &self.filter).await {
      Ok(snapshot) => Some(Ok(snapshot)),
      Err(e) => {
        // A failed re-query is terminal for the feed; the caller may open a
        // fresh subscription.
        self.done = true;
        Some(Err(e))
      }
    }
  }

  fn cancel(&mut self) { self.done = true; }
}
