//! Handlers for `/assets` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/assets` | Optional `?owner_id=…`; unfiltered is the admin view |
//! | `POST` | `/assets` | Body: [`AssetInput`]; owner from `x-session-id` header |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Query, State},
  http::{HeaderMap, StatusCode},
  response::IntoResponse,
};
use serde::Deserialize;
use steward_core::{
  access::{AssetInput, RecordAccess},
  identity::SessionId,
  record::Asset,
  store::RecordStore,
};

use crate::error::ApiError;

/// Header carrying the caller's opaque session identifier.
pub const SESSION_HEADER: &str = "x-session-id";

fn session_from_headers(headers: &HeaderMap) -> Result<SessionId, ApiError> {
  let value = headers.get(SESSION_HEADER).ok_or_else(|| {
    ApiError::BadRequest(format!("missing {SESSION_HEADER} header"))
  })?;
  let value = value.to_str().map_err(|_| {
    ApiError::BadRequest(format!("invalid {SESSION_HEADER} header"))
  })?;
  Ok(SessionId::new(value))
}

// ─── List ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct ListParams {
  pub owner_id: Option<String>,
}

/// `GET /assets[?owner_id=<session id>]`
pub async fn list<S>(
  State(access): State<Arc<RecordAccess<S>>>,
  Query(params): Query<ListParams>,
) -> Result<Json<Vec<Asset>>, ApiError>
where
  S: RecordStore,
{
  let owner = params.owner_id.map(SessionId::from);
  let assets = access
    .list_assets(owner.as_ref())
    .await
    .map_err(ApiError::from_access)?;
  Ok(Json(assets))
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// `POST /assets` — body: [`AssetInput`], owner taken from the session header.
pub async fn create<S>(
  State(access): State<Arc<RecordAccess<S>>>,
  headers: HeaderMap,
  Json(body): Json<AssetInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let owner = session_from_headers(&headers)?;
  let record = access
    .register_asset(&owner, body)
    .await
    .map_err(ApiError::from_access)?;
  Ok((StatusCode::CREATED, Json(record)))
}
