//! Handlers for `/requests` endpoints.
//!
//! | Method | Path | Notes |
//! |--------|------|-------|
//! | `GET`  | `/requests` | All service requests, newest first (admin view) |
//! | `POST` | `/requests` | Body: [`ServiceRequestInput`]; returns 201 + record |

use std::sync::Arc;

use axum::{
  Json,
  extract::State,
  http::StatusCode,
  response::IntoResponse,
};
use steward_core::{
  access::{RecordAccess, ServiceRequestInput},
  record::ServiceRequest,
  store::RecordStore,
};

use crate::error::ApiError;

/// `GET /requests`
pub async fn list<S>(
  State(access): State<Arc<RecordAccess<S>>>,
) -> Result<Json<Vec<ServiceRequest>>, ApiError>
where
  S: RecordStore,
{
  let requests = access
    .list_service_requests()
    .await
    .map_err(ApiError::from_access)?;
  Ok(Json(requests))
}

/// `POST /requests` — body: [`ServiceRequestInput`].
pub async fn create<S>(
  State(access): State<Arc<RecordAccess<S>>>,
  Json(body): Json<ServiceRequestInput>,
) -> Result<impl IntoResponse, ApiError>
where
  S: RecordStore,
{
  let record = access
    .submit_service_request(body)
    .await
    .map_err(ApiError::from_access)?;
  Ok((StatusCode::CREATED, Json(record)))
}
