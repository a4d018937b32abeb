//! Handler for `/session` — the demo-grade identity surface.
//!
//! Hands out a fresh opaque identifier; the browser keeps it for the life of
//! the session and passes it back in the `x-session-id` header. Stability,
//! not secrecy, is the contract.

use axum::Json;
use serde_json::json;
use steward_core::identity::SessionId;

/// `POST /session` — mint an opaque session identifier.
pub async fn mint() -> Json<serde_json::Value> {
  Json(json!({ "sessionId": SessionId::generate() }))
}
