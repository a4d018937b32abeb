//! JSON REST API for steward.
//!
//! Exposes an axum [`Router`] backed by any
//! [`steward_core::store::RecordStore`] through the Record Access Layer.
//! Transport, TLS, and static assets are the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", steward_api::api_router(access.clone()))
//! ```

pub mod assets;
pub mod error;
pub mod requests;
pub mod session;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use steward_core::{access::RecordAccess, store::RecordStore};

pub use error::ApiError;

/// Build a fully-materialised API router for `access`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(access: Arc<RecordAccess<S>>) -> Router<()>
where
  S: RecordStore + 'static,
{
  Router::new()
    // Identity
    .route("/session", post(session::mint))
    // Service requests
    .route(
      "/requests",
      get(requests::list::<S>).post(requests::create::<S>),
    )
    // Assets
    .route("/assets", get(assets::list::<S>).post(assets::create::<S>))
    .with_state(access)
}
