//! The identity-provider contract.
//!
//! Steward does no account authentication. Each browser session obtains an
//! opaque, stable identifier from an external provider; assets are scoped to
//! that identifier by application-level convention only — the store does not
//! enforce ownership.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── SessionId ───────────────────────────────────────────────────────────────

/// An opaque per-session identifier. Stability, not secrecy, is the contract.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionId(String);

impl SessionId {
  pub fn new(id: impl Into<String>) -> Self { Self(id.into()) }

  /// Mint a fresh random identifier.
  pub fn generate() -> Self { Self(Uuid::new_v4().to_string()) }

  pub fn as_str(&self) -> &str { &self.0 }

  /// Blank identifiers never match any owner and are rejected on writes.
  pub fn is_blank(&self) -> bool { self.0.trim().is_empty() }
}

impl std::fmt::Display for SessionId {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(&self.0)
  }
}

impl From<&str> for SessionId {
  fn from(s: &str) -> Self { Self(s.to_owned()) }
}

impl From<String> for SessionId {
  fn from(s: String) -> Self { Self(s) }
}

// ─── Provider ────────────────────────────────────────────────────────────────

/// Source of the current session's identifier.
pub trait IdentityProvider {
  /// The identifier is stable for the lifetime of the provider.
  fn current_session(&self) -> SessionId;
}

/// Demo-grade provider: a random identifier minted at construction and held
/// for the provider's lifetime. Mirrors anonymous sign-in — no credentials,
/// one identity per session object.
#[derive(Debug, Clone)]
pub struct AnonymousSession {
  id: SessionId,
}

impl AnonymousSession {
  pub fn new() -> Self {
    Self { id: SessionId::generate() }
  }
}

impl Default for AnonymousSession {
  fn default() -> Self { Self::new() }
}

impl IdentityProvider for AnonymousSession {
  fn current_session(&self) -> SessionId { self.id.clone() }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn anonymous_session_is_stable() {
    let provider = AnonymousSession::new();
    assert_eq!(provider.current_session(), provider.current_session());
  }

  #[test]
  fn distinct_sessions_get_distinct_ids() {
    let a = AnonymousSession::new();
    let b = AnonymousSession::new();
    assert_ne!(a.current_session(), b.current_session());
  }
}
