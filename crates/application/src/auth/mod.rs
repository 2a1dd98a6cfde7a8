//! Session state and token renewal.
//!
//! This module provides:
//! - The credential store holding the current session
//! - The single-flight refresh coordinator

mod credential_store;
mod refresh;

pub use credential_store::{CredentialStore, LEGACY_TOKEN_KEY, SESSION_KEY};
pub use refresh::RefreshCoordinator;
