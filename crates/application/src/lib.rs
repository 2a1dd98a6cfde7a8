//! Garage Application - Authenticated API client core
//!
//! This crate defines:
//! - Port traits (storage, transport, token refresh, navigation, clock)
//! - The credential store and single-flight refresh coordinator
//! - The status event bus
//! - The authenticated client with its request/response pipeline
//! - Client configuration

pub mod auth;
pub mod client;
pub mod config;
pub mod events;
pub mod ports;

#[cfg(test)]
mod testing;

pub use auth::{CredentialStore, LEGACY_TOKEN_KEY, RefreshCoordinator, SESSION_KEY};
pub use client::{AuthenticatedClient, RetryDecision, classify, sign_request};
pub use config::{ClientConfig, ConfigError, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, resolve_base_url};
pub use events::{StatusEventBus, Subscription};
pub use ports::{Clock, KeyValueStorage, Navigator, Route, StorageError, TokenRefresher, Transport};
