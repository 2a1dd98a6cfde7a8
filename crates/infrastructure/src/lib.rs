//! Garage Infrastructure - Adapters and implementations
//!
//! This crate provides concrete implementations of the ports
//! defined in the application layer, plus the production wiring.

pub mod adapters;
pub mod auth;
pub mod builder;
pub mod config;
pub mod persistence;

pub use adapters::{ChannelNavigator, ReqwestTransport, SystemClock};
pub use auth::HttpTokenRefresher;
pub use builder::{ClientBuilder, Connection, GarageClient};
pub use config::{EnvSettings, load_client_config};
pub use persistence::{FileStorage, MemoryStorage, NullStorage};
