//! Garage Domain - Core types for the console API client
//!
//! This crate defines the session, request/response and error model shared
//! by the authenticated client. All types here are pure Rust with no I/O.

pub mod error;
pub mod event;
pub mod request;
pub mod response;
pub mod session;

pub use error::{ApiError, AuthError, extract_server_message};
pub use event::{StatusEvent, StatusKind};
pub use request::{ApiRequest, Headers, HttpMethod, is_auth_endpoint};
pub use response::{ApiResponse, StatusCode};
pub use session::{Credentials, LoginResponse, Organization, Registration, Role, Session, TokenPair};
