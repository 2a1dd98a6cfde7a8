//! Status events raised by the API client for the UI layer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Message shown when the session could not be renewed.
pub const SESSION_EXPIRED_MESSAGE: &str = "Your session has expired. Please sign in again.";

/// Message shown when the server refuses access without a reason.
pub const PERMISSION_DENIED_MESSAGE: &str = "You do not have permission to perform this action.";

/// Kind of authorization failure being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusKind {
    /// The session is gone; the user must sign in again.
    Unauthorized,
    /// The user is signed in but lacks permission.
    Forbidden,
}

impl StatusKind {
    /// HTTP status associated with this kind.
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::Unauthorized => 401,
            Self::Forbidden => 403,
        }
    }

    /// Message used when the server does not provide one.
    #[must_use]
    pub const fn default_message(self) -> &'static str {
        match self {
            Self::Unauthorized => SESSION_EXPIRED_MESSAGE,
            Self::Forbidden => PERMISSION_DENIED_MESSAGE,
        }
    }

    /// Lowercase name, as used on the wire.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::Forbidden => "forbidden",
        }
    }
}

impl std::fmt::Display for StatusKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ephemeral notification record delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusEvent {
    /// Which failure occurred.
    pub kind: StatusKind,
    /// HTTP status that triggered the event.
    pub status: u16,
    /// User-facing message.
    pub message: String,
    /// When the event was raised.
    pub timestamp: DateTime<Utc>,
}

impl StatusEvent {
    /// Creates an event, falling back to the kind's default message.
    #[must_use]
    pub fn new(kind: StatusKind, message: Option<String>, timestamp: DateTime<Utc>) -> Self {
        Self {
            kind,
            status: kind.status(),
            message: message.unwrap_or_else(|| kind.default_message().to_string()),
            timestamp,
        }
    }
}
