//! Client configuration.
//!
//! The base URL is resolved in order: an explicitly configured URL, then
//! one inferred from the host the console is served from, then the local
//! development default.

use std::time::Duration;

use garage_domain::ApiError;
use thiserror::Error;
use url::{Host, Url};

/// Base URL used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Timeout applied to every request, refresh calls included.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Port the backend listens on when the console runs on a loopback host.
const LOCAL_API_PORT: u16 = 3000;

/// Configuration errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A configured or inferred base URL is not a valid absolute URL.
    #[error("invalid base URL '{url}': {message}")]
    InvalidBaseUrl {
        /// The offending value.
        url: String,
        /// Parser message.
        message: String,
    },

    /// The configuration source could not be read.
    #[error("failed to load configuration: {0}")]
    Source(String),
}

/// Settings shared by the transport and the refresher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Backend base URL, e.g. `https://console.example.com/api`.
    pub base_url: Url,
    /// Per-request timeout.
    pub request_timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            request_timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ClientConfig {
    /// Creates a configuration from an already resolved base URL.
    #[must_use]
    pub const fn new(base_url: Url, request_timeout: Duration) -> Self {
        Self {
            base_url,
            request_timeout,
        }
    }

    /// Builds a configuration using [`resolve_base_url`].
    ///
    /// # Errors
    ///
    /// Returns an error if the resolved URL is invalid.
    pub fn resolve(
        explicit_url: Option<&str>,
        current_host: Option<&str>,
        request_timeout: Option<Duration>,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            base_url: resolve_base_url(explicit_url, current_host)?,
            request_timeout: request_timeout.unwrap_or(DEFAULT_TIMEOUT),
        })
    }

    /// Request timeout in milliseconds.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn timeout_ms(&self) -> u64 {
        self.request_timeout.as_millis() as u64
    }

    /// Absolute URL for `path` (relative to the base URL) plus `query`.
    ///
    /// The base URL's own path is kept: `/vehicles` against
    /// `https://host/api` yields `https://host/api/vehicles`.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::InvalidUrl`] if the result does not parse.
    pub fn endpoint(&self, path: &str, query: &[(String, String)]) -> Result<Url, ApiError> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let path = path.trim_start_matches('/');
        let mut url = Url::parse(&format!("{base}/{path}"))
            .map_err(|e| ApiError::InvalidUrl(format!("{e}: {base}/{path}")))?;
        if !query.is_empty() {
            url.query_pairs_mut().extend_pairs(query);
        }
        Ok(url)
    }
}

/// Resolves the backend base URL.
///
/// 1. `explicit_url` when present and non-blank.
/// 2. Inferred from `current_host`: `http://<host>:3000/api` for loopback
///    and unspecified addresses (`localhost`, `127.0.0.1`, `0.0.0.0`, `[::1]`),
///    `https://<host>/api` otherwise.
/// 3. [`DEFAULT_BASE_URL`].
///
/// # Errors
///
/// Returns [`ConfigError::InvalidBaseUrl`] if the chosen candidate is not a
/// valid absolute URL.
pub fn resolve_base_url(
    explicit_url: Option<&str>,
    current_host: Option<&str>,
) -> Result<Url, ConfigError> {
    let candidate = if let Some(url) = explicit_url.map(str::trim).filter(|u| !u.is_empty()) {
        url.to_string()
    } else if let Some(host) = current_host.map(str::trim).filter(|h| !h.is_empty()) {
        infer_from_host(host)
    } else {
        return Ok(default_base_url());
    };

    Url::parse(&candidate).map_err(|e| ConfigError::InvalidBaseUrl {
        url: candidate.clone(),
        message: e.to_string(),
    })
}

fn infer_from_host(host: &str) -> String {
    // Parsing as an authority handles ports and bracketed IPv6 literals.
    let parsed = Url::parse(&format!("http://{host}"))
        .ok()
        .and_then(|url| url.host().map(|h| h.to_owned()));
    match parsed {
        Some(hostname) if is_local(&hostname) => {
            format!("http://{hostname}:{LOCAL_API_PORT}/api")
        }
        _ => format!("https://{host}/api"),
    }
}

fn is_local(host: &Host) -> bool {
    match host {
        Host::Domain(domain) => domain == "localhost",
        Host::Ipv4(ip) => ip.is_loopback() || ip.is_unspecified(),
        Host::Ipv6(ip) => ip.is_loopback() || ip.is_unspecified(),
    }
}

#[allow(clippy::expect_used)]
fn default_base_url() -> Url {
    Url::parse(DEFAULT_BASE_URL).expect("default base URL is valid")
}
