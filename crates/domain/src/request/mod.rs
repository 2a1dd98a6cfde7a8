//! Outbound request model.

mod header;
mod method;

pub use header::Headers;
pub use method::HttpMethod;

use serde::Serialize;
use serde_json::Value;

/// Paths whose 401 responses must never trigger a token refresh.
///
/// Matched by substring against the request path. A failure on any of these
/// means credentials could not be established or renewed, so refreshing
/// would be meaningless or recursive.
pub const AUTH_ENDPOINTS: [&str; 3] = ["/auth/login", "/auth/register", "/auth/refresh"];

/// Login endpoint path.
pub const LOGIN_PATH: &str = "/auth/login";
/// Registration endpoint path.
pub const REGISTER_PATH: &str = "/auth/register";
/// Token refresh endpoint path.
pub const REFRESH_PATH: &str = "/auth/refresh";

/// Header carrying the bearer token.
pub const AUTHORIZATION_HEADER: &str = "Authorization";
/// Header scoping the request to an organization.
pub const ORGANIZATION_HEADER: &str = "X-Organization-ID";

/// Returns true if `path` targets one of the [`AUTH_ENDPOINTS`].
#[must_use]
pub fn is_auth_endpoint(path: &str) -> bool {
    AUTH_ENDPOINTS.iter().any(|endpoint| path.contains(endpoint))
}

/// A request against the backend, relative to the configured base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path relative to the base URL, e.g. `/vehicles/12`.
    pub path: String,
    /// Query parameters in insertion order.
    pub query: Vec<(String, String)>,
    /// Request headers.
    pub headers: Headers,
    /// JSON body.
    pub body: Option<Value>,
    /// Set once the request has been replayed after a refresh.
    pub retry: bool,
}

impl ApiRequest {
    /// Creates a request with no body.
    #[must_use]
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            headers: Headers::new(),
            body: None,
            retry: false,
        }
    }

    /// GET request.
    #[must_use]
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Get, path)
    }

    /// POST request.
    #[must_use]
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Post, path)
    }

    /// PUT request.
    #[must_use]
    pub fn put(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Put, path)
    }

    /// PATCH request.
    #[must_use]
    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Patch, path)
    }

    /// DELETE request.
    #[must_use]
    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(HttpMethod::Delete, path)
    }

    /// Appends a query parameter.
    #[must_use]
    pub fn with_query(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.push((name.into(), value.into()));
        self
    }

    /// Sets a header, replacing any existing value.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.set(name, value);
        self
    }

    /// Sets a JSON body.
    #[must_use]
    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Serializes `body` as the JSON body.
    ///
    /// # Errors
    ///
    /// Returns an error if `body` cannot be represented as JSON.
    pub fn with_json<T: Serialize>(mut self, body: &T) -> Result<Self, serde_json::Error> {
        self.body = Some(serde_json::to_value(body)?);
        Ok(self)
    }

    /// Returns true if this request targets an auth endpoint.
    #[must_use]
    pub fn is_auth_endpoint(&self) -> bool {
        is_auth_endpoint(&self.path)
    }

    /// Returns the replay of this request, marked as a retry.
    #[must_use]
    pub fn into_retry(mut self) -> Self {
        self.retry = true;
        self
    }
}
