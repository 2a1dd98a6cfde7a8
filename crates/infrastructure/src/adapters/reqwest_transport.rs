//! HTTP transport implementation using reqwest.
//!
//! This adapter implements the `Transport` port. It turns a signed
//! `ApiRequest` into a reqwest call against the configured base URL and
//! hands back whatever the server answered, whatever the status.

use std::future::Future;

use garage_application::{ClientConfig, Transport};
use garage_domain::{ApiError, ApiRequest, ApiResponse, Headers, HttpMethod};
use reqwest::{Client, Method};

/// User-Agent sent with every request.
pub(crate) const USER_AGENT: &str = concat!("garage-console/", env!("CARGO_PKG_VERSION"));

/// Transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: Client,
    config: ClientConfig,
}

impl ReqwestTransport {
    /// Creates a transport with the configured timeout.
    ///
    /// Default configuration:
    /// - Timeout: `config.request_timeout`
    /// - Follow redirects: up to 10
    /// - User-Agent: `garage-console/<version>`
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// The configuration this transport targets.
    #[must_use]
    pub const fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Converts domain `HttpMethod` to reqwest `Method`.
    const fn to_reqwest_method(method: HttpMethod) -> Method {
        match method {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Patch => Method::PATCH,
            HttpMethod::Delete => Method::DELETE,
        }
    }
}

/// Maps reqwest errors to `ApiError`.
///
/// Only called when no response exists; a status code is never turned into
/// an error here.
pub(crate) fn map_error(error: &reqwest::Error, timeout_ms: u64) -> ApiError {
    if error.is_timeout() {
        return ApiError::Timeout { timeout_ms };
    }
    if error.is_builder() {
        return ApiError::InvalidUrl(error.to_string());
    }
    if error.is_decode() || error.is_body() {
        return ApiError::Decode(error.to_string());
    }
    ApiError::Network(error.to_string())
}

impl ReqwestTransport {
    async fn execute(
        client: Client,
        method: Method,
        url: Result<url::Url, ApiError>,
        headers: Vec<(String, String)>,
        body: Option<serde_json::Value>,
        timeout_ms: u64,
    ) -> Result<ApiResponse, ApiError> {
        let mut builder = client.request(method, url?);
        for (name, value) in &headers {
            builder = builder.header(name, value);
        }
        if let Some(body) = &body {
            builder = builder.json(body);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| map_error(&e, timeout_ms))?;

        let status = response.status().as_u16();
        let response_headers: Headers = response
            .headers()
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_str().unwrap_or("<binary>").to_string()))
            .collect();

        // Once the status line is in, the status decides the outcome; a body
        // that fails to arrive is reported as empty.
        let body = match response.bytes().await {
            Ok(bytes) => bytes.to_vec(),
            Err(e) => {
                tracing::warn!(status, error = %map_error(&e, timeout_ms), "response body lost");
                Vec::new()
            }
        };

        tracing::debug!(status, bytes = body.len(), "response received");
        Ok(ApiResponse::new(status, response_headers, body))
    }
}

impl Transport for ReqwestTransport {
    fn dispatch(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send {
        let headers = request
            .headers
            .iter()
            .map(|(n, v)| (n.to_string(), v.to_string()))
            .collect();

        Self::execute(
            self.client.clone(),
            Self::to_reqwest_method(request.method),
            self.config.endpoint(&request.path, &request.query),
            headers,
            request.body.clone(),
            self.config.timeout_ms(),
        )
    }
}
