//! Token refresh over a bare HTTP client.
//!
//! Talks to `POST /auth/refresh` with its own `reqwest::Client`, outside the
//! authenticated pipeline, so a rejected refresh can never trigger another
//! refresh.

use async_trait::async_trait;
use garage_application::{ClientConfig, TokenRefresher};
use garage_domain::request::REFRESH_PATH;
use garage_domain::{AuthError, TokenPair, extract_server_message};
use serde::Serialize;

use crate::adapters::USER_AGENT;

/// Refresh request body.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RefreshRequest<'a> {
    refresh_token: &'a str,
}

/// Refresher calling the backend's refresh endpoint directly.
#[derive(Debug, Clone)]
pub struct HttpTokenRefresher {
    http_client: reqwest::Client,
    config: ClientConfig,
}

impl HttpTokenRefresher {
    /// Creates a refresher with its own client and the configured timeout.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be created.
    pub fn new(config: ClientConfig) -> Result<Self, AuthError> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(config.request_timeout)
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        Ok(Self {
            http_client,
            config,
        })
    }

    fn map_error(error: &reqwest::Error) -> AuthError {
        if error.is_timeout() {
            AuthError::Timeout
        } else {
            AuthError::Network {
                message: error.to_string(),
            }
        }
    }
}

#[async_trait]
impl TokenRefresher for HttpTokenRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        let url = self
            .config
            .endpoint(REFRESH_PATH, &[])
            .map_err(|e| AuthError::Network {
                message: e.to_string(),
            })?;

        let response = self
            .http_client
            .post(url)
            .json(&RefreshRequest { refresh_token })
            .send()
            .await
            .map_err(|e| Self::map_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&error_text)
                .ok()
                .as_ref()
                .and_then(extract_server_message)
                .unwrap_or(error_text);
            return Err(AuthError::RefreshRejected {
                status: status.as_u16(),
                message,
            });
        }

        let bytes = response.bytes().await.map_err(|e| Self::map_error(&e))?;
        let tokens: TokenPair =
            serde_json::from_slice(&bytes).map_err(|e| AuthError::InvalidResponse {
                message: format!("Failed to parse refresh response: {e}"),
            })?;

        if tokens.access_token.is_empty() || tokens.refresh_token.is_empty() {
            return Err(AuthError::InvalidResponse {
                message: "refresh response is missing a token".to_string(),
            });
        }
        Ok(tokens)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn refresher_for(server: &MockServer) -> HttpTokenRefresher {
        let base_url = format!("{}/api", server.uri());
        let config = ClientConfig::resolve(Some(&base_url), None, None).unwrap();
        HttpTokenRefresher::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_refresh_success() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .and(body_json(json!({"refreshToken": "r1"})))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"accessToken": "a2", "refreshToken": "r2"})),
            )
            .expect(1)
            .mount(&server)
            .await;

        let tokens = refresher_for(&server).await.refresh("r1").await.unwrap();

        assert_eq!(tokens, TokenPair::new("a2", "r2"));
    }

    #[tokio::test]
    async fn test_refresh_rejected_carries_server_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(
                ResponseTemplate::new(401)
                    .set_body_json(json!({"message": "Refresh token revoked"})),
            )
            .mount(&server)
            .await;

        let error = refresher_for(&server).await.refresh("r1").await.unwrap_err();

        assert_eq!(
            error,
            AuthError::RefreshRejected {
                status: 401,
                message: "Refresh token revoked".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_refresh_with_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/auth/refresh"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "a2"})))
            .mount(&server)
            .await;

        let error = refresher_for(&server).await.refresh("r1").await.unwrap_err();

        assert!(matches!(error, AuthError::InvalidResponse { .. }));
    }
}
