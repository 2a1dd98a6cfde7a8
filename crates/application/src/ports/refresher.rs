//! Token refresh port

use async_trait::async_trait;
use garage_domain::{AuthError, TokenPair};

/// Exchanges a refresh token for a new token pair.
///
/// Implementations perform the bare network call. They must not route
/// through the authenticated client, otherwise a failing refresh would
/// itself trigger a refresh.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    /// Calls the refresh endpoint with `refresh_token`.
    ///
    /// # Errors
    ///
    /// Returns an [`AuthError`] if the backend rejects the token or the call
    /// fails.
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError>;
}
