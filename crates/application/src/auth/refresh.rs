//! Single-flight token refresh.
//!
//! However many requests fail with 401 at the same time, only one refresh
//! call reaches the backend. The first caller starts it; everyone arriving
//! while it is pending awaits the same shared future and receives the same
//! outcome. A successful pair is written to the store before the slot is
//! emptied, so a request that sees an empty slot also sees the new tokens.
//! The next failure after settlement starts a fresh attempt.

use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use garage_domain::{AuthError, TokenPair};
use parking_lot::Mutex;

use super::CredentialStore;
use crate::ports::TokenRefresher;

type PendingRefresh = Shared<BoxFuture<'static, Result<TokenPair, AuthError>>>;

/// Collapses concurrent refresh attempts into one network call.
///
/// The coordinator reads the refresh token from the [`CredentialStore`] and
/// stores the pair it obtains. Tearing the session down on failure is the
/// caller's job.
pub struct RefreshCoordinator {
    store: Arc<CredentialStore>,
    refresher: Arc<dyn TokenRefresher>,
    in_flight: Arc<Mutex<Option<PendingRefresh>>>,
}

impl std::fmt::Debug for RefreshCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RefreshCoordinator")
            .field("in_flight", &self.is_in_flight())
            .finish_non_exhaustive()
    }
}

impl RefreshCoordinator {
    /// Creates a coordinator reading tokens from `store` and calling
    /// `refresher` for the network exchange.
    #[must_use]
    pub fn new(store: Arc<CredentialStore>, refresher: Arc<dyn TokenRefresher>) -> Self {
        Self {
            store,
            refresher,
            in_flight: Arc::new(Mutex::new(None)),
        }
    }

    /// Obtains a new token pair, joining an in-flight refresh if one exists.
    ///
    /// # Errors
    ///
    /// Returns [`AuthError::NoRefreshToken`] immediately when the current
    /// session has no refresh token, otherwise whatever the refresh call
    /// failed with. Every caller sharing the attempt receives the same error.
    pub async fn refresh(&self) -> Result<TokenPair, AuthError> {
        let pending = {
            let mut slot = self.in_flight.lock();
            if let Some(pending) = slot.as_ref() {
                tracing::debug!("joining in-flight token refresh");
                pending.clone()
            } else {
                let refresh_token = self
                    .store
                    .get()
                    .and_then(|session| session.refresh_token().map(str::to_owned))
                    .ok_or(AuthError::NoRefreshToken)?;

                let pending = self.start(refresh_token);
                *slot = Some(pending.clone());
                pending
            }
        };

        pending.await
    }

    /// Returns true while a refresh is pending.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.in_flight.lock().is_some()
    }

    fn start(&self, refresh_token: String) -> PendingRefresh {
        let store = Arc::clone(&self.store);
        let refresher = Arc::clone(&self.refresher);
        let in_flight = Arc::clone(&self.in_flight);

        async move {
            tracing::info!("refreshing access token");
            let result = refresher.refresh(&refresh_token).await;
            if let Ok(tokens) = &result {
                store.store_tokens(tokens.clone());
            }
            in_flight.lock().take();

            match &result {
                Ok(_) => tracing::info!("access token refreshed"),
                Err(e) => tracing::warn!(error = %e, "access token refresh failed"),
            }
            result
        }
        .boxed()
        .shared()
    }
}
