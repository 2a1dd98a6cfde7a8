//! Authenticated API client.
//!
//! Every request goes through the same pipeline:
//!
//! 1. sign with the current session ([`sign_request`])
//! 2. dispatch through the [`Transport`]
//! 3. classify the response ([`classify`]) and either pass it through,
//!    refresh and replay once, tear the session down, or report a
//!    permission failure.
//!
//! Callers only ever see an error-free result when the request succeeded,
//! possibly after a transparent refresh. Every terminal path still returns
//! an error so call-site handling keeps working.

mod interceptor;
mod retry;

pub use interceptor::sign_request;
pub use retry::{RetryDecision, classify};

use std::sync::Arc;

use garage_domain::request::{LOGIN_PATH, REGISTER_PATH};
use garage_domain::{
    ApiError, ApiRequest, ApiResponse, AuthError, Credentials, LoginResponse, Registration,
    Session, StatusEvent, StatusKind,
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::Instrument;

use crate::auth::{CredentialStore, RefreshCoordinator};
use crate::events::StatusEventBus;
use crate::ports::{Clock, Navigator, Route, TokenRefresher, Transport};

/// HTTP client that authenticates every request and recovers from expired
/// access tokens.
pub struct AuthenticatedClient<T> {
    transport: T,
    store: Arc<CredentialStore>,
    coordinator: Arc<RefreshCoordinator>,
    events: Arc<StatusEventBus>,
    navigator: Arc<dyn Navigator>,
    clock: Arc<dyn Clock>,
}

impl<T> std::fmt::Debug for AuthenticatedClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthenticatedClient")
            .field("store", &self.store)
            .field("coordinator", &self.coordinator)
            .finish_non_exhaustive()
    }
}

impl<T: Transport> AuthenticatedClient<T> {
    /// Wires a client from its collaborators.
    ///
    /// The refresh coordinator is built from `store` and `refresher`; the
    /// refresher must talk to the backend directly, not through this client.
    #[must_use]
    pub fn new(
        transport: T,
        store: Arc<CredentialStore>,
        refresher: Arc<dyn TokenRefresher>,
        events: Arc<StatusEventBus>,
        navigator: Arc<dyn Navigator>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let coordinator = Arc::new(RefreshCoordinator::new(Arc::clone(&store), refresher));
        Self {
            transport,
            store,
            coordinator,
            events,
            navigator,
            clock,
        }
    }

    /// The credential store backing this client.
    #[must_use]
    pub const fn store(&self) -> &Arc<CredentialStore> {
        &self.store
    }

    /// The status event bus this client publishes to.
    #[must_use]
    pub const fn events(&self) -> &Arc<StatusEventBus> {
        &self.events
    }

    /// Returns true if a session with an access token exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.store.is_authenticated()
    }

    /// Sends `request` through the authentication pipeline.
    ///
    /// # Errors
    ///
    /// - [`ApiError::SessionExpired`] when a 401 could not be recovered by
    ///   refreshing; the session has been destroyed.
    /// - [`ApiError::Status`] for any other non-success response, including
    ///   a 401 on a replay or an auth endpoint, and 403.
    /// - Transport errors (timeout, network) unchanged.
    pub async fn send(&self, request: ApiRequest) -> Result<ApiResponse, ApiError> {
        let span = tracing::debug_span!(
            "api_request",
            id = %uuid::Uuid::now_v7(),
            method = %request.method,
            path = %request.path,
        );
        self.send_inner(request).instrument(span).await
    }

    async fn send_inner(&self, mut request: ApiRequest) -> Result<ApiResponse, ApiError> {
        loop {
            let session = self.store.get();
            let signed_with = session.as_ref().and_then(|s| s.access_token().map(str::to_owned));
            let signed = sign_request(&request, session.as_ref());
            let response = self.transport.dispatch(&signed).await?;

            match classify(response.status, &request) {
                RetryDecision::PassThrough => return response.error_for_status(),
                RetryDecision::Forbidden => return Err(self.on_forbidden(response)),
                RetryDecision::Refresh => {
                    if self.token_rotated_since(signed_with.as_deref()) {
                        tracing::debug!("access token already rotated, replaying");
                    } else {
                        tracing::debug!("access token rejected, refreshing");
                        if let Err(e) = self.coordinator.refresh().await {
                            return Err(self.on_session_expired(e));
                        }
                    }
                    request = request.into_retry();
                }
            }
        }
    }

    /// True when the store holds an access token other than `signed_with`,
    /// i.e. a refresh settled while the request was in flight.
    fn token_rotated_since(&self, signed_with: Option<&str>) -> bool {
        let current = self.store.get();
        match (current.as_ref().and_then(Session::access_token), signed_with) {
            (Some(current), Some(signed_with)) => current != signed_with,
            (Some(_), None) => true,
            (None, _) => false,
        }
    }

    /// Sends a GET request and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`]; also [`ApiError::Decode`].
    pub async fn get<R: DeserializeOwned>(&self, path: &str) -> Result<R, ApiError> {
        self.send(ApiRequest::get(path)).await?.json()
    }

    /// Sends a POST request with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`]; also [`ApiError::Decode`].
    pub async fn post<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::post(path).with_json(body).map_err(encode_error)?;
        self.send(request).await?.json()
    }

    /// Sends a PUT request with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`]; also [`ApiError::Decode`].
    pub async fn put<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::put(path).with_json(body).map_err(encode_error)?;
        self.send(request).await?.json()
    }

    /// Sends a PATCH request with a JSON body and decodes the JSON response.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`]; also [`ApiError::Decode`].
    pub async fn patch<B: Serialize + Sync, R: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<R, ApiError> {
        let request = ApiRequest::patch(path).with_json(body).map_err(encode_error)?;
        self.send(request).await?.json()
    }

    /// Sends a DELETE request, discarding any response body.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`].
    pub async fn delete(&self, path: &str) -> Result<(), ApiError> {
        self.send(ApiRequest::delete(path)).await.map(|_| ())
    }

    /// Signs in and stores the resulting session.
    ///
    /// A 401 here means bad credentials and is returned as-is; it never
    /// triggers a refresh.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`]; also [`ApiError::Decode`].
    pub async fn login(&self, credentials: &Credentials) -> Result<Session, ApiError> {
        self.authenticate(LOGIN_PATH, credentials).await
    }

    /// Creates an account and stores the resulting session.
    ///
    /// # Errors
    ///
    /// See [`AuthenticatedClient::send`]; also [`ApiError::Decode`].
    pub async fn register(&self, registration: &Registration) -> Result<Session, ApiError> {
        self.authenticate(REGISTER_PATH, registration).await
    }

    /// Destroys the local session.
    pub fn logout(&self) {
        tracing::info!("signing out");
        self.store.clear();
    }

    async fn authenticate<B: Serialize + Sync>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<Session, ApiError> {
        let request = ApiRequest::post(path).with_json(body).map_err(encode_error)?;
        let response: LoginResponse = self.send(request).await?.json()?;
        let session = Session::from(response);
        tracing::info!(user_id = ?session.user_id, role = ?session.role, "signed in");
        self.store.set(Some(session.clone()));
        Ok(session)
    }

    fn on_session_expired(&self, error: AuthError) -> ApiError {
        tracing::warn!(error = %error, "session could not be renewed, signing out");
        self.store.clear();
        self.events.emit(&StatusEvent::new(
            StatusKind::Unauthorized,
            None,
            self.clock.now(),
        ));
        self.navigator.navigate(Route::Login);
        ApiError::SessionExpired(error)
    }

    fn on_forbidden(&self, response: ApiResponse) -> ApiError {
        let error = ApiError::from_status(response.status.as_u16(), &response.body);
        tracing::warn!(message = ?error.server_message(), "request forbidden");
        self.events.emit(&StatusEvent::new(
            StatusKind::Forbidden,
            error.server_message().map(str::to_owned),
            self.clock.now(),
        ));
        self.navigator.navigate(Route::Home);
        error
    }
}

fn encode_error(error: serde_json::Error) -> ApiError {
    ApiError::Decode(format!("failed to encode request body: {error}"))
}
