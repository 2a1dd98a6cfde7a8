//! Production wiring of the authenticated client.

use std::sync::Arc;

use garage_application::{
    AuthenticatedClient, ClientConfig, CredentialStore, KeyValueStorage, Route, StatusEventBus,
};
use garage_domain::ApiError;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::adapters::{ChannelNavigator, ReqwestTransport, SystemClock};
use crate::auth::HttpTokenRefresher;
use crate::persistence::MemoryStorage;

/// Client backed by reqwest.
pub type GarageClient = AuthenticatedClient<ReqwestTransport>;

/// Builder for a [`GarageClient`] and its navigation channel.
pub struct ClientBuilder {
    config: ClientConfig,
    storage: Option<Arc<dyn KeyValueStorage>>,
    events: Option<Arc<StatusEventBus>>,
}

impl std::fmt::Debug for ClientBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientBuilder")
            .field("config", &self.config)
            .field("custom_storage", &self.storage.is_some())
            .finish_non_exhaustive()
    }
}

/// A wired client plus the receiver of navigation requests it produces.
#[derive(Debug)]
pub struct Connection {
    /// The authenticated client.
    pub client: GarageClient,
    /// Routes the client asks the UI to show.
    pub routes: UnboundedReceiver<Route>,
}

impl ClientBuilder {
    /// Starts a builder for `config`.
    #[must_use]
    pub const fn new(config: ClientConfig) -> Self {
        Self {
            config,
            storage: None,
            events: None,
        }
    }

    /// Sets the durable storage. Defaults to in-memory storage.
    #[must_use]
    pub fn storage(mut self, storage: Arc<dyn KeyValueStorage>) -> Self {
        self.storage = Some(storage);
        self
    }

    /// Shares an existing event bus instead of creating one.
    #[must_use]
    pub fn events(mut self, events: Arc<StatusEventBus>) -> Self {
        self.events = Some(events);
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Returns [`ApiError::Network`] if an HTTP client cannot be created.
    pub fn build(self) -> Result<Connection, ApiError> {
        let transport = ReqwestTransport::new(self.config.clone())?;
        let refresher = HttpTokenRefresher::new(self.config.clone())
            .map_err(|e| ApiError::Network(e.to_string()))?;
        let storage = self
            .storage
            .unwrap_or_else(|| Arc::new(MemoryStorage::new()));
        let store = Arc::new(CredentialStore::new(storage));
        let events = self.events.unwrap_or_default();
        let (navigator, routes) = ChannelNavigator::new();

        tracing::debug!(base_url = %self.config.base_url, "client built");
        let client = AuthenticatedClient::new(
            transport,
            store,
            Arc::new(refresher),
            events,
            Arc::new(navigator),
            Arc::new(SystemClock::new()),
        );
        Ok(Connection { client, routes })
    }
}
