//! Session storage with synchronous reads and durable write-through.
//!
//! The store is the single source of truth for the current [`Session`].
//! Reads never await, because they sit on the request-signing path; writes
//! update the cache first and then persist to the injected
//! [`KeyValueStorage`]. Storage failures are logged and swallowed so the
//! client keeps working where no durable storage exists.

use std::sync::Arc;

use garage_domain::{Session, TokenPair};
use parking_lot::RwLock;

use crate::ports::{KeyValueStorage, StorageError};

/// Storage key holding the serialized session.
pub const SESSION_KEY: &str = "garage.session";

/// Key written by older console builds that only stored the access token.
pub const LEGACY_TOKEN_KEY: &str = "token";

/// Thread-safe holder of the current session.
pub struct CredentialStore {
    storage: Arc<dyn KeyValueStorage>,
    /// `None` until hydrated from storage.
    cache: RwLock<Option<Option<Session>>>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("loaded", &self.cache.read().is_some())
            .finish_non_exhaustive()
    }
}

impl CredentialStore {
    /// Creates a store backed by `storage`. Nothing is read until the first
    /// access.
    #[must_use]
    pub fn new(storage: Arc<dyn KeyValueStorage>) -> Self {
        Self {
            storage,
            cache: RwLock::new(None),
        }
    }

    /// Returns the current session, hydrating from storage on first use.
    #[must_use]
    pub fn get(&self) -> Option<Session> {
        if let Some(session) = &*self.cache.read() {
            return session.clone();
        }

        let mut cache = self.cache.write();
        self.ensure_loaded(&mut cache).clone()
    }

    /// Replaces the current session and writes it through to storage.
    ///
    /// Passing `None` removes the durable entry. A session without both
    /// tokens is kept in memory only.
    pub fn set(&self, session: Option<Session>) {
        let mut cache = self.cache.write();
        self.persist(session.as_ref());
        *cache = Some(session);
    }

    /// Replaces the tokens of the current session, keeping every other
    /// field. Does nothing when there is no session.
    ///
    /// Returns true if a session was updated.
    pub fn set_tokens(
        &self,
        access_token: impl Into<String>,
        refresh_token: impl Into<String>,
    ) -> bool {
        let tokens = TokenPair::new(access_token, refresh_token);
        let mut cache = self.cache.write();
        let Some(session) = self.ensure_loaded(&mut cache) else {
            return false;
        };
        session.apply_tokens(tokens);
        self.persist(Some(&*session));
        true
    }

    /// Stores a freshly issued token pair.
    ///
    /// Merges into the current session, or, if the session disappeared while
    /// the pair was being obtained, starts a token-only session so the pair
    /// is not lost.
    pub fn store_tokens(&self, tokens: TokenPair) {
        let mut cache = self.cache.write();
        let slot = self.ensure_loaded(&mut cache);
        match slot {
            Some(session) => {
                session.apply_tokens(tokens);
                self.persist(Some(&*session));
            }
            None => {
                tracing::debug!("session vanished during refresh, storing token-only session");
                let session = Session::from_tokens(tokens);
                self.persist(Some(&session));
                *slot = Some(session);
            }
        }
    }

    /// Destroys the session and purges legacy keys.
    pub fn clear(&self) {
        self.set(None);
        if let Err(e) = self.storage.remove(LEGACY_TOKEN_KEY) {
            tracing::warn!(error = %e, "failed to remove legacy token key");
        }
    }

    /// Returns true if a session with an access token exists.
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.get().is_some_and(|s| s.access_token().is_some())
    }

    fn ensure_loaded<'a>(
        &self,
        cache: &'a mut Option<Option<Session>>,
    ) -> &'a mut Option<Session> {
        cache.get_or_insert_with(|| self.hydrate())
    }

    fn hydrate(&self) -> Option<Session> {
        let raw = match self.storage.get(SESSION_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return None,
            Err(e @ StorageError::Serialization(_)) => {
                tracing::warn!(error = %e, "session storage is corrupt, discarding it");
                self.purge();
                return None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "session storage unavailable, starting signed out");
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if session.is_persistable() => Some(session),
            Ok(_) => {
                tracing::warn!("stored session is missing a token, discarding it");
                self.purge();
                None
            }
            Err(e) => {
                tracing::warn!(error = %e, "stored session is malformed, discarding it");
                self.purge();
                None
            }
        }
    }

    fn persist(&self, session: Option<&Session>) {
        let result = match session {
            Some(session) if session.is_persistable() => match serde_json::to_string(session) {
                Ok(json) => self.storage.set(SESSION_KEY, &json),
                Err(e) => {
                    tracing::warn!(error = %e, "failed to serialize session");
                    return;
                }
            },
            Some(_) => {
                tracing::warn!("session without both tokens is not persisted");
                self.storage.remove(SESSION_KEY)
            }
            None => self.storage.remove(SESSION_KEY),
        };

        if let Err(e) = result {
            tracing::warn!(error = %e, "failed to persist session");
        }
    }

    fn purge(&self) {
        if let Err(e) = self.storage.remove(SESSION_KEY) {
            tracing::warn!(error = %e, "failed to purge stored session");
        }
    }
}
