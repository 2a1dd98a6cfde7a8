//! In-crate test doubles for the ports.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use garage_domain::{ApiError, ApiRequest, ApiResponse, AuthError, TokenPair};
use parking_lot::Mutex;

use crate::ports::{
    Clock, KeyValueStorage, Navigator, Route, StorageError, TokenRefresher, Transport,
};

/// HashMap-backed storage that can be told to fail every call.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<HashMap<String, String>>,
    failing: bool,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing() -> Self {
        Self {
            values: Mutex::default(),
            failing: true,
        }
    }

    pub fn insert(&self, key: &str, value: &str) {
        self.values.lock().insert(key.to_string(), value.to_string());
    }

    pub fn value(&self, key: &str) -> Option<String> {
        self.values.lock().get(key).cloned()
    }

    fn check(&self) -> Result<(), StorageError> {
        if self.failing {
            Err(StorageError::Unavailable("no storage in this context".to_string()))
        } else {
            Ok(())
        }
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.check()?;
        Ok(self.value(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.check()?;
        self.insert(key, value);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.check()?;
        self.values.lock().remove(key);
        Ok(())
    }
}

/// Refresher returning a fixed outcome after a short delay, counting calls.
pub struct FakeRefresher {
    outcome: Result<TokenPair, AuthError>,
    calls: AtomicUsize,
    seen: Mutex<Vec<String>>,
}

impl FakeRefresher {
    pub fn succeeding(tokens: TokenPair) -> Self {
        Self::with_outcome(Ok(tokens))
    }

    pub fn failing(error: AuthError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<TokenPair, AuthError>) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn tokens_seen(&self) -> Vec<String> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl TokenRefresher for FakeRefresher {
    async fn refresh(&self, refresh_token: &str) -> Result<TokenPair, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().push(refresh_token.to_string());
        // Long enough for every concurrent caller to join the attempt.
        tokio::time::sleep(Duration::from_millis(20)).await;
        self.outcome.clone()
    }
}

type Responder = dyn Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync;

/// Transport answering from a closure and recording every signed request.
#[derive(Clone)]
pub struct FakeTransport {
    responder: Arc<Responder>,
    sent: Arc<Mutex<Vec<ApiRequest>>>,
    latency: Arc<HashMap<String, Duration>>,
}

impl FakeTransport {
    pub fn new<F>(responder: F) -> Self
    where
        F: Fn(&ApiRequest) -> Result<ApiResponse, ApiError> + Send + Sync + 'static,
    {
        Self {
            responder: Arc::new(responder),
            sent: Arc::new(Mutex::new(Vec::new())),
            latency: Arc::default(),
        }
    }

    /// Delays every answer for `path` by `delay`.
    pub fn delayed(mut self, path: &str, delay: Duration) -> Self {
        Arc::make_mut(&mut self.latency).insert(path.to_string(), delay);
        self
    }

    /// Answers 200 only to `Bearer <valid_token>`, 401 otherwise.
    pub fn accepting(valid_token: &str) -> Self {
        let expected = format!("Bearer {valid_token}");
        Self::new(move |request| {
            if request.headers.get("Authorization") == Some(expected.as_str()) {
                Ok(ApiResponse::json_body(200, &serde_json::json!({"ok": true})))
            } else {
                Ok(ApiResponse::json_body(
                    401,
                    &serde_json::json!({"message": "Token expired"}),
                ))
            }
        })
    }

    pub fn sent(&self) -> Vec<ApiRequest> {
        self.sent.lock().clone()
    }

    pub fn sent_to(&self, path: &str) -> Vec<ApiRequest> {
        self.sent().into_iter().filter(|r| r.path == path).collect()
    }
}

impl Transport for FakeTransport {
    fn dispatch(
        &self,
        request: &ApiRequest,
    ) -> impl Future<Output = Result<ApiResponse, ApiError>> + Send {
        self.sent.lock().push(request.clone());
        let result = (self.responder)(request);
        let delay = self.latency.get(&request.path).copied();
        async move {
            match delay {
                Some(delay) => tokio::time::sleep(delay).await,
                None => tokio::task::yield_now().await,
            }
            result
        }
    }
}

/// Navigator recording requested routes.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

/// Clock pinned to a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Default for FixedClock {
    fn default() -> Self {
        Self(Utc.with_ymd_and_hms(2026, 3, 14, 9, 30, 0).single().unwrap_or_default())
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
