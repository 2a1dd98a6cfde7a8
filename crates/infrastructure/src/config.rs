//! Environment-driven configuration.
//!
//! Recognised variables (all optional):
//! - `GARAGE_API_URL`: explicit backend base URL
//! - `GARAGE_HOST`: host the console is served from, used to infer the URL
//! - `GARAGE_TIMEOUT_MS`: per-request timeout in milliseconds

use std::time::Duration;

use garage_application::{ClientConfig, ConfigError};
use serde::Deserialize;

/// Prefix shared by every configuration variable.
pub const ENV_PREFIX: &str = "GARAGE";

/// Raw settings as read from the environment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EnvSettings {
    /// Explicit base URL.
    pub api_url: Option<String>,
    /// Serving host.
    pub host: Option<String>,
    /// Request timeout in milliseconds.
    pub timeout_ms: Option<u64>,
}

impl EnvSettings {
    /// Reads settings from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Source`] if a variable has the wrong type.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::load(environment())
    }

    /// Reads settings from `vars` instead of the process environment.
    ///
    /// Keys use the same names as the environment, e.g. `GARAGE_API_URL`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Source`] if a variable has the wrong type.
    pub fn from_vars<I, K, V>(vars: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let vars: config::Map<String, String> = vars
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::load(environment().source(Some(vars)))
    }

    fn load(source: config::Environment) -> Result<Self, ConfigError> {
        config::Config::builder()
            .add_source(source)
            .build()
            .and_then(config::Config::try_deserialize)
            .map_err(|e| ConfigError::Source(e.to_string()))
    }

    /// Resolves these settings into a client configuration.
    ///
    /// A zero timeout falls back to the default.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidBaseUrl`] if the resolved URL is invalid.
    pub fn into_client_config(self) -> Result<ClientConfig, ConfigError> {
        let timeout = self
            .timeout_ms
            .filter(|ms| *ms > 0)
            .map(Duration::from_millis);
        ClientConfig::resolve(self.api_url.as_deref(), self.host.as_deref(), timeout)
    }
}

fn environment() -> config::Environment {
    config::Environment::with_prefix(ENV_PREFIX).try_parsing(true)
}

/// Loads the client configuration from the process environment.
///
/// # Errors
///
/// Returns an error if a variable is malformed or the URL is invalid.
pub fn load_client_config() -> Result<ClientConfig, ConfigError> {
    let settings = EnvSettings::from_env()?;
    tracing::debug!(?settings, "configuration loaded");
    settings.into_client_config()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use garage_application::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_reads_prefixed_vars() {
        let settings = EnvSettings::from_vars([
            ("GARAGE_API_URL", "https://api.garage.test/api"),
            ("GARAGE_TIMEOUT_MS", "2500"),
            ("OTHER_VAR", "ignored"),
        ])
        .unwrap();

        assert_eq!(
            settings,
            EnvSettings {
                api_url: Some("https://api.garage.test/api".to_string()),
                host: None,
                timeout_ms: Some(2500),
            }
        );

        let config = settings.into_client_config().unwrap();
        assert_eq!(config.base_url.as_str(), "https://api.garage.test/api");
        assert_eq!(config.request_timeout, Duration::from_millis(2500));
    }

    #[test]
    fn test_empty_environment_uses_defaults() {
        let config = EnvSettings::from_vars(Vec::<(String, String)>::new())
            .unwrap()
            .into_client_config()
            .unwrap();

        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout, DEFAULT_TIMEOUT);
    }

    #[test]
    fn test_host_inference() {
        let config = EnvSettings::from_vars([("GARAGE_HOST", "console.garage.test")])
            .unwrap()
            .into_client_config()
            .unwrap();

        assert_eq!(config.base_url.as_str(), "https://console.garage.test/api");
    }

    #[test]
    fn test_malformed_timeout() {
        let error = EnvSettings::from_vars([("GARAGE_TIMEOUT_MS", "soon")]).unwrap_err();
        assert!(matches!(error, ConfigError::Source(_)));
    }
}
