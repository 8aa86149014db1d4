//! Store configuration.

use std::{env, time::Duration};

/// Connection settings for the store API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Store API base URL, e.g. `"http://localhost:5000"`.
    pub api_base: String,

    /// Bound on every store API request. Expiry surfaces as a failed
    /// transition, never as a hang.
    pub request_timeout: Duration,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_base: "http://localhost:5000".to_owned(),
            request_timeout: Duration::from_secs(10),
        }
    }
}

impl StoreConfig {
    /// Build a configuration from the environment, falling back to
    /// defaults for anything unset or unparseable.
    ///
    /// Recognised variables: `STORE_API_BASE` and `STORE_TIMEOUT_SECS`.
    #[must_use]
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let api_base = env::var("STORE_API_BASE").unwrap_or(defaults.api_base);

        let request_timeout = env::var("STORE_TIMEOUT_SECS")
            .ok()
            .and_then(|raw| raw.parse().ok())
            .map_or(defaults.request_timeout, Duration::from_secs);

        Self {
            api_base,
            request_timeout,
        }
    }

    /// Replace the API base URL.
    #[must_use]
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Replace the request timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, request_timeout: Duration) -> Self {
        self.request_timeout = request_timeout;
        self
    }
}
