// Client configuration
//
// The API credential and endpoint are both required: a process that cannot
// reach the engine has nothing to serve, so absence aborts startup instead of
// surfacing on the first request.

use anyhow::{Context, Result};

/// Configuration for the engine HTTP client
#[derive(Debug, Clone)]
pub struct TemporalConfig {
    /// Bearer credential for the engine API
    pub api_key: String,
    /// Base URL of the engine HTTP API, without trailing slash
    pub endpoint: String,
    /// Per-page timeout for upstream requests, in seconds
    pub fetch_timeout_secs: Option<u64>,
}

impl TemporalConfig {
    /// Create configuration from environment variables
    ///
    /// TEMPORAL_API_KEY and TEMPORAL_ENDPOINT are required; FETCH_TIMEOUT_SECS
    /// is optional.
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("TEMPORAL_API_KEY")
            .context("TEMPORAL_API_KEY environment variable not set")?;
        if api_key.trim().is_empty() {
            anyhow::bail!("TEMPORAL_API_KEY must not be empty");
        }

        let endpoint = std::env::var("TEMPORAL_ENDPOINT")
            .context("TEMPORAL_ENDPOINT environment variable not set")?;
        if endpoint.trim().is_empty() {
            anyhow::bail!("TEMPORAL_ENDPOINT must not be empty");
        }

        let fetch_timeout_secs = std::env::var("FETCH_TIMEOUT_SECS")
            .ok()
            .map(|value| {
                value
                    .parse()
                    .context("FETCH_TIMEOUT_SECS must be an integer number of seconds")
            })
            .transpose()?;

        Ok(Self::new(api_key, endpoint, fetch_timeout_secs))
    }

    /// Create configuration directly
    pub fn new(
        api_key: impl Into<String>,
        endpoint: impl Into<String>,
        fetch_timeout_secs: Option<u64>,
    ) -> Self {
        Self {
            api_key: api_key.into(),
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            fetch_timeout_secs,
        }
    }

    /// Get per-page timeout with default
    pub fn fetch_timeout_secs(&self) -> u64 {
        self.fetch_timeout_secs.unwrap_or(30)
    }
}
