//! Analytics configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `VESTI_DATA_API_URL` - Base URL of the hosted data API
//! - `VESTI_DATA_API_KEY` - API key for the hosted data API
//!
//! ## Optional
//! - `VESTI_ANALYTICS_PAGE_SIZE` - Aggregate call page size (default: 2000)
//! - `VESTI_ANALYTICS_BATCH_SIZE` - Fallback table read page size (default: 1000)
//! - `VESTI_ANALYTICS_MAX_ROWS` - Row safety ceiling per batched fetch (default: 50000)
//! - `VESTI_ANALYTICS_MAX_RETRIES` - Attempts for the aggregate call (default: 3)
//! - `VESTI_ANALYTICS_RETRY_DELAY_MS` - Base retry delay in milliseconds (default: 500)

use std::time::Duration;

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

use crate::batch::{BatchConfig, DEFAULT_RETRY_DELAY_MS, RetryPolicy};
use crate::engine::{DEFAULT_AGGREGATE_PAGE_SIZE, EngineOptions};

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Analytics engine configuration.
#[derive(Debug, Clone)]
pub struct AnalyticsConfig {
    /// Base URL of the hosted data API.
    pub data_api_url: Url,
    /// API key for the hosted data API (sent as `apikey` + bearer token).
    pub data_api_key: SecretString,
    /// Page size for the aggregate call.
    pub aggregate_page_size: u64,
    /// Paging settings for the fallback path's table reads.
    pub batch: BatchConfig,
    /// Retry policy for the aggregate call.
    pub retry: RetryPolicy,
}

impl AnalyticsConfig {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or any
    /// variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        let data_api_url = get_required_env("VESTI_DATA_API_URL")?
            .parse::<Url>()
            .map_err(|e| {
                ConfigError::InvalidEnvVar("VESTI_DATA_API_URL".to_string(), e.to_string())
            })?;
        let data_api_key = SecretString::from(get_required_env("VESTI_DATA_API_KEY")?);

        let aggregate_page_size =
            parse_or_default("VESTI_ANALYTICS_PAGE_SIZE", DEFAULT_AGGREGATE_PAGE_SIZE)?;

        let default_batch = BatchConfig::default();
        let batch = BatchConfig {
            batch_size: parse_or_default("VESTI_ANALYTICS_BATCH_SIZE", default_batch.batch_size)?,
            max_rows: parse_or_default("VESTI_ANALYTICS_MAX_ROWS", default_batch.max_rows)?,
        };

        let default_retry = RetryPolicy::default();
        let retry = RetryPolicy {
            max_attempts: parse_or_default(
                "VESTI_ANALYTICS_MAX_RETRIES",
                default_retry.max_attempts,
            )?,
            base_delay: Duration::from_millis(parse_or_default(
                "VESTI_ANALYTICS_RETRY_DELAY_MS",
                DEFAULT_RETRY_DELAY_MS,
            )?),
        };

        Ok(Self {
            data_api_url,
            data_api_key,
            aggregate_page_size,
            batch,
            retry,
        })
    }

    /// Engine options derived from this configuration.
    #[must_use]
    pub const fn engine_options(&self) -> EngineOptions {
        EngineOptions {
            batch: self.batch,
            retry: self.retry,
            aggregate_page_size: self.aggregate_page_size,
        }
    }
}

fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

fn parse_or_default<T: std::str::FromStr>(key: &str, default: T) -> Result<T, ConfigError>
where
    T::Err: std::fmt::Display,
{
    match std::env::var(key) {
        Ok(value) => value
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}
