//! Error types for the analytics engine.

use thiserror::Error;
use vesti_core::DateRangeError;

/// Error from the external tabular data source.
#[derive(Debug, Error)]
pub enum SourceError {
    /// Network-level failure (connect, timeout, TLS).
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The data API answered with a non-success status.
    #[error("data API returned status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, for diagnostics.
        body: String,
    },

    /// The response body could not be decoded into the expected rows.
    #[error("failed to decode response: {0}")]
    Decode(String),
}

/// Error from the analytics pipeline.
///
/// Under normal operation none of these reach the caller: source and
/// data-shape failures trigger the fallback path, and a total failure
/// resolves to an empty result set. Only [`AnalyticsError::InvalidDateRange`]
/// is surfaced, and it is raised before any I/O.
#[derive(Debug, Error)]
pub enum AnalyticsError {
    /// The data source failed (network, status, or decode).
    #[error("data source error: {0}")]
    Source(#[from] SourceError),

    /// The aggregate operation returned something other than an array.
    #[error("aggregate returned unexpected shape: {0}")]
    DataShape(String),

    /// The caller supplied a malformed date range (programmer error).
    #[error("invalid date range: {0}")]
    InvalidDateRange(#[from] DateRangeError),
}

impl AnalyticsError {
    /// Whether this is a data-validation failure rather than a transport
    /// failure. Used to pick the right log taxonomy when falling back.
    #[must_use]
    pub const fn is_data_shape(&self) -> bool {
        matches!(self, Self::DataShape(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = AnalyticsError::DataShape("expected array, got null".to_string());
        assert_eq!(
            err.to_string(),
            "aggregate returned unexpected shape: expected array, got null"
        );
        assert!(err.is_data_shape());

        let err = AnalyticsError::Source(SourceError::Status {
            status: 503,
            body: "upstream unavailable".to_string(),
        });
        assert!(!err.is_data_shape());
    }
}
