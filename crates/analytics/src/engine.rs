//! Analytics orchestrator.
//!
//! Chooses the aggregate-query primary path, and on any failure runs the
//! direct-query fallback path for that one logical request. The caller
//! always receives a well-formed array; total failure degrades to an empty
//! result set instead of an error.

use chrono::{NaiveDate, Utc};
use tracing::{error, instrument, warn};
use vesti_core::{DateRange, StockFilters, StockItem};

use crate::batch::{BatchConfig, RetryPolicy};
use crate::error::AnalyticsError;
use crate::source::StockDataSource;
use crate::{fallback, primary};

/// Default page size for the aggregate call, chosen large enough to keep a
/// query to one round trip.
pub const DEFAULT_AGGREGATE_PAGE_SIZE: u64 = 2000;

/// Tunables for one engine instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Paging and row-cap settings for the fallback path's table reads.
    pub batch: BatchConfig,
    /// Retry policy for the primary path's aggregate call.
    pub retry: RetryPolicy,
    /// Page size for the aggregate call.
    pub aggregate_page_size: u64,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            batch: BatchConfig::default(),
            retry: RetryPolicy::default(),
            aggregate_page_size: DEFAULT_AGGREGATE_PAGE_SIZE,
        }
    }
}

/// Stock-vs-sales analytics engine.
///
/// Stateless between requests: every query starts on the primary path, and
/// concurrent queries share no mutable state.
#[derive(Debug, Clone)]
pub struct AnalyticsEngine<S> {
    source: S,
    options: EngineOptions,
}

impl<S: StockDataSource> AnalyticsEngine<S> {
    /// Create an engine over `source` with default options.
    #[must_use]
    pub fn new(source: S) -> Self {
        Self::with_options(source, EngineOptions::default())
    }

    /// Create an engine with explicit options.
    #[must_use]
    pub const fn with_options(source: S, options: EngineOptions) -> Self {
        Self { source, options }
    }

    /// Produce analytics rows for the given window and filter set.
    ///
    /// Resolves with an array under all data and backend conditions; "no
    /// data" and total backend failure both yield an empty vector.
    ///
    /// # Errors
    ///
    /// Rejects only for a malformed date range, detected before any I/O.
    #[instrument(skip(self, filters))]
    pub async fn fetch_stock_sales_analytics(
        &self,
        range: &DateRange,
        filters: &StockFilters,
    ) -> Result<Vec<StockItem>, AnalyticsError> {
        range.validate()?;
        let today = Utc::now().date_naive();

        let items = match primary::fetch_aggregate_analytics(
            &self.source,
            range,
            filters,
            today,
            &self.options,
        )
        .await
        {
            Ok(items) => items,
            Err(err) => {
                warn!(
                    error = %err,
                    data_validation = err.is_data_shape(),
                    "aggregate path failed, using fallback path"
                );
                self.run_fallback(range, filters, today).await
            }
        };

        Ok(items)
    }

    async fn run_fallback(
        &self,
        range: &DateRange,
        filters: &StockFilters,
        today: NaiveDate,
    ) -> Vec<StockItem> {
        match fallback::fetch_direct_analytics(&self.source, range, filters, today, &self.options)
            .await
        {
            Ok(items) => items,
            Err(err) => {
                // Degraded state: losing analytics must never crash the caller
                error!(error = %err, "fallback path failed, returning empty analytics");
                Vec::new()
            }
        }
    }
}
