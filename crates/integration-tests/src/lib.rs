//! Integration test support for the Vesti analytics engine.
//!
//! Provides an in-memory [`MockDataSource`] implementing
//! [`vesti_analytics::StockDataSource`] so the cross-path scenarios can run
//! without a hosted data API.

use std::sync::Mutex;

use chrono::NaiveDate;
use vesti_analytics::error::SourceError;
use vesti_analytics::source::{AggregateParams, SalesRow, StockDataSource, StockRow};
use vesti_core::{DateRange, StockFilters};

/// Initialize test logging once per process. Safe to call from every test.
pub fn init_test_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory data source serving canned rows page by page.
///
/// Failure toggles let scenarios exercise the fallback transition and the
/// degraded empty-result state; captured aggregate parameters let them
/// assert on what reached the wire.
#[derive(Debug, Default)]
pub struct MockDataSource {
    /// Stock rows served in offset/limit slices.
    pub stock: Vec<StockRow>,
    /// Sales rows served in offset/limit slices.
    pub sales: Vec<SalesRow>,
    /// Aggregate payload; `None` makes the aggregate call fail.
    pub aggregate: Option<serde_json::Value>,
    /// Fail every stock table read.
    pub fail_stock: bool,
    /// Fail every sales table read.
    pub fail_sales: bool,
    /// Every parameter set the aggregate operation was called with.
    pub captured_params: Mutex<Vec<AggregateParams>>,
}

impl MockDataSource {
    /// Source whose aggregate call fails, forcing the fallback path.
    #[must_use]
    pub fn without_aggregate(stock: Vec<StockRow>, sales: Vec<SalesRow>) -> Self {
        Self {
            stock,
            sales,
            aggregate: None,
            ..Self::default()
        }
    }

    /// Source answering the aggregate call with `payload`.
    #[must_use]
    pub fn with_aggregate(payload: serde_json::Value) -> Self {
        Self {
            aggregate: Some(payload),
            ..Self::default()
        }
    }
}

fn page<T: Clone>(rows: &[T], offset: u64, limit: u64) -> Vec<T> {
    rows.iter()
        .skip(usize::try_from(offset).unwrap_or(usize::MAX))
        .take(usize::try_from(limit).unwrap_or(usize::MAX))
        .cloned()
        .collect()
}

fn unavailable(what: &str) -> SourceError {
    SourceError::Status {
        status: 503,
        body: format!("{what} unavailable"),
    }
}

impl StockDataSource for MockDataSource {
    async fn fetch_stock_page(
        &self,
        _filters: &StockFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<StockRow>, SourceError> {
        if self.fail_stock {
            return Err(unavailable("stock table"));
        }
        Ok(page(&self.stock, offset, limit))
    }

    async fn fetch_sales_page(
        &self,
        _range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SalesRow>, SourceError> {
        if self.fail_sales {
            return Err(unavailable("sales table"));
        }
        Ok(page(&self.sales, offset, limit))
    }

    async fn fetch_analytics_aggregate(
        &self,
        params: &AggregateParams,
    ) -> Result<serde_json::Value, SourceError> {
        self.captured_params
            .lock()
            .expect("params mutex poisoned")
            .push(params.clone());

        self.aggregate
            .clone()
            .ok_or_else(|| unavailable("aggregate procedure"))
    }
}

/// Convenience stock row builder for scenarios.
#[must_use]
pub fn stock_row(item_code: &str, physical_stock: f64, registered_at: Option<NaiveDate>) -> StockRow {
    StockRow {
        item_code: item_code.to_string(),
        description: format!("Item {item_code}"),
        physical_stock,
        available_stock: physical_stock,
        registered_at,
        ..StockRow::default()
    }
}

/// Convenience sale row builder for scenarios.
#[must_use]
pub fn sale_row(item_code: &str, unit_price: f64, quantity: f64) -> SalesRow {
    SalesRow {
        item_code: Some(item_code.to_string()),
        unit_price,
        quantity,
        transaction_type: vesti_analytics::source::SALE_TRANSACTION_TYPE.to_string(),
    }
}
