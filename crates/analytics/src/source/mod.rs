//! Abstract tabular data source consumed by the analytics engine.
//!
//! The engine talks to the hosted database through this trait only; the
//! production implementation is [`rest::RestDataSource`], and tests supply
//! in-memory mocks.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use vesti_core::{DateRange, NEW_PRODUCT_LOOKBACK_DAYS, StockFilters};

use crate::error::SourceError;

pub mod rest;

/// Transaction type marker for sales in the transaction ledger.
pub const SALE_TRANSACTION_TYPE: &str = "S";

// =============================================================================
// Raw Row Types
// =============================================================================

/// One current-stock row from the stock table.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockRow {
    /// Unique item code.
    pub item_code: String,
    /// Item description.
    #[serde(default)]
    pub description: String,
    /// Item group label.
    #[serde(default)]
    pub group_label: String,
    /// Company/brand label.
    #[serde(default)]
    pub company_label: String,
    /// Units physically in the warehouse.
    #[serde(default)]
    pub physical_stock: f64,
    /// Units available to sell.
    #[serde(default)]
    pub available_stock: f64,
    /// Units reserved against open orders.
    #[serde(default)]
    pub reserved_stock: f64,
    /// Units on inbound purchase orders.
    #[serde(default)]
    pub incoming_stock: f64,
    /// Low-stock threshold for the item.
    #[serde(default)]
    pub stock_limit: f64,
    /// Date the item was registered in the catalog.
    #[serde(default)]
    pub registered_at: Option<NaiveDate>,
    /// Ordinal assigned by the data source, if any.
    #[serde(default)]
    pub ranking_position: Option<i64>,
}

/// One row from the sales-transaction ledger.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SalesRow {
    /// Item code, absent on malformed ledger rows.
    #[serde(default)]
    pub item_code: Option<String>,
    /// Unit price of the transaction.
    #[serde(default)]
    pub unit_price: f64,
    /// Quantity transacted.
    #[serde(default)]
    pub quantity: f64,
    /// Transaction type marker; [`SALE_TRANSACTION_TYPE`] marks a sale.
    #[serde(default)]
    pub transaction_type: String,
}

// =============================================================================
// Aggregate Parameters
// =============================================================================

/// Parameter set for the server-side aggregate operation.
///
/// Field names follow the remote procedure's `p_` parameter convention.
/// Sentinel filter values are already translated to `None` by
/// [`AggregateParams::build`]; the literal `"all"` never reaches the wire.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AggregateParams {
    /// First day of the query window (inclusive).
    #[serde(rename = "p_start_date")]
    pub start_date: NaiveDate,
    /// Last day of the query window (inclusive).
    #[serde(rename = "p_end_date")]
    pub end_date: NaiveDate,
    /// Registration cutoff for new-product classification.
    #[serde(rename = "p_new_product_cutoff")]
    pub new_product_cutoff: NaiveDate,
    /// Pagination offset.
    #[serde(rename = "p_offset")]
    pub offset: u64,
    /// Pagination limit; large by default to keep round trips to one.
    #[serde(rename = "p_limit")]
    pub limit: u64,
    /// Free-text search terms, in caller order.
    #[serde(rename = "p_search_terms")]
    pub search_terms: Vec<String>,
    /// Group filter, `None` for no filter.
    #[serde(rename = "p_group")]
    pub group: Option<String>,
    /// Company filter, `None` for no filter.
    #[serde(rename = "p_company")]
    pub company: Option<String>,
    /// Only items registered in this year or later.
    #[serde(rename = "p_min_registration_year")]
    pub min_registration_year: Option<i32>,
    /// Include items with zero physical stock.
    #[serde(rename = "p_include_zero_stock")]
    pub include_zero_stock: bool,
    /// Only items at or below their stock limit.
    #[serde(rename = "p_low_stock_only")]
    pub low_stock_only: bool,
    /// Only items within the new-product window.
    #[serde(rename = "p_new_products_only")]
    pub new_products_only: bool,
}

impl AggregateParams {
    /// Build the parameter set for one aggregate call.
    ///
    /// Translates sentinel filter values to `None` and computes the
    /// new-product cutoff as `today - 60 days`.
    #[must_use]
    pub fn build(
        range: &DateRange,
        filters: &StockFilters,
        today: NaiveDate,
        page_size: u64,
    ) -> Self {
        Self {
            start_date: range.start,
            end_date: range.end,
            new_product_cutoff: today - chrono::Duration::days(NEW_PRODUCT_LOOKBACK_DAYS),
            offset: 0,
            limit: page_size,
            search_terms: filters.search_terms.clone(),
            group: filters.group_filter().map(str::to_string),
            company: filters.company_filter().map(str::to_string),
            min_registration_year: filters.min_registration_year,
            include_zero_stock: filters.include_zero_stock,
            low_stock_only: filters.low_stock_only,
            new_products_only: filters.new_products_only,
        }
    }
}

// =============================================================================
// Source Trait
// =============================================================================

/// Tabular query capability backing the analytics engine.
///
/// Supports offset+limit paged reads of the raw stock and sales tables plus
/// one named aggregate remote operation returning loosely-typed rows.
#[allow(async_fn_in_trait)]
pub trait StockDataSource {
    /// Fetch one page of current-stock rows matching `filters`.
    ///
    /// Implementations apply the group, company, registration-year, and
    /// zero-stock filters; the remaining filters are applied client-side
    /// after the join.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network, status, or decode failure.
    async fn fetch_stock_page(
        &self,
        filters: &StockFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<StockRow>, SourceError>;

    /// Fetch one page of sale transactions within `range`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network, status, or decode failure.
    async fn fetch_sales_page(
        &self,
        range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SalesRow>, SourceError>;

    /// Invoke the server-side stock-sales aggregate operation.
    ///
    /// Returns the raw JSON payload; shape validation (the payload must be
    /// an array) belongs to the caller, not the source.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on network, status, or decode failure.
    async fn fetch_analytics_aggregate(
        &self,
        params: &AggregateParams,
    ) -> Result<serde_json::Value, SourceError>;
}

impl<S: StockDataSource> StockDataSource for &S {
    async fn fetch_stock_page(
        &self,
        filters: &StockFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<StockRow>, SourceError> {
        <S as StockDataSource>::fetch_stock_page(self, filters, offset, limit).await
    }

    async fn fetch_sales_page(
        &self,
        range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SalesRow>, SourceError> {
        <S as StockDataSource>::fetch_sales_page(self, range, offset, limit).await
    }

    async fn fetch_analytics_aggregate(
        &self,
        params: &AggregateParams,
    ) -> Result<serde_json::Value, SourceError> {
        <S as StockDataSource>::fetch_analytics_aggregate(self, params).await
    }
}
