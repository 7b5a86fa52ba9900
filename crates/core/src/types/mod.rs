//! Core types for Vesti analytics.
//!
//! This module provides the value objects exchanged between the analytics
//! engine and its callers.

pub mod date_range;
pub mod filters;
pub mod stock;

pub use date_range::{DateRange, DateRangeError};
pub use filters::{ALL_FILTER_SENTINEL, StockFilters};
pub use stock::{CostData, NEW_PRODUCT_LOOKBACK_DAYS, StockItem, is_new_product};
