//! Caller-supplied filter set for analytics queries.

use serde::{Deserialize, Serialize};

/// Sentinel filter value meaning "no filter".
///
/// UI filter dropdowns send this literal when the user has not narrowed the
/// selection. It must be translated to `None` before reaching the data
/// source, never sent as a literal string filter.
pub const ALL_FILTER_SENTINEL: &str = "all";

/// Filter set for a stock-vs-sales analytics query.
///
/// Owned by the caller (typically UI-level filter state); the engine treats
/// it as read-only input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockFilters {
    /// Free-text search terms, in the order the user entered them.
    pub search_terms: Vec<String>,
    /// Item group filter (`None` or the sentinel means no filter).
    pub group: Option<String>,
    /// Company/brand filter (`None` or the sentinel means no filter).
    pub company: Option<String>,
    /// Only include items registered in this year or later.
    pub min_registration_year: Option<i32>,
    /// Include items whose physical stock is zero.
    pub include_zero_stock: bool,
    /// Only include items at or below their stock limit.
    pub low_stock_only: bool,
    /// Only include items registered within the new-product window.
    pub new_products_only: bool,
}

impl StockFilters {
    /// Effective group filter with the sentinel translated to `None`.
    #[must_use]
    pub fn group_filter(&self) -> Option<&str> {
        effective(self.group.as_deref())
    }

    /// Effective company filter with the sentinel translated to `None`.
    #[must_use]
    pub fn company_filter(&self) -> Option<&str> {
        effective(self.company.as_deref())
    }
}

/// Translate the "all" sentinel (and empty strings) to "no filter".
fn effective(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && !v.eq_ignore_ascii_case(ALL_FILTER_SENTINEL))
}
