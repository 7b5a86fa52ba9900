//! Analytics row types and derived-metric math.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

/// Lookback window for classifying an item as a new product, in days.
///
/// An item is "new" when its registration date falls within this window
/// ending at query time.
pub const NEW_PRODUCT_LOOKBACK_DAYS: i64 = 60;

/// One analytics row: current stock reconciled with sales over the query
/// window, plus the derived commercial metrics.
///
/// Value object created fresh per query; `item_code` is unique within one
/// result set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StockItem {
    /// Unique item code within one result set.
    pub item_code: String,
    /// Item description (display-only).
    pub description: String,
    /// Item group label (display-only).
    pub group_label: String,
    /// Company/brand label (display-only).
    pub company_label: String,
    /// Units physically in the warehouse.
    pub physical_stock: f64,
    /// Units available to sell (expected `<= physical_stock`, not enforced
    /// here - upstream invariant).
    pub available_stock: f64,
    /// Units reserved against open orders.
    pub reserved_stock: f64,
    /// Units on inbound purchase orders.
    pub incoming_stock: f64,
    /// Low-stock threshold configured for the item.
    pub stock_limit: f64,
    /// Units sold over the query window.
    pub quantity_sold: f64,
    /// Total sale value over the query window.
    pub total_value_sold: f64,
    /// `total_value_sold / quantity_sold`, 0 when nothing sold. Always
    /// recomputed client-side, never trusted from the data source.
    pub average_sale_price: f64,
    /// Weighted average unit cost over the window.
    pub average_cost: f64,
    /// How many times the physical stock sold through within the window.
    pub turnover_rate: f64,
    /// Share of physical stock sold within the window, as a percentage.
    pub percent_stock_sold: f64,
    /// Estimated days the current stock lasts at the observed sales rate.
    pub days_of_coverage: f64,
    /// Whether the item was registered within the new-product window.
    pub is_new_product: bool,
    /// Ordinal assigned by the data source, passed through unmodified.
    pub ranking_position: Option<i64>,
}

impl StockItem {
    /// Recompute all derived metrics from the raw stock and sales figures.
    ///
    /// Each metric is 0 when its denominator (stock or sales) is 0, so the
    /// output never contains NaN or infinity.
    // Quantities in wholesale never exceed f64's integer-safe range (2^53)
    #[allow(clippy::cast_precision_loss)]
    pub fn recompute_derived(&mut self, window_days: i64) {
        self.average_sale_price = if self.quantity_sold > 0.0 {
            self.total_value_sold / self.quantity_sold
        } else {
            0.0
        };

        if self.physical_stock > 0.0 {
            self.turnover_rate = self.quantity_sold / self.physical_stock;
            self.percent_stock_sold = self.quantity_sold / self.physical_stock * 100.0;
        } else {
            self.turnover_rate = 0.0;
            self.percent_stock_sold = 0.0;
        }

        self.days_of_coverage = if self.quantity_sold > 0.0 {
            self.physical_stock * window_days.max(1) as f64 / self.quantity_sold
        } else {
            0.0
        };
    }
}

/// Classify an item as a new product.
///
/// True iff `registered` is within [`NEW_PRODUCT_LOOKBACK_DAYS`] days of
/// `today` (inclusive at the cutoff).
#[must_use]
pub fn is_new_product(registered: Option<NaiveDate>, today: NaiveDate) -> bool {
    registered.is_some_and(|date| date >= today - Duration::days(NEW_PRODUCT_LOOKBACK_DAYS))
}

/// Per-item cost aggregate produced by the fallback path.
///
/// Built once per fallback invocation from the matching sale transactions,
/// discarded after the merge into [`StockItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CostData {
    /// Item code this aggregate belongs to.
    pub item_code: String,
    /// `Σ(unit_price × quantity) / Σ(quantity)` over the contributing rows.
    pub average_cost: f64,
    /// `Σ(quantity)` over the contributing rows. Always positive; items
    /// with zero cumulative quantity are never emitted.
    pub cumulative_quantity: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
    }

    #[test]
    fn test_derived_metrics_reference_scenario() {
        // 100 in stock, 20 sold for 600 over a 30-day window
        let mut item = StockItem {
            item_code: "ABC-1".to_string(),
            physical_stock: 100.0,
            quantity_sold: 20.0,
            total_value_sold: 600.0,
            ..Default::default()
        };
        item.recompute_derived(30);

        assert!((item.average_sale_price - 30.0).abs() < f64::EPSILON);
        assert!((item.percent_stock_sold - 20.0).abs() < f64::EPSILON);
        assert!((item.turnover_rate - 0.2).abs() < f64::EPSILON);
        // 100 units at 20/30 units per day = 150 days
        assert!((item.days_of_coverage - 150.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_sales_zero_metrics() {
        let mut item = StockItem {
            physical_stock: 50.0,
            quantity_sold: 0.0,
            total_value_sold: 0.0,
            ..Default::default()
        };
        item.recompute_derived(30);

        assert_eq!(item.average_sale_price, 0.0);
        assert_eq!(item.turnover_rate, 0.0);
        assert_eq!(item.percent_stock_sold, 0.0);
        assert_eq!(item.days_of_coverage, 0.0);
        assert!(item.average_sale_price.is_finite());
    }

    #[test]
    fn test_zero_stock_zero_stock_metrics() {
        let mut item = StockItem {
            physical_stock: 0.0,
            quantity_sold: 10.0,
            total_value_sold: 100.0,
            ..Default::default()
        };
        item.recompute_derived(30);

        assert!((item.average_sale_price - 10.0).abs() < f64::EPSILON);
        assert_eq!(item.turnover_rate, 0.0);
        assert_eq!(item.percent_stock_sold, 0.0);
        assert_eq!(item.days_of_coverage, 0.0);
    }

    #[test]
    fn test_is_new_product_boundary() {
        let today = date(2026, 8, 25);
        let cutoff = today - Duration::days(NEW_PRODUCT_LOOKBACK_DAYS);

        assert!(is_new_product(Some(today), today));
        assert!(is_new_product(Some(cutoff), today));
        assert!(!is_new_product(Some(cutoff - Duration::days(1)), today));
        assert!(!is_new_product(None, today));
    }
}
