//! Direct-query fallback path.
//!
//! Reconstructs the analytics shape without the server-side aggregate:
//! batch-fetches the raw stock and sales tables, aggregates costs, and
//! joins everything in memory using the same derived-metric formulas as
//! the primary path.

use std::collections::HashMap;

use chrono::NaiveDate;
use tracing::instrument;
use vesti_core::{DateRange, StockFilters, StockItem, is_new_product};

use crate::batch::fetch_in_batches;
use crate::cost::aggregate_costs;
use crate::engine::EngineOptions;
use crate::error::AnalyticsError;
use crate::source::{SALE_TRANSACTION_TYPE, SalesRow, StockDataSource, StockRow};

/// Fetch analytics rows by joining the raw stock and sales tables.
///
/// Items present in stock but absent from sales get zero sales figures and
/// zero sales-derived metrics. Residual filters the raw table reads cannot
/// express (search terms, low-stock-only, new-products-only) are applied
/// after the join.
///
/// # Errors
///
/// Propagates the first [`AnalyticsError::Source`] from either table fetch
/// immediately; no partial join of mismatched stock/sales subsets is ever
/// returned.
#[instrument(skip(source, filters, options))]
pub async fn fetch_direct_analytics<S: StockDataSource>(
    source: &S,
    range: &DateRange,
    filters: &StockFilters,
    today: NaiveDate,
    options: &EngineOptions,
) -> Result<Vec<StockItem>, AnalyticsError> {
    let stock: Vec<StockRow> = fetch_in_batches(
        |offset, limit| source.fetch_stock_page(filters, offset, limit),
        options.batch,
    )
    .await?;

    let sales: Vec<SalesRow> = fetch_in_batches(
        |offset, limit| source.fetch_sales_page(range, offset, limit),
        options.batch,
    )
    .await?;

    let sold = sold_totals(&sales);
    let costs = aggregate_costs(&sales);
    let window_days = range.window_days();

    let mut items: Vec<StockItem> = stock
        .into_iter()
        .map(|row| {
            let (quantity_sold, total_value_sold) =
                sold.get(&row.item_code).copied().unwrap_or((0.0, 0.0));
            let average_cost = costs
                .get(&row.item_code)
                .map_or(0.0, |cost| cost.average_cost);

            let mut item = StockItem {
                is_new_product: is_new_product(row.registered_at, today),
                item_code: row.item_code,
                description: row.description,
                group_label: row.group_label,
                company_label: row.company_label,
                physical_stock: row.physical_stock,
                available_stock: row.available_stock,
                reserved_stock: row.reserved_stock,
                incoming_stock: row.incoming_stock,
                stock_limit: row.stock_limit,
                quantity_sold,
                total_value_sold,
                average_cost,
                ranking_position: row.ranking_position,
                ..Default::default()
            };
            item.recompute_derived(window_days);
            item
        })
        .collect();

    apply_residual_filters(&mut items, filters);

    Ok(items)
}

/// Per-item sold quantity and value, from sale-type transactions only.
fn sold_totals(sales: &[SalesRow]) -> HashMap<String, (f64, f64)> {
    let mut totals: HashMap<String, (f64, f64)> = HashMap::new();
    for row in sales {
        if row.transaction_type != SALE_TRANSACTION_TYPE {
            continue;
        }
        let Some(item_code) = row.item_code.as_deref() else {
            continue;
        };
        let entry = totals.entry(item_code.to_string()).or_insert((0.0, 0.0));
        entry.0 += row.quantity;
        entry.1 += row.unit_price * row.quantity;
    }
    totals
}

/// Filters the raw table reads cannot express remotely.
fn apply_residual_filters(items: &mut Vec<StockItem>, filters: &StockFilters) {
    if filters.low_stock_only {
        items.retain(|item| item.stock_limit > 0.0 && item.physical_stock <= item.stock_limit);
    }
    if filters.new_products_only {
        items.retain(|item| item.is_new_product);
    }
    if !filters.search_terms.is_empty() {
        items.retain(|item| {
            filters.search_terms.iter().all(|term| {
                let term = term.to_lowercase();
                item.item_code.to_lowercase().contains(&term)
                    || item.description.to_lowercase().contains(&term)
            })
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(code: &str, description: &str) -> StockItem {
        StockItem {
            item_code: code.to_string(),
            description: description.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_sold_totals_groups_sales_only() {
        let sales = vec![
            SalesRow {
                item_code: Some("A".to_string()),
                unit_price: 30.0,
                quantity: 10.0,
                transaction_type: SALE_TRANSACTION_TYPE.to_string(),
            },
            SalesRow {
                item_code: Some("A".to_string()),
                unit_price: 30.0,
                quantity: 10.0,
                transaction_type: "C".to_string(),
            },
            SalesRow {
                item_code: None,
                unit_price: 5.0,
                quantity: 1.0,
                transaction_type: SALE_TRANSACTION_TYPE.to_string(),
            },
        ];

        let totals = sold_totals(&sales);
        assert_eq!(totals.len(), 1);
        let (quantity, value) = totals["A"];
        assert!((quantity - 10.0).abs() < f64::EPSILON);
        assert!((value - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_search_terms_match_code_or_description() {
        let mut items = vec![
            item("CAM-01", "Camisa social azul"),
            item("CAL-02", "Calça jeans"),
        ];
        let filters = StockFilters {
            search_terms: vec!["camisa".to_string(), "azul".to_string()],
            ..Default::default()
        };

        apply_residual_filters(&mut items, &filters);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "CAM-01");
    }

    #[test]
    fn test_low_stock_filter_requires_limit() {
        let mut low = item("A", "");
        low.physical_stock = 3.0;
        low.stock_limit = 5.0;

        let mut no_limit = item("B", "");
        no_limit.physical_stock = 0.0;
        no_limit.stock_limit = 0.0;

        let mut items = vec![low, no_limit];
        let filters = StockFilters {
            low_stock_only: true,
            ..Default::default()
        };

        apply_residual_filters(&mut items, &filters);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "A");
    }
}
