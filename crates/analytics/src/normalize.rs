//! Field normalization for loosely-typed aggregate rows.
//!
//! The hosted aggregate operation returns column names in either lower or
//! upper case depending on how the procedure was (re)deployed. All defensive
//! dual-casing access lives here, applied immediately after a response is
//! received, so the business logic never sees the inconsistency.

use serde_json::{Map, Value};
use tracing::warn;
use vesti_core::StockItem;

/// Read a field by its lower-case name, falling back to the upper-case
/// variant.
fn field<'a>(row: &'a Map<String, Value>, name: &str) -> Option<&'a Value> {
    row.get(name)
        .or_else(|| row.get(name.to_ascii_uppercase().as_str()))
}

/// String coercion: missing or non-string values become an empty string.
fn string_field(row: &Map<String, Value>, name: &str) -> String {
    field(row, name)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

/// Numeric coercion matching `Number(x) || 0`: numbers pass through,
/// numeric strings parse, booleans map to 0/1, everything else (and any
/// non-finite result) becomes 0.
fn number_field(row: &Map<String, Value>, name: &str) -> f64 {
    let coerced = match field(row, name) {
        Some(Value::Number(n)) => n.as_f64().unwrap_or(0.0),
        Some(Value::String(s)) => s.trim().parse::<f64>().unwrap_or(0.0),
        Some(Value::Bool(b)) => f64::from(u8::from(*b)),
        _ => 0.0,
    };
    if coerced.is_finite() { coerced } else { 0.0 }
}

/// Truthiness coercion matching `!!x`.
fn truthy_field(row: &Map<String, Value>, name: &str) -> bool {
    match field(row, name) {
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|v| v != 0.0),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_) | Value::Object(_)) => true,
        Some(Value::Null) | None => false,
    }
}

/// Ordinal pass-through: no default, absent stays absent.
fn ordinal_field(row: &Map<String, Value>, name: &str) -> Option<i64> {
    match field(row, name)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Normalize one aggregate row into a [`StockItem`].
///
/// Returns `None` for rows that are not JSON objects. Derived metrics are
/// left untouched here; the primary path recomputes them unconditionally
/// after normalization.
#[must_use]
pub fn normalize_aggregate_row(row: &Value) -> Option<StockItem> {
    let Some(obj) = row.as_object() else {
        warn!(row = %row, "skipping non-object aggregate row");
        return None;
    };

    Some(StockItem {
        item_code: string_field(obj, "item_code"),
        description: string_field(obj, "description"),
        group_label: string_field(obj, "group_label"),
        company_label: string_field(obj, "company_label"),
        physical_stock: number_field(obj, "physical_stock"),
        available_stock: number_field(obj, "available_stock"),
        reserved_stock: number_field(obj, "reserved_stock"),
        incoming_stock: number_field(obj, "incoming_stock"),
        stock_limit: number_field(obj, "stock_limit"),
        quantity_sold: number_field(obj, "quantity_sold"),
        total_value_sold: number_field(obj, "total_value_sold"),
        average_sale_price: 0.0,
        average_cost: number_field(obj, "average_cost"),
        turnover_rate: 0.0,
        percent_stock_sold: 0.0,
        days_of_coverage: 0.0,
        is_new_product: truthy_field(obj, "is_new_product"),
        ranking_position: ordinal_field(obj, "ranking_position"),
    })
}

/// Normalize a batch of aggregate rows, skipping malformed entries.
#[must_use]
pub fn normalize_aggregate_rows(rows: &[Value]) -> Vec<StockItem> {
    rows.iter().filter_map(normalize_aggregate_row).collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_lower_case_fields() {
        let row = json!({
            "item_code": "ABC-1",
            "physical_stock": 100,
            "quantity_sold": 20,
            "total_value_sold": 600.0,
        });

        let item = normalize_aggregate_row(&row).expect("object row");
        assert_eq!(item.item_code, "ABC-1");
        assert!((item.physical_stock - 100.0).abs() < f64::EPSILON);
        assert!((item.quantity_sold - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_upper_case_fields() {
        let row = json!({
            "ITEM_CODE": "ABC-1",
            "PHYSICAL_STOCK": "75.5",
            "QUANTITY_SOLD": 3,
            "IS_NEW_PRODUCT": 1,
            "RANKING_POSITION": 7,
        });

        let item = normalize_aggregate_row(&row).expect("object row");
        assert_eq!(item.item_code, "ABC-1");
        assert!((item.physical_stock - 75.5).abs() < f64::EPSILON);
        assert!(item.is_new_product);
        assert_eq!(item.ranking_position, Some(7));
    }

    #[test]
    fn test_numeric_coercion_defaults_to_zero() {
        let row = json!({
            "item_code": "A",
            "physical_stock": "not a number",
            "quantity_sold": null,
        });

        let item = normalize_aggregate_row(&row).expect("object row");
        assert_eq!(item.physical_stock, 0.0);
        assert_eq!(item.quantity_sold, 0.0);
        assert_eq!(item.total_value_sold, 0.0);
    }

    #[test]
    fn test_truthiness_coercion() {
        let truthy = json!({ "is_new_product": "yes" });
        let falsy = json!({ "is_new_product": 0 });
        let missing = json!({});

        assert!(normalize_aggregate_row(&truthy).expect("row").is_new_product);
        assert!(!normalize_aggregate_row(&falsy).expect("row").is_new_product);
        assert!(!normalize_aggregate_row(&missing).expect("row").is_new_product);
    }

    #[test]
    fn test_ranking_passes_through_without_default() {
        let with = json!({ "ranking_position": 12 });
        let without = json!({ "item_code": "A" });

        assert_eq!(
            normalize_aggregate_row(&with).expect("row").ranking_position,
            Some(12)
        );
        assert_eq!(
            normalize_aggregate_row(&without)
                .expect("row")
                .ranking_position,
            None
        );
    }

    #[test]
    fn test_non_object_rows_skipped() {
        let rows = vec![json!("not an object"), json!({ "item_code": "A" }), json!(null)];
        let items = normalize_aggregate_rows(&rows);
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].item_code, "A");
    }
}
