//! Weighted average cost aggregation over raw sale transactions.

use std::collections::HashMap;

use vesti_core::CostData;

use crate::source::{SALE_TRANSACTION_TYPE, SalesRow};

/// Reduce raw sale transactions into per-item cost aggregates.
///
/// Groups rows of type [`SALE_TRANSACTION_TYPE`] by item code and computes
/// `average_cost = Σ(unit_price × quantity) / Σ(quantity)`. Rows with a
/// missing item code are skipped without error; items with zero cumulative
/// quantity are not emitted, so the output never contains NaN.
///
/// Output order is map iteration order; consumers must join by key, not by
/// position.
#[must_use]
pub fn aggregate_costs(rows: &[SalesRow]) -> HashMap<String, CostData> {
    let mut sums: HashMap<String, (f64, f64)> = HashMap::new();

    for row in rows {
        if row.transaction_type != SALE_TRANSACTION_TYPE {
            continue;
        }
        let Some(item_code) = row.item_code.as_deref() else {
            continue;
        };

        let entry = sums.entry(item_code.to_string()).or_insert((0.0, 0.0));
        entry.0 += row.unit_price * row.quantity;
        entry.1 += row.quantity;
    }

    sums.into_iter()
        .filter(|(_, (_, quantity))| *quantity > 0.0)
        .map(|(item_code, (value, quantity))| {
            (
                item_code.clone(),
                CostData {
                    item_code,
                    average_cost: value / quantity,
                    cumulative_quantity: quantity,
                },
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sale(item_code: Option<&str>, unit_price: f64, quantity: f64) -> SalesRow {
        SalesRow {
            item_code: item_code.map(str::to_string),
            unit_price,
            quantity,
            transaction_type: SALE_TRANSACTION_TYPE.to_string(),
        }
    }

    #[test]
    fn test_weighted_average_cost() {
        let rows = vec![
            sale(Some("ABC-1"), 10.0, 2.0),
            sale(Some("ABC-1"), 20.0, 6.0),
            sale(Some("XYZ-9"), 5.0, 4.0),
        ];

        let costs = aggregate_costs(&rows);

        let abc = &costs["ABC-1"];
        assert!((abc.average_cost - 17.5).abs() < 1e-9);
        assert!((abc.cumulative_quantity - 8.0).abs() < f64::EPSILON);

        let xyz = &costs["XYZ-9"];
        assert!((xyz.average_cost - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_total_value_preserved_per_item() {
        // Σ average_cost × cumulative_quantity == Σ unit_price × quantity
        let rows = vec![
            sale(Some("A"), 3.3, 7.0),
            sale(Some("A"), 9.1, 2.5),
            sale(Some("B"), 12.0, 1.0),
            sale(Some("A"), 0.5, 11.0),
        ];

        let costs = aggregate_costs(&rows);

        for (code, cost) in &costs {
            let expected: f64 = rows
                .iter()
                .filter(|r| r.item_code.as_deref() == Some(code))
                .map(|r| r.unit_price * r.quantity)
                .sum();
            let actual = cost.average_cost * cost.cumulative_quantity;
            assert!((actual - expected).abs() < 1e-9, "mismatch for {code}");
        }
    }

    #[test]
    fn test_rows_without_item_code_skipped() {
        let rows = vec![sale(None, 10.0, 5.0), sale(Some("A"), 2.0, 1.0)];
        let costs = aggregate_costs(&rows);
        assert_eq!(costs.len(), 1);
        assert!(costs.contains_key("A"));
    }

    #[test]
    fn test_zero_cumulative_quantity_not_emitted() {
        let rows = vec![sale(Some("A"), 10.0, 0.0)];
        let costs = aggregate_costs(&rows);
        assert!(costs.is_empty());
    }

    #[test]
    fn test_non_sale_transactions_ignored() {
        let mut purchase = sale(Some("A"), 10.0, 5.0);
        purchase.transaction_type = "C".to_string();
        let costs = aggregate_costs(&[purchase]);
        assert!(costs.is_empty());
    }
}
