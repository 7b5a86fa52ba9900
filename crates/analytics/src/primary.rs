//! Aggregate-query primary path.
//!
//! One round trip to the server-side aggregate operation, which returns
//! pre-joined analytics rows. The response shape is validated and every
//! derived metric is recomputed client-side so the primary and fallback
//! paths are formula-identical.

use chrono::NaiveDate;
use tracing::instrument;
use vesti_core::{DateRange, StockFilters, StockItem};

use crate::batch::execute_with_retry;
use crate::engine::EngineOptions;
use crate::error::AnalyticsError;
use crate::normalize::normalize_aggregate_rows;
use crate::source::{AggregateParams, StockDataSource};

/// Short JSON type label for data-shape diagnostics.
fn shape_of(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "boolean",
        serde_json::Value::Number(_) => "number",
        serde_json::Value::String(_) => "string",
        serde_json::Value::Array(_) => "array",
        serde_json::Value::Object(_) => "object",
    }
}

/// Fetch analytics rows through the server-side aggregate operation.
///
/// The remote call is retried per the engine's retry policy; the large page
/// size keeps this to a single round trip.
///
/// # Errors
///
/// Returns [`AnalyticsError::Source`] when the remote call fails after all
/// retries, or [`AnalyticsError::DataShape`] when the response is not an
/// array. Both trigger the fallback path in the orchestrator.
#[instrument(skip(source, filters, options))]
pub async fn fetch_aggregate_analytics<S: StockDataSource>(
    source: &S,
    range: &DateRange,
    filters: &StockFilters,
    today: NaiveDate,
    options: &EngineOptions,
) -> Result<Vec<StockItem>, AnalyticsError> {
    let params = AggregateParams::build(range, filters, today, options.aggregate_page_size);

    let response =
        execute_with_retry(|| source.fetch_analytics_aggregate(&params), options.retry).await?;

    let rows = response.as_array().ok_or_else(|| {
        AnalyticsError::DataShape(format!("expected array, got {}", shape_of(&response)))
    })?;

    let mut items = normalize_aggregate_rows(rows);
    let window_days = range.window_days();
    for item in &mut items {
        item.recompute_derived(window_days);
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_shape_labels() {
        assert_eq!(shape_of(&json!(null)), "null");
        assert_eq!(shape_of(&json!({})), "object");
        assert_eq!(shape_of(&json!([])), "array");
        assert_eq!(shape_of(&json!(1)), "number");
    }
}
