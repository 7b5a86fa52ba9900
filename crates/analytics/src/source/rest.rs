//! REST implementation of [`StockDataSource`] for the hosted data API.
//!
//! Talks PostgREST conventions: table reads under `rest/v1/<table>` with
//! `eq./gte./gt.` query operators and offset+limit pagination, and the
//! aggregate operation as a remote procedure under `rest/v1/rpc/`.

use secrecy::{ExposeSecret, SecretString};
use serde::de::DeserializeOwned;
use tracing::instrument;
use vesti_core::{DateRange, StockFilters};

use super::{AggregateParams, SalesRow, StockDataSource, StockRow};
use crate::config::AnalyticsConfig;
use crate::error::SourceError;
use crate::source::SALE_TRANSACTION_TYPE;

/// Current-stock table name.
const STOCK_TABLE: &str = "stock_items";
/// Sales-transaction ledger table name.
const SALES_TABLE: &str = "sales_transactions";
/// Server-side aggregate procedure name.
const ANALYTICS_RPC: &str = "stock_sales_analytics";

/// HTTP client for the hosted data API.
#[derive(Debug, Clone)]
pub struct RestDataSource {
    client: reqwest::Client,
    base_url: String,
    api_key: SecretString,
}

impl RestDataSource {
    /// Create a data source from configuration.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be created. This should never happen
    /// under normal circumstances as we use standard TLS configuration.
    #[must_use]
    pub fn new(config: &AnalyticsConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            base_url: config.data_api_url.as_str().trim_end_matches('/').to_string(),
            api_key: config.data_api_key.clone(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    fn rpc_url(&self, procedure: &str) -> String {
        format!("{}/rest/v1/rpc/{procedure}", self.base_url)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        request
            .header("apikey", self.api_key.expose_secret())
            .bearer_auth(self.api_key.expose_secret())
    }

    /// Fetch one page of rows from a table read endpoint.
    async fn get_rows<T: DeserializeOwned>(
        &self,
        table: &str,
        query: &[(String, String)],
    ) -> Result<Vec<T>, SourceError> {
        let response = self
            .authorize(self.client.get(self.table_url(table)).query(query))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

impl StockDataSource for RestDataSource {
    #[instrument(skip(self, filters))]
    async fn fetch_stock_page(
        &self,
        filters: &StockFilters,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<StockRow>, SourceError> {
        let mut query = vec![
            ("select".to_string(), "*".to_string()),
            ("order".to_string(), "item_code.asc".to_string()),
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];

        if let Some(group) = filters.group_filter() {
            query.push(("group_label".to_string(), format!("eq.{group}")));
        }
        if let Some(company) = filters.company_filter() {
            query.push(("company_label".to_string(), format!("eq.{company}")));
        }
        if let Some(year) = filters.min_registration_year {
            query.push(("registered_at".to_string(), format!("gte.{year}-01-01")));
        }
        if !filters.include_zero_stock {
            query.push(("physical_stock".to_string(), "gt.0".to_string()));
        }

        self.get_rows(STOCK_TABLE, &query).await
    }

    #[instrument(skip(self))]
    async fn fetch_sales_page(
        &self,
        range: &DateRange,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<SalesRow>, SourceError> {
        let query = vec![
            (
                "select".to_string(),
                "item_code,unit_price,quantity,transaction_type".to_string(),
            ),
            ("sale_date".to_string(), format!("gte.{}", range.start)),
            ("sale_date".to_string(), format!("lte.{}", range.end)),
            (
                "transaction_type".to_string(),
                format!("eq.{SALE_TRANSACTION_TYPE}"),
            ),
            ("order".to_string(), "item_code.asc".to_string()),
            ("offset".to_string(), offset.to_string()),
            ("limit".to_string(), limit.to_string()),
        ];

        self.get_rows(SALES_TABLE, &query).await
    }

    #[instrument(skip(self, params))]
    async fn fetch_analytics_aggregate(
        &self,
        params: &AggregateParams,
    ) -> Result<serde_json::Value, SourceError> {
        let response = self
            .authorize(self.client.post(self.rpc_url(ANALYTICS_RPC)).json(params))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SourceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        // Raw payload on purpose: shape validation is the primary path's job
        response
            .json::<serde_json::Value>()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RestDataSource {
        RestDataSource {
            client: reqwest::Client::new(),
            base_url: "https://data.vestimoda.com.br".to_string(),
            api_key: SecretString::from("test-key"),
        }
    }

    #[test]
    fn test_endpoint_urls() {
        let source = source();
        assert_eq!(
            source.table_url(STOCK_TABLE),
            "https://data.vestimoda.com.br/rest/v1/stock_items"
        );
        assert_eq!(
            source.rpc_url(ANALYTICS_RPC),
            "https://data.vestimoda.com.br/rest/v1/rpc/stock_sales_analytics"
        );
    }
}
