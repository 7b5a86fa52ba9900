//! Vesti Analytics - stock-vs-sales reconciliation engine.
//!
//! Reconciles current inventory levels with historical sales to produce
//! per-item commercial metrics (turnover, days of coverage, percentage
//! sold, ranking) for the Vesti wholesale admin portal.
//!
//! # Architecture
//!
//! Two alternative retrieval strategies produce one stable result type:
//!
//! - **Primary path** ([`primary`]) - a single server-side aggregate call
//!   returning pre-joined analytics rows, normalized defensively.
//! - **Fallback path** ([`fallback`]) - a client-side join of the raw stock
//!   and sales tables, batched through [`batch`], with costs reduced by
//!   [`cost`].
//!
//! The orchestrator ([`engine::AnalyticsEngine`]) starts every request on
//! the primary path and transparently substitutes the fallback on any
//! failure; total failure degrades to an empty result set, never an error
//! surfaced to the UI layer.
//!
//! # Example
//!
//! ```rust,no_run
//! use vesti_analytics::config::AnalyticsConfig;
//! use vesti_analytics::engine::AnalyticsEngine;
//! use vesti_analytics::source::rest::RestDataSource;
//! use vesti_core::{DateRange, StockFilters};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AnalyticsConfig::from_env()?;
//! let engine = AnalyticsEngine::with_options(
//!     RestDataSource::new(&config),
//!     config.engine_options(),
//! );
//!
//! let range = DateRange::new(
//!     chrono::NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
//!     chrono::NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
//! );
//! let items = engine
//!     .fetch_stock_sales_analytics(&range, &StockFilters::default())
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod batch;
pub mod config;
pub mod cost;
pub mod engine;
pub mod error;
pub mod fallback;
pub mod normalize;
pub mod primary;
pub mod source;

pub use engine::{AnalyticsEngine, EngineOptions};
pub use error::{AnalyticsError, SourceError};
pub use source::{AggregateParams, SalesRow, StockDataSource, StockRow};
