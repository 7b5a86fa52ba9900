//! Vesti Core - Shared types library.
//!
//! This crate provides common types used across the Vesti analytics
//! components:
//! - `analytics` - Stock-vs-sales reconciliation engine
//! - `integration-tests` - Cross-path scenario tests
//!
//! # Architecture
//!
//! The core crate contains only types and pure computation - no I/O, no
//! database access, no HTTP clients. This keeps it lightweight and allows
//! it to be used anywhere.
//!
//! # Modules
//!
//! - [`types`] - Analytics row types, date ranges, filter sets, and
//!   derived-metric math

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
