//! Date range for analytics queries.

use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error returned when a date range is malformed.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("start date {start} is after end date {end}")]
pub struct DateRangeError {
    /// The offending start date.
    pub start: NaiveDate,
    /// The offending end date.
    pub end: NaiveDate,
}

/// Inclusive date range for an analytics query window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    /// First day of the window (inclusive).
    pub start: NaiveDate,
    /// Last day of the window (inclusive).
    pub end: NaiveDate,
}

impl DateRange {
    /// Create a date range for a specific period.
    #[must_use]
    pub const fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// Create a date range covering the last N days ending at `end`.
    #[must_use]
    pub fn last_days(end: NaiveDate, days: u32) -> Self {
        Self {
            start: end - Duration::days(i64::from(days.saturating_sub(1))),
            end,
        }
    }

    /// Validate the range before any I/O is performed.
    ///
    /// # Errors
    ///
    /// Returns `DateRangeError` if `start` is after `end`.
    pub fn validate(&self) -> Result<(), DateRangeError> {
        if self.start > self.end {
            return Err(DateRangeError {
                start: self.start,
                end: self.end,
            });
        }
        Ok(())
    }

    /// Number of days covered by the window, inclusive of both ends.
    ///
    /// Never less than 1, so it is always safe as a divisor.
    #[must_use]
    pub fn window_days(&self) -> i64 {
        ((self.end - self.start).num_days() + 1).max(1)
    }
}
