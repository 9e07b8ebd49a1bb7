//! Calendar-day arithmetic for the countdown engine.
//!
//! All countdown math operates on whole calendar days. Historically the bug
//! source in schedule engines of this shape is a raw timestamp (with a time
//! of day attached) leaking into a day-span subtraction and silently skewing
//! the count by a fractional day. `DayDate` closes that hole by construction:
//! it can only hold a date that has already been truncated to midnight, so
//! every comparison and subtraction in the engine is exact whole-day
//! arithmetic.
//!
//! # Wire formats
//!
//! Two external date representations are accepted at the CLI boundary:
//! - epoch milliseconds (used by `add`), truncated to the UTC calendar day
//! - `DD/MM/YYYY` strings (used by `update`)

use crate::error::{Result, SlotlineError};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Date format used on the `update` wire and in human-readable output.
const DMY_FORMAT: &str = "%d/%m/%Y";

/// A calendar date normalized to midnight.
///
/// The inner `NaiveDate` carries no time-of-day or timezone offset, so
/// spans between two `DayDate`s are always whole days. Construct one from
/// a timestamp with [`DayDate::from_datetime`] or [`DayDate::from_epoch_ms`],
/// which perform the truncation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DayDate(NaiveDate);

impl DayDate {
    /// Build a date from year/month/day components.
    ///
    /// Returns `None` for out-of-range components (e.g. 31/02).
    pub fn from_ymd(year: i32, month: u32, day: u32) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day).map(DayDate)
    }

    /// Normalize a UTC timestamp to its calendar date, dropping the time of
    /// day. Any timezone conversion is assumed to have happened upstream.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        DayDate(dt.date_naive())
    }

    /// Normalize an epoch-millisecond timestamp to its UTC calendar date.
    pub fn from_epoch_ms(ms: i64) -> Result<Self> {
        let dt = DateTime::<Utc>::from_timestamp_millis(ms).ok_or_else(|| {
            SlotlineError::UserError(format!("timestamp out of range: {} ms", ms))
        })?;
        Ok(Self::from_datetime(dt))
    }

    /// Parse a `DD/MM/YYYY` date string.
    pub fn parse_dmy(s: &str) -> Result<Self> {
        NaiveDate::parse_from_str(s.trim(), DMY_FORMAT)
            .map(DayDate)
            .map_err(|e| {
                SlotlineError::UserError(format!(
                    "invalid date '{}' (expected DD/MM/YYYY): {}",
                    s, e
                ))
            })
    }

    /// Number of whole days from `self` to `end`.
    ///
    /// Negative when `end` is earlier than `self`.
    pub fn days_until(self, end: DayDate) -> i64 {
        (end.0 - self.0).num_days()
    }
}

/// Whole-day span of an inclusive date range.
///
/// `span_days(start, end)` is `(end - start)` in days; a single-day range has
/// span 0. Callers must not feed an inverted range here without having
/// validated it first.
pub fn span_days(start: DayDate, end: DayDate) -> i64 {
    start.days_until(end)
}

impl From<NaiveDate> for DayDate {
    fn from(date: NaiveDate) -> Self {
        DayDate(date)
    }
}

impl fmt::Display for DayDate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(DMY_FORMAT))
    }
}
