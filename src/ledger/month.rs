//! Calendar month arithmetic.
//!
//! Months are plain `(year, month)` pairs mapped onto a continuous index
//! (`year * 12 + month - 1`). Offsetting and comparing go through that index
//! only, so no clock, timezone or day-of-month ever takes part.

use std::{cmp::Ordering, fmt, str::FromStr};

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::errors::{InvoiceError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CalendarMonth {
    pub year: i32,
    pub month: u32,
}

impl CalendarMonth {
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(InvoiceError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    /// Month that contains the given calendar date.
    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// Continuous month index: `year * 12 + (month - 1)`.
    pub fn index(&self) -> i64 {
        i64::from(self.year) * 12 + i64::from(self.month) - 1
    }

    fn from_index(index: i64) -> Option<Self> {
        let year = i32::try_from(index.div_euclid(12)).ok()?;
        let month = u32::try_from(index.rem_euclid(12) + 1).ok()?;
        Some(Self { year, month })
    }

    /// The month `months` calendar months after `self` (negative goes back).
    pub fn checked_offset(&self, months: i64) -> Option<Self> {
        self.index()
            .checked_add(months)
            .and_then(Self::from_index)
    }

    /// Like [`CalendarMonth::checked_offset`], saturating at the representable year range.
    pub fn offset(&self, months: i64) -> Self {
        self.checked_offset(months).unwrap_or(if months < 0 {
            Self {
                year: i32::MIN,
                month: 1,
            }
        } else {
            Self {
                year: i32::MAX,
                month: 12,
            }
        })
    }

    /// Signed distance in months from `other` to `self`.
    pub fn months_since(&self, other: &CalendarMonth) -> i64 {
        compare(self, other)
    }

    /// First calendar day of the month.
    pub fn first_day(&self) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .ok_or_else(|| InvoiceError::InvalidMonthInput(self.to_string()))
    }
}

impl fmt::Display for CalendarMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for CalendarMonth {
    type Err = InvoiceError;

    fn from_str(s: &str) -> Result<Self> {
        parse_month_selector(s)
    }
}

/// `index(a) - index(b)`.
pub fn compare(a: &CalendarMonth, b: &CalendarMonth) -> i64 {
    a.index() - b.index()
}

pub fn ordering(a: &CalendarMonth, b: &CalendarMonth) -> Ordering {
    compare(a, b).cmp(&0)
}

/// Parses a `YYYY-MM-DD` date into the month containing it. Only the year and
/// month segments are inspected.
pub fn parse_date(text: &str) -> Result<CalendarMonth> {
    split_year_month(text).ok_or_else(|| InvoiceError::InvalidDate(text.to_string()))
}

/// Parses a `YYYY-MM` month selector.
pub fn parse_month_selector(text: &str) -> Result<CalendarMonth> {
    split_year_month(text).ok_or_else(|| InvoiceError::InvalidMonthInput(text.to_string()))
}

fn split_year_month(text: &str) -> Option<CalendarMonth> {
    let mut parts = text.trim().split('-');
    let year: i32 = parts.next()?.trim().parse().ok()?;
    let month: u32 = parts.next()?.trim().parse().ok()?;
    if year == 0 || month == 0 || month > 12 {
        return None;
    }
    Some(CalendarMonth { year, month })
}
