//! Storage pre-filter for one invoice month.
//!
//! A [`TransactionWindow`] describes which rows a storage backend must return
//! so the projection can build the invoice of its month. The predicates are a
//! superset filter only: final membership is always decided by
//! [`calculate_invoice`](super::projection::calculate_invoice).

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::Result;

use super::{
    month::{parse_month_selector, CalendarMonth},
    transaction::{Transaction, TransactionKind, TransactionType},
};

/// How many months back an installment start date is still fetched.
///
/// The horizon is not tied to any plan's installment count: a plan longer
/// than this stops being fetched once the target month is more than
/// `lookback` months past its start.
pub const DEFAULT_LOOKBACK_MONTHS: u32 = 36;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransactionWindow {
    pub month: CalendarMonth,
    pub lookback_months: u32,
    /// First day of the month (inclusive).
    pub month_start: NaiveDate,
    /// First day of the following month (exclusive).
    pub month_end_exclusive: NaiveDate,
    pub installment_lower_bound: NaiveDate,
}

impl TransactionWindow {
    pub fn new(month: CalendarMonth, lookback_months: u32) -> Result<Self> {
        let month_start = month.first_day()?;
        let month_end_exclusive = month.offset(1).first_day()?;
        let installment_lower_bound = month
            .offset(-i64::from(lookback_months))
            .first_day()?;
        Ok(Self {
            month,
            lookback_months,
            month_start,
            month_end_exclusive,
            installment_lower_bound,
        })
    }

    /// Builds the window for a `YYYY-MM` selector.
    pub fn for_selector(selector: &str, lookback_months: u32) -> Result<Self> {
        Self::new(parse_month_selector(selector)?, lookback_months)
    }

    /// `true` if `date` falls in `[month_start, month_end_exclusive)`.
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.month_start && date < self.month_end_exclusive
    }

    pub fn predicates(&self) -> [CandidatePredicate; 3] {
        [
            CandidatePredicate::Recurring {
                starts_before: self.month_end_exclusive,
                ends_on_or_after: self.month_start,
            },
            CandidatePredicate::Single {
                from: self.month_start,
                until: self.month_end_exclusive,
            },
            CandidatePredicate::Installment {
                from: self.installment_lower_bound,
                until: self.month_end_exclusive,
            },
        ]
    }

    /// Logical OR of the three candidate predicates.
    pub fn admits(&self, transaction: &Transaction) -> bool {
        self.predicates()
            .iter()
            .any(|predicate| predicate.matches(transaction))
    }
}

/// One storage-query predicate, scoped to a single transaction type.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum CandidatePredicate {
    /// `start_date < starts_before AND (end_date IS NULL OR end_date >= ends_on_or_after)`
    Recurring {
        starts_before: NaiveDate,
        ends_on_or_after: NaiveDate,
    },
    /// `start_date` in `[from, until)`
    Single { from: NaiveDate, until: NaiveDate },
    /// `start_date` in `[from, until)`
    Installment { from: NaiveDate, until: NaiveDate },
}

impl CandidatePredicate {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            CandidatePredicate::Recurring { .. } => TransactionType::Recurring,
            CandidatePredicate::Single { .. } => TransactionType::Single,
            CandidatePredicate::Installment { .. } => TransactionType::Installment,
        }
    }

    /// Evaluates the predicate in memory, the way a storage backend would.
    pub fn matches(&self, transaction: &Transaction) -> bool {
        let start = transaction.start_date;
        match (self, transaction.kind) {
            (
                CandidatePredicate::Recurring {
                    starts_before,
                    ends_on_or_after,
                },
                TransactionKind::Recurring { end_date },
            ) => start < *starts_before && end_date.map_or(true, |end| end >= *ends_on_or_after),
            (CandidatePredicate::Single { from, until }, TransactionKind::Single)
            | (CandidatePredicate::Installment { from, until }, TransactionKind::Installment { .. }) => {
                start >= *from && start < *until
            }
            _ => false,
        }
    }
}

impl fmt::Display for CandidatePredicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CandidatePredicate::Recurring {
                starts_before,
                ends_on_or_after,
            } => write!(
                f,
                "type = 'recurring' AND start_date < '{}' AND (end_date IS NULL OR end_date >= '{}')",
                starts_before.format("%Y-%m-%d"),
                ends_on_or_after.format("%Y-%m-%d")
            ),
            CandidatePredicate::Single { from, until }
            | CandidatePredicate::Installment { from, until } => write!(
                f,
                "type = '{}' AND start_date >= '{}' AND start_date < '{}'",
                self.transaction_type(),
                from.format("%Y-%m-%d"),
                until.format("%Y-%m-%d")
            ),
        }
    }
}
