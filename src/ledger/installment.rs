use crate::errors::{InvoiceError, Result};

use super::month::CalendarMonth;

/// Per-month share of an installment plan, in cents.
///
/// Every position receives `floor(total_cents / count)`. The remainder
/// (`total_cents mod count`) is dropped and never assigned to any position, so
/// the shares of one plan add up to at most `count - 1` cents less than the
/// total.
pub fn installment_part_cents(total_cents: i64, count: i64) -> Result<i64> {
    if count <= 0 {
        return Err(InvoiceError::InvalidInstallmentCount(count));
    }
    Ok(total_cents.div_euclid(count))
}

/// 1-based installment number active in `target`, or `None` when the plan
/// starting in `start` has not begun or has already finished.
pub fn installment_position(start: CalendarMonth, target: CalendarMonth, count: i64) -> Option<u32> {
    let position = target.months_since(&start).checked_add(1)?;
    if position < 1 || position > count {
        return None;
    }
    u32::try_from(position).ok()
}
