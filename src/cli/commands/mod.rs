mod invoices;
mod settings;
mod system;
mod transactions;

use std::str::FromStr;

use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::ledger::{parse_month_selector, CalendarMonth};

use super::core::CommandError;
use super::registry::CommandRegistry;

pub(crate) fn register_all(registry: &mut CommandRegistry) {
    let groups = [
        system::definitions(),
        transactions::definitions(),
        invoices::definitions(),
        settings::definitions(),
    ];
    for entry in groups.into_iter().flatten() {
        registry.register(entry);
    }
}

pub(crate) fn require_arg<'a>(args: &[&'a str], index: usize, usage: &str) -> Result<&'a str, CommandError> {
    args.get(index)
        .copied()
        .ok_or_else(|| CommandError::InvalidArguments(format!("usage: {}", usage)))
}

pub(crate) fn parse_amount(input: &str) -> Result<Decimal, CommandError> {
    Decimal::from_str(input.trim()).map_err(|_| {
        CommandError::InvalidArguments(format!("invalid amount `{}` (use 1234.56)", input))
    })
}

pub(crate) fn parse_date(input: &str) -> Result<NaiveDate, CommandError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| {
        CommandError::InvalidArguments(format!("invalid date `{}` (use YYYY-MM-DD)", input))
    })
}

/// Month from a `YYYY-MM` argument, or the current local month.
pub(crate) fn parse_month_or_current(input: Option<&str>) -> Result<CalendarMonth, CommandError> {
    match input {
        Some(raw) => parse_month_selector(raw)
            .map_err(|err| CommandError::InvalidArguments(err.to_string())),
        None => Ok(CalendarMonth::from_date(Local::now().date_naive())),
    }
}
