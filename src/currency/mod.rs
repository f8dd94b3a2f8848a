//! Money conversion between decimal currency units and integer cents, plus
//! the locale-aware rendering used by the CLI.

use rust_decimal::{prelude::ToPrimitive, Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::errors::{InvoiceError, Result};

/// Converts a decimal amount to integer cents, rounding half away from zero.
pub fn to_cents(amount: Decimal) -> Result<i64> {
    amount
        .checked_mul(Decimal::ONE_HUNDRED)
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|rounded| rounded.to_i64())
        .ok_or(InvoiceError::AmountOutOfRange(amount))
}

/// Converts integer cents back to a two-place decimal amount.
pub fn from_cents(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}

/// ISO 4217 currency representation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct CurrencyCode(pub String);

impl CurrencyCode {
    pub fn new(code: impl Into<String>) -> Self {
        Self(code.into().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for CurrencyCode {
    fn default() -> Self {
        Self::new("BRL")
    }
}

/// Separators used when rendering amounts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LocaleConfig {
    pub language_tag: String,
    pub decimal_separator: char,
    pub grouping_separator: char,
}

impl LocaleConfig {
    pub fn for_tag(tag: &str) -> Self {
        let (decimal_separator, grouping_separator) = match tag {
            "pt-BR" | "de-DE" | "es-ES" | "it-IT" => (',', '.'),
            "fr-FR" => (',', ' '),
            _ => ('.', ','),
        };
        Self {
            language_tag: tag.to_string(),
            decimal_separator,
            grouping_separator,
        }
    }
}

impl Default for LocaleConfig {
    fn default() -> Self {
        Self::for_tag("en-US")
    }
}

pub fn symbol_for(code: &str) -> String {
    match code {
        "BRL" => "R$".into(),
        "USD" => "$".into(),
        "EUR" => "€".into(),
        "GBP" => "£".into(),
        _ => code.into(),
    }
}

pub fn format_number(locale: &LocaleConfig, value: Decimal) -> String {
    let body = format!("{:.2}", value.round_dp(2));
    let (int_part, frac_part) = body.split_once('.').unwrap_or((body.as_str(), "00"));
    let (sign, digits) = match int_part.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", int_part),
    };
    format!(
        "{}{}{}{}",
        sign,
        group_digits(digits, locale.grouping_separator),
        locale.decimal_separator,
        frac_part
    )
}

fn group_digits(digits: &str, separator: char) -> String {
    let mut grouped = String::new();
    for (count, ch) in digits.chars().rev().enumerate() {
        if count != 0 && count % 3 == 0 {
            grouped.insert(0, separator);
        }
        grouped.insert(0, ch);
    }
    grouped
}

/// Renders `amount` with the currency symbol, e.g. `R$ 1.234,50`.
pub fn format_amount(amount: Decimal, code: &CurrencyCode, locale: &LocaleConfig) -> String {
    format!("{} {}", symbol_for(code.as_str()), format_number(locale, amount))
}
