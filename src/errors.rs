use rust_decimal::Decimal;
use thiserror::Error;

/// Error type that captures invoice projection failures.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InvoiceError {
    #[error("Invalid date: {0}")]
    InvalidDate(String),
    #[error("Invalid month input: {0}")]
    InvalidMonthInput(String),
    #[error("Invalid year: {0}")]
    InvalidYear(i32),
    #[error("Invalid month: {0}")]
    InvalidMonth(u32),
    #[error("Invalid installments: {0}")]
    InvalidInstallmentCount(i64),
    #[error("Amount out of range: {0}")]
    AmountOutOfRange(Decimal),
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),
}

pub type Result<T> = std::result::Result<T, InvoiceError>;
