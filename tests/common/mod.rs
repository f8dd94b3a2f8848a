#![allow(dead_code)]

use chrono::NaiveDate;
use invoice_core::ledger::{Transaction, TransactionKind};
use rust_decimal::Decimal;
use uuid::Uuid;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

pub fn dec(raw: &str) -> Decimal {
    raw.parse().expect("valid fixture amount")
}

pub fn single(scope: Uuid, description: &str, amount: &str, start: NaiveDate) -> Transaction {
    Transaction::new(scope, description, dec(amount), TransactionKind::Single, start)
}

pub fn installment(
    scope: Uuid,
    description: &str,
    amount: &str,
    installments: i64,
    start: NaiveDate,
) -> Transaction {
    Transaction::new(
        scope,
        description,
        dec(amount),
        TransactionKind::Installment { installments },
        start,
    )
}

pub fn recurring(
    scope: Uuid,
    description: &str,
    amount: &str,
    start: NaiveDate,
    end: Option<NaiveDate>,
) -> Transaction {
    Transaction::new(
        scope,
        description,
        dec(amount),
        TransactionKind::Recurring { end_date: end },
        start,
    )
}

/// One transaction of each kind, all active in June 2025.
pub fn june_sample(scope: Uuid) -> Vec<Transaction> {
    vec![
        single(scope, "Dinner", "100", date(2025, 6, 10)),
        installment(scope, "Phone", "100", 3, date(2025, 5, 1)),
        recurring(scope, "Gym", "50", date(2025, 1, 1), None),
    ]
}
