//! Invoice projection: turns a snapshot of transactions into the invoice of
//! one target month.
//!
//! The functions here are pure. They re-check every transaction against the
//! target month, whatever pre-filter the storage layer applied.

use tracing::{debug, warn};

use crate::{
    currency::{from_cents, to_cents},
    errors::{InvoiceError, Result},
};

use super::{
    installment::{installment_part_cents, installment_position},
    invoice::{Invoice, InvoiceLineItem, LineItemDetail},
    month::{compare, parse_month_selector, CalendarMonth},
    transaction::{Transaction, TransactionKind},
};

const MIN_INVOICE_YEAR: i32 = 1900;

/// Builds the invoice for `year`/`month` from `transactions`.
///
/// Items are ordered by amount, largest first. Equal amounts keep the order
/// they had in `transactions`. The total is summed in integer cents.
pub fn calculate_invoice(transactions: &[Transaction], year: i32, month: u32) -> Result<Invoice> {
    if year < MIN_INVOICE_YEAR {
        return Err(InvoiceError::InvalidYear(year));
    }
    let target = CalendarMonth::new(year, month)?;

    let mut items = Vec::new();
    for transaction in transactions {
        if let Some(item) = project_transaction(transaction, target)? {
            items.push(item);
        }
    }

    // `sort_by` is stable.
    items.sort_by(|a, b| b.amount.cmp(&a.amount));

    let mut total_cents = 0i64;
    for item in &items {
        total_cents = total_cents
            .checked_add(to_cents(item.amount)?)
            .ok_or(InvoiceError::AmountOutOfRange(item.amount))?;
    }

    debug!(
        month = %target,
        candidates = transactions.len(),
        items = items.len(),
        total_cents,
        "invoice projected"
    );

    Ok(Invoice {
        month: target,
        items,
        total: from_cents(total_cents),
    })
}

/// Same as [`calculate_invoice`] for a `YYYY-MM` selector.
pub fn calculate_invoice_for_selector(transactions: &[Transaction], selector: &str) -> Result<Invoice> {
    let target = parse_month_selector(selector)?;
    calculate_invoice(transactions, target.year, target.month)
}

/// The line item `transaction` contributes to `target`, if any.
pub fn project_transaction(
    transaction: &Transaction,
    target: CalendarMonth,
) -> Result<Option<InvoiceLineItem>> {
    let start = CalendarMonth::from_date(transaction.start_date);

    let projected = match transaction.kind {
        TransactionKind::Single => {
            if compare(&start, &target) != 0 {
                return Ok(None);
            }
            (transaction.amount, LineItemDetail::Single)
        }
        TransactionKind::Installment { installments } => {
            if installments <= 0 {
                warn!(
                    transaction = %transaction.id,
                    installments,
                    "skipping installment transaction without a usable count"
                );
                return Ok(None);
            }
            let Some(position) = installment_position(start, target, installments) else {
                return Ok(None);
            };
            let part = installment_part_cents(to_cents(transaction.amount)?, installments)?;
            (
                from_cents(part),
                LineItemDetail::Installment {
                    position,
                    count: installments,
                },
            )
        }
        TransactionKind::Recurring { end_date } => {
            let end = end_date.map(CalendarMonth::from_date);
            let started = compare(&target, &start) >= 0;
            let not_ended = end.map_or(true, |end| compare(&target, &end) <= 0);
            if !(started && not_ended) {
                return Ok(None);
            }
            (
                transaction.amount,
                LineItemDetail::Recurring {
                    open_ended: end_date.is_none(),
                },
            )
        }
    };

    let (amount, detail) = projected;
    Ok(Some(InvoiceLineItem {
        transaction_id: transaction.id,
        description: transaction.description.clone(),
        year: target.year,
        month: target.month,
        amount,
        detail,
    }))
}
