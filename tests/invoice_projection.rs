mod common;

use common::{date, dec, installment, june_sample, recurring, single};
use invoice_core::{
    errors::InvoiceError,
    ledger::{
        calculate_invoice, calculate_invoice_for_selector, installment_part_cents, CalendarMonth,
        LineItemDetail, Transaction, TransactionKind, TransactionType,
    },
};
use rust_decimal::Decimal;
use uuid::Uuid;

fn months(from: CalendarMonth, count: i64) -> impl Iterator<Item = CalendarMonth> {
    (0..count).map(move |offset| from.offset(offset))
}

#[test]
fn end_to_end_june_invoice() {
    let invoice = calculate_invoice(&june_sample(Uuid::new_v4()), 2025, 6).unwrap();

    let summary: Vec<(&str, Decimal, TransactionType)> = invoice
        .items
        .iter()
        .map(|item| (item.description.as_str(), item.amount, item.kind()))
        .collect();
    assert_eq!(
        summary,
        vec![
            ("Dinner", dec("100.00"), TransactionType::Single),
            ("Gym", dec("50.00"), TransactionType::Recurring),
            ("Phone", dec("33.33"), TransactionType::Installment),
        ]
    );
    assert_eq!(
        invoice.items[2].detail,
        LineItemDetail::Installment {
            position: 2,
            count: 3
        }
    );
    assert_eq!(
        invoice.items[1].detail,
        LineItemDetail::Recurring { open_ended: true }
    );
    assert_eq!(invoice.total, dec("183.33"));
    assert_eq!(invoice.total.to_string(), "183.33");
    assert!(invoice.items.iter().all(|item| item.year == 2025 && item.month == 6));
}

#[test]
fn single_lands_only_in_its_start_month() {
    let scope = Uuid::new_v4();
    let txn = single(scope, "Concert", "80.10", date(2024, 11, 30));
    let start = CalendarMonth::new(2024, 6).unwrap();
    for month in months(start, 13) {
        let invoice = calculate_invoice(std::slice::from_ref(&txn), month.year, month.month).unwrap();
        if month == CalendarMonth::new(2024, 11).unwrap() {
            assert_eq!(invoice.items.len(), 1);
            assert_eq!(invoice.items[0].amount, dec("80.10"));
        } else {
            assert!(invoice.is_empty(), "{month}");
        }
    }
}

#[test]
fn installment_positions_run_one_to_n() {
    let txn = installment(Uuid::new_v4(), "Sofa", "1000", 4, date(2024, 11, 20));
    let before = CalendarMonth::new(2024, 10).unwrap();

    let positions: Vec<Option<u32>> = months(before, 7)
        .map(|month| {
            let invoice =
                calculate_invoice(std::slice::from_ref(&txn), month.year, month.month).unwrap();
            invoice.items.first().map(|item| match item.detail {
                LineItemDetail::Installment { position, .. } => position,
                _ => unreachable!("installment rows project installment items"),
            })
        })
        .collect();
    assert_eq!(
        positions,
        vec![None, Some(1), Some(2), Some(3), Some(4), None, None]
    );
}

#[test]
fn installment_parts_truncate() {
    for _ in 0..3 {
        assert_eq!(installment_part_cents(1000, 3).unwrap(), 333);
    }
    for (total, count) in [(1000, 3), (10_001, 7), (99, 100), (5, 2)] {
        let part = installment_part_cents(total, count).unwrap();
        let deficit = total - part * count;
        assert!((0..count).contains(&deficit), "{total}/{count}");
    }

    let txn = installment(Uuid::new_v4(), "Course", "10", 3, date(2025, 1, 1));
    let sum: Decimal = months(CalendarMonth::new(2025, 1).unwrap(), 3)
        .map(|month| {
            calculate_invoice(std::slice::from_ref(&txn), month.year, month.month)
                .unwrap()
                .total
        })
        .sum();
    assert_eq!(sum, dec("9.99"));
}

#[test]
fn recurring_respects_end_month() {
    let scope = Uuid::new_v4();
    let bounded = recurring(scope, "Lease", "700", date(2025, 2, 15), Some(date(2025, 4, 3)));
    let open = recurring(scope, "Stream", "39.90", date(2025, 2, 15), None);
    let rows = vec![bounded, open];

    let included = |year, month| {
        calculate_invoice(&rows, year, month)
            .unwrap()
            .items
            .into_iter()
            .map(|item| item.description)
            .collect::<Vec<_>>()
    };
    assert!(included(2025, 1).is_empty());
    assert_eq!(included(2025, 2), vec!["Lease", "Stream"]);
    assert_eq!(included(2025, 4), vec!["Lease", "Stream"]);
    assert_eq!(included(2025, 5), vec!["Stream"]);
    assert_eq!(included(2031, 12), vec!["Stream"]);
}

#[test]
fn equal_amounts_keep_input_order() {
    let scope = Uuid::new_v4();
    let rows = vec![
        single(scope, "first", "20", date(2025, 6, 1)),
        single(scope, "big", "90", date(2025, 6, 2)),
        recurring(scope, "second", "20", date(2025, 6, 3), None),
        single(scope, "third", "20", date(2025, 6, 4)),
    ];
    let invoice = calculate_invoice(&rows, 2025, 6).unwrap();
    let order: Vec<&str> = invoice.items.iter().map(|i| i.description.as_str()).collect();
    assert_eq!(order, vec!["big", "first", "second", "third"]);
    assert!(invoice
        .items
        .windows(2)
        .all(|pair| pair[0].amount >= pair[1].amount));
}

#[test]
fn projection_is_repeatable() {
    let rows = june_sample(Uuid::new_v4());
    let first = calculate_invoice(&rows, 2025, 6).unwrap();
    let second = calculate_invoice(&rows, 2025, 6).unwrap();
    assert_eq!(first, second);
    assert_eq!(calculate_invoice_for_selector(&rows, "2025-06").unwrap(), first);
}

#[test]
fn malformed_installments_are_skipped() {
    let scope = Uuid::new_v4();
    let mut broken = installment(scope, "Broken", "100", 3, date(2025, 6, 1));
    broken.kind = TransactionKind::Installment { installments: 0 };
    let rows: Vec<Transaction> = vec![broken, single(scope, "Ok", "10", date(2025, 6, 1))];
    let invoice = calculate_invoice(&rows, 2025, 6).unwrap();
    assert_eq!(invoice.items.len(), 1);
    assert_eq!(invoice.total, dec("10.00"));
}

#[test]
fn invalid_targets_are_rejected() {
    let rows = june_sample(Uuid::new_v4());
    assert_eq!(
        calculate_invoice(&rows, 1899, 6),
        Err(InvoiceError::InvalidYear(1899))
    );
    assert_eq!(
        calculate_invoice(&rows, 2025, 13),
        Err(InvoiceError::InvalidMonth(13))
    );
    assert!(matches!(
        calculate_invoice_for_selector(&rows, "June"),
        Err(InvoiceError::InvalidMonthInput(_))
    ));
    assert!(calculate_invoice(&[], 2025, 6).unwrap().is_empty());
}

#[test]
fn totals_and_limit_usage() {
    let invoice = calculate_invoice(&june_sample(Uuid::new_v4()), 2025, 6).unwrap();
    let totals = invoice.totals_by_kind().unwrap();
    assert_eq!(totals.single, dec("100.00"));
    assert_eq!(totals.installment, dec("33.33"));
    assert_eq!(totals.recurring, dec("50.00"));
    assert_eq!(totals.total, invoice.total);

    let usage = invoice.limit_usage(Some(dec("150")));
    assert!(usage.is_over());
    assert_eq!(usage.progress(), Decimal::ONE);

    let unlimited = invoice.limit_usage(Some(Decimal::ZERO));
    assert!(!unlimited.is_over());
    assert_eq!(unlimited.used(), dec("183.33"));
}
