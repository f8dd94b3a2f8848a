mod common;

use common::{date, installment, recurring, single};
use invoice_core::{
    errors::InvoiceError,
    ledger::{
        calculate_invoice, CalendarMonth, CandidatePredicate, TransactionWindow,
        DEFAULT_LOOKBACK_MONTHS,
    },
    storage::select_candidates,
};
use uuid::Uuid;

#[test]
fn june_window_example() {
    let window = TransactionWindow::for_selector("2025-06", DEFAULT_LOOKBACK_MONTHS).unwrap();
    assert_eq!(window.installment_lower_bound, date(2022, 6, 1));

    let [recurring_pred, single_pred, installment_pred] = window.predicates();
    let scope = Uuid::new_v4();
    assert!(recurring_pred.matches(&recurring(scope, "Gym", "50", date(2025, 1, 1), None)));
    assert!(!single_pred.matches(&single(scope, "May dinner", "10", date(2025, 5, 1))));
    assert!(installment_pred.matches(&installment(scope, "TV", "900", 36, date(2022, 6, 1))));
    assert!(!installment_pred.matches(&installment(scope, "Old", "900", 48, date(2022, 5, 31))));
}

#[test]
fn recurring_predicate_boundaries() {
    let window = TransactionWindow::new(CalendarMonth::new(2025, 6).unwrap(), 36).unwrap();
    let scope = Uuid::new_v4();
    let ends_first_day = recurring(scope, "a", "1", date(2025, 1, 1), Some(date(2025, 6, 1)));
    let ended_in_may = recurring(scope, "b", "1", date(2025, 1, 1), Some(date(2025, 5, 31)));
    let starts_july = recurring(scope, "c", "1", date(2025, 7, 1), None);
    assert!(window.admits(&ends_first_day));
    assert!(!window.admits(&ended_in_may));
    assert!(!window.admits(&starts_july));
}

#[test]
fn predicates_render_as_filters() {
    let window = TransactionWindow::for_selector("2025-06", 36).unwrap();
    let rendered: Vec<String> = window.predicates().iter().map(ToString::to_string).collect();
    assert_eq!(
        rendered,
        vec![
            "type = 'recurring' AND start_date < '2025-07-01' AND (end_date IS NULL OR end_date >= '2025-06-01')",
            "type = 'single' AND start_date >= '2025-06-01' AND start_date < '2025-07-01'",
            "type = 'installment' AND start_date >= '2022-06-01' AND start_date < '2025-07-01'",
        ]
    );
    assert!(matches!(
        window.predicates()[1],
        CandidatePredicate::Single { .. }
    ));
}

#[test]
fn selected_candidates_project_like_the_full_set() {
    let scope = Uuid::new_v4();
    let rows = vec![
        single(scope, "June", "10", date(2025, 6, 3)),
        single(scope, "July", "10", date(2025, 7, 3)),
        installment(scope, "Ended", "60", 2, date(2024, 1, 1)),
        installment(scope, "Running", "60", 12, date(2025, 1, 1)),
        recurring(scope, "Open", "5", date(2023, 3, 1), None),
        recurring(scope, "Closed", "5", date(2023, 3, 1), Some(date(2024, 3, 1))),
    ];
    let window = TransactionWindow::for_selector("2025-06", 36).unwrap();
    let candidates = select_candidates(&rows, &window);

    let mut names: Vec<&str> = candidates.iter().map(|t| t.description.as_str()).collect();
    names.sort_unstable();
    assert_eq!(names, vec!["Ended", "June", "Open", "Running"]);

    let from_candidates = calculate_invoice(&candidates, 2025, 6).unwrap();
    let from_all = calculate_invoice(&rows, 2025, 6).unwrap();
    assert_eq!(from_candidates.total, from_all.total);
    assert_eq!(from_candidates.items.len(), 3);
}

#[test]
fn candidates_are_newest_first() {
    let scope = Uuid::new_v4();
    let rows = vec![
        recurring(scope, "old", "1", date(2024, 1, 1), None),
        single(scope, "new", "1", date(2025, 6, 20)),
        installment(scope, "mid", "10", 10, date(2025, 3, 1)),
    ];
    let window = TransactionWindow::for_selector("2025-06", 36).unwrap();
    let order: Vec<String> = select_candidates(&rows, &window)
        .into_iter()
        .map(|t| t.description)
        .collect();
    assert_eq!(order, vec!["new", "mid", "old"]);
}

#[test]
fn bad_selectors_fail() {
    assert!(matches!(
        TransactionWindow::for_selector("2025/06", 36),
        Err(InvoiceError::InvalidMonthInput(_))
    ));
    assert!(matches!(
        TransactionWindow::for_selector("2025-00", 36),
        Err(InvoiceError::InvalidMonthInput(_))
    ));
}
