//! Invoice domain models and the pure month/money/projection logic.

pub mod installment;
pub mod invoice;
pub mod month;
pub mod projection;
pub mod transaction;
pub mod window;

pub use installment::{installment_part_cents, installment_position};
pub use invoice::{Invoice, InvoiceLineItem, KindTotals, LimitUsage, LineItemDetail};
pub use month::{parse_date, parse_month_selector, CalendarMonth};
pub use projection::{calculate_invoice, calculate_invoice_for_selector};
pub use transaction::{Transaction, TransactionKind, TransactionType};
pub use window::{CandidatePredicate, TransactionWindow, DEFAULT_LOOKBACK_MONTHS};
