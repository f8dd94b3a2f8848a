#![doc(test(attr(deny(warnings))))]

//! Invoice Core projects recurring, installment, and one-off transactions
//! into monthly invoices, and selects the storage rows each month needs.

pub mod cli;
pub mod config;
pub mod core;
pub mod currency;
pub mod errors;
pub mod ledger;
pub mod storage;
pub mod utils;

use std::sync::Once;

static INIT_TRACING: Once = Once::new();

/// Initializes global tracing and emits a startup debug log.
pub fn init() {
    INIT_TRACING.call_once(|| {
        utils::init_tracing();
        tracing::debug!("Invoice Core tracing initialized.");
    });
}
