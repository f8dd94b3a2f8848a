//! Storage-query collaborators.
//!
//! A [`TransactionStore`] returns a superset of the rows one invoice month
//! needs, filtered by the [`TransactionWindow`] predicates. The projection
//! re-checks every row, so stores only need range and null-check filtering.

pub mod json_backend;
pub mod memory;

use std::{cmp::Reverse, io};

use thiserror::Error;
use uuid::Uuid;

use crate::ledger::{Transaction, TransactionWindow};

pub use json_backend::JsonStore;
pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),
    #[error("Transaction not found: {0}")]
    TransactionNotFound(Uuid),
    #[error("Transaction already exists: {0}")]
    DuplicateTransaction(Uuid),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Persistence backend for transactions grouped by owning scope.
pub trait TransactionStore: Send + Sync {
    /// Rows of `scope` admitted by `window`, newest start date first.
    fn fetch_candidates(&self, scope: Uuid, window: &TransactionWindow) -> Result<Vec<Transaction>>;

    /// Every row of `scope`, newest start date first.
    fn list(&self, scope: Uuid) -> Result<Vec<Transaction>>;

    fn insert(&self, transaction: Transaction) -> Result<()>;

    /// Replaces the stored row with the same id and returns the previous version.
    fn update(&self, transaction: Transaction) -> Result<Transaction>;

    /// Removes a row and returns it.
    fn delete(&self, scope: Uuid, id: Uuid) -> Result<Transaction>;

    fn get(&self, scope: Uuid, id: Uuid) -> Result<Transaction> {
        self.list(scope)?
            .into_iter()
            .find(|txn| txn.id == id)
            .ok_or(StorageError::TransactionNotFound(id))
    }
}

/// Sorts rows by `start_date` then `created_at`, both descending.
pub fn order_candidates(rows: &mut [Transaction]) {
    rows.sort_by_key(|txn| (Reverse(txn.start_date), Reverse(txn.created_at)));
}

/// Applies the window predicates to an in-memory row set.
pub fn select_candidates<'a>(
    rows: impl IntoIterator<Item = &'a Transaction>,
    window: &TransactionWindow,
) -> Vec<Transaction> {
    let mut selected: Vec<Transaction> = rows
        .into_iter()
        .filter(|txn| window.admits(txn))
        .cloned()
        .collect();
    order_candidates(&mut selected);
    selected
}
