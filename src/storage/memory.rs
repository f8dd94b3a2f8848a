use std::{
    collections::HashMap,
    sync::{PoisonError, RwLock},
};

use uuid::Uuid;

use crate::ledger::{Transaction, TransactionWindow};

use super::{order_candidates, select_candidates, Result, StorageError, TransactionStore};

/// Process-local store, mostly useful for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    scopes: RwLock<HashMap<Uuid, Vec<Transaction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_transactions(transactions: impl IntoIterator<Item = Transaction>) -> Self {
        let store = Self::new();
        {
            let mut scopes = store.scopes.write().unwrap_or_else(PoisonError::into_inner);
            for txn in transactions {
                scopes.entry(txn.workspace_id).or_default().push(txn);
            }
        }
        store
    }
}

impl TransactionStore for MemoryStore {
    fn fetch_candidates(&self, scope: Uuid, window: &TransactionWindow) -> Result<Vec<Transaction>> {
        let scopes = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
        Ok(scopes
            .get(&scope)
            .map(|rows| select_candidates(rows, window))
            .unwrap_or_default())
    }

    fn list(&self, scope: Uuid) -> Result<Vec<Transaction>> {
        let scopes = self.scopes.read().unwrap_or_else(PoisonError::into_inner);
        let mut rows = scopes.get(&scope).cloned().unwrap_or_default();
        order_candidates(&mut rows);
        Ok(rows)
    }

    fn insert(&self, transaction: Transaction) -> Result<()> {
        let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
        let rows = scopes.entry(transaction.workspace_id).or_default();
        if rows.iter().any(|txn| txn.id == transaction.id) {
            return Err(StorageError::DuplicateTransaction(transaction.id));
        }
        rows.push(transaction);
        Ok(())
    }

    fn update(&self, transaction: Transaction) -> Result<Transaction> {
        let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
        let slot = scopes
            .get_mut(&transaction.workspace_id)
            .and_then(|rows| rows.iter_mut().find(|txn| txn.id == transaction.id))
            .ok_or(StorageError::TransactionNotFound(transaction.id))?;
        Ok(std::mem::replace(slot, transaction))
    }

    fn delete(&self, scope: Uuid, id: Uuid) -> Result<Transaction> {
        let mut scopes = self.scopes.write().unwrap_or_else(PoisonError::into_inner);
        let rows = scopes
            .get_mut(&scope)
            .ok_or(StorageError::TransactionNotFound(id))?;
        let index = rows
            .iter()
            .position(|txn| txn.id == id)
            .ok_or(StorageError::TransactionNotFound(id))?;
        Ok(rows.remove(index))
    }
}
