use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Mutex, PoisonError},
};

use tracing::debug;
use uuid::Uuid;

use crate::{
    core::utils::{ensure_dir, transactions_dir_in, write_atomic},
    ledger::{Transaction, TransactionWindow},
};

use super::{order_candidates, select_candidates, Result, StorageError, TransactionStore};

const FILE_EXTENSION: &str = "json";

/// Stores each scope's transactions as a JSON array in `<root>/<scope>.json`.
#[derive(Debug)]
pub struct JsonStore {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl JsonStore {
    pub fn new(root: PathBuf) -> Result<Self> {
        ensure_dir(&root)?;
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    /// Store rooted at `<base>/transactions`.
    pub fn in_base_dir(base: &Path) -> Result<Self> {
        Self::new(transactions_dir_in(base))
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn scope_path(&self, scope: Uuid) -> PathBuf {
        self.root.join(format!("{}.{}", scope, FILE_EXTENSION))
    }

    fn load_scope(&self, scope: Uuid) -> Result<Vec<Transaction>> {
        let path = self.scope_path(scope);
        if !path.exists() {
            return Ok(Vec::new());
        }
        load_transactions_from_path(&path)
    }

    fn save_scope(&self, scope: Uuid, rows: &[Transaction]) -> Result<()> {
        let path = self.scope_path(scope);
        save_transactions_to_path(rows, &path)?;
        debug!(%scope, rows = rows.len(), path = %path.display(), "scope saved");
        Ok(())
    }

    fn modify_scope<T>(
        &self,
        scope: Uuid,
        change: impl FnOnce(&mut Vec<Transaction>) -> Result<T>,
    ) -> Result<T> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut rows = self.load_scope(scope)?;
        let outcome = change(&mut rows)?;
        self.save_scope(scope, &rows)?;
        Ok(outcome)
    }
}

impl TransactionStore for JsonStore {
    fn fetch_candidates(&self, scope: Uuid, window: &TransactionWindow) -> Result<Vec<Transaction>> {
        let rows = self.load_scope(scope)?;
        Ok(select_candidates(&rows, window))
    }

    fn list(&self, scope: Uuid) -> Result<Vec<Transaction>> {
        let mut rows = self.load_scope(scope)?;
        order_candidates(&mut rows);
        Ok(rows)
    }

    fn insert(&self, transaction: Transaction) -> Result<()> {
        self.modify_scope(transaction.workspace_id, |rows| {
            if rows.iter().any(|txn| txn.id == transaction.id) {
                return Err(StorageError::DuplicateTransaction(transaction.id));
            }
            rows.push(transaction);
            Ok(())
        })
    }

    fn update(&self, transaction: Transaction) -> Result<Transaction> {
        self.modify_scope(transaction.workspace_id, |rows| {
            let slot = rows
                .iter_mut()
                .find(|txn| txn.id == transaction.id)
                .ok_or(StorageError::TransactionNotFound(transaction.id))?;
            Ok(std::mem::replace(slot, transaction))
        })
    }

    fn delete(&self, scope: Uuid, id: Uuid) -> Result<Transaction> {
        self.modify_scope(scope, |rows| {
            let index = rows
                .iter()
                .position(|txn| txn.id == id)
                .ok_or(StorageError::TransactionNotFound(id))?;
            Ok(rows.remove(index))
        })
    }
}

/// Writes transactions to disk atomically by staging to a temporary file.
pub fn save_transactions_to_path(rows: &[Transaction], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(rows)?;
    write_atomic(path, &json)?;
    Ok(())
}

/// Loads a JSON array of transactions.
pub fn load_transactions_from_path(path: &Path) -> Result<Vec<Transaction>> {
    let data = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&data)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;
    use tempfile::TempDir;

    use crate::ledger::TransactionKind;

    fn store_with_temp_dir() -> (JsonStore, TempDir) {
        let temp = TempDir::new().unwrap();
        let store = JsonStore::in_base_dir(temp.path()).unwrap();
        (store, temp)
    }

    #[test]
    fn insert_update_delete_persist_to_disk() {
        let (store, _temp) = store_with_temp_dir();
        let scope = Uuid::new_v4();
        let mut txn = Transaction::new(
            scope,
            "Gym",
            Decimal::from(90),
            TransactionKind::Recurring { end_date: None },
            NaiveDate::from_ymd_opt(2025, 2, 1).unwrap(),
        );
        store.insert(txn.clone()).unwrap();
        assert!(store.scope_path(scope).exists());
        assert!(matches!(
            store.insert(txn.clone()),
            Err(StorageError::DuplicateTransaction(_))
        ));

        txn.amount = Decimal::from(95);
        let previous = store.update(txn.clone()).unwrap();
        assert_eq!(previous.amount, Decimal::from(90));
        assert_eq!(store.get(scope, txn.id).unwrap().amount, Decimal::from(95));

        store.delete(scope, txn.id).unwrap();
        assert!(store.list(scope).unwrap().is_empty());
        assert!(matches!(
            store.delete(scope, txn.id),
            Err(StorageError::TransactionNotFound(_))
        ));
    }

    #[test]
    fn unknown_scope_lists_nothing() {
        let (store, _temp) = store_with_temp_dir();
        assert!(store.list(Uuid::new_v4()).unwrap().is_empty());
    }
}
