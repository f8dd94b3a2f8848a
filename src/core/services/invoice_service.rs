use std::{collections::BTreeSet, sync::Arc};

use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    core::cache::{MonthCache, MonthKey},
    ledger::{
        calculate_invoice, parse_month_selector, CalendarMonth, Invoice, Transaction,
        TransactionWindow, DEFAULT_LOOKBACK_MONTHS,
    },
    storage::TransactionStore,
};

use super::{ServiceError, ServiceResult};

/// Read and write path for one store: cached month candidates on the way
/// in, validation and targeted cache invalidation on the way out.
pub struct InvoiceService<S> {
    store: S,
    cache: MonthCache<Vec<Transaction>>,
    lookback_months: u32,
}

impl<S: TransactionStore> InvoiceService<S> {
    pub fn new(store: S) -> Self {
        Self::with_lookback(store, DEFAULT_LOOKBACK_MONTHS)
    }

    pub fn with_lookback(store: S, lookback_months: u32) -> Self {
        Self {
            store,
            cache: MonthCache::new(),
            lookback_months,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn cache(&self) -> &MonthCache<Vec<Transaction>> {
        &self.cache
    }

    pub fn lookback_months(&self) -> u32 {
        self.lookback_months
    }

    /// Changes the installment horizon. Cached months were fetched with the
    /// old horizon and are dropped.
    pub fn set_lookback_months(&mut self, lookback_months: u32) {
        if self.lookback_months != lookback_months {
            self.lookback_months = lookback_months;
            self.cache = MonthCache::new();
        }
    }

    pub fn window(&self, month: CalendarMonth) -> ServiceResult<TransactionWindow> {
        Ok(TransactionWindow::new(month, self.lookback_months)?)
    }

    /// Candidate rows for `month`, fetched at most once until invalidated.
    pub fn candidates(&self, scope: Uuid, month: CalendarMonth) -> ServiceResult<Arc<Vec<Transaction>>> {
        let window = self.window(month)?;
        self.cache.get_or_fetch(MonthKey::new(scope, month), || {
            self.store
                .fetch_candidates(scope, &window)
                .map_err(ServiceError::from)
        })
    }

    pub fn invoice(&self, scope: Uuid, month: CalendarMonth) -> ServiceResult<Invoice> {
        let candidates = self.candidates(scope, month)?;
        Ok(calculate_invoice(&candidates, month.year, month.month)?)
    }

    /// Invoice for a `YYYY-MM` selector.
    pub fn invoice_for_month(&self, scope: Uuid, selector: &str) -> ServiceResult<Invoice> {
        let month = parse_month_selector(selector)?;
        self.invoice(scope, month)
    }

    pub fn list(&self, scope: Uuid) -> ServiceResult<Vec<Transaction>> {
        Ok(self.store.list(scope)?)
    }

    pub fn get(&self, scope: Uuid, id: Uuid) -> ServiceResult<Transaction> {
        Ok(self.store.get(scope, id)?)
    }

    pub fn create(&self, transaction: Transaction) -> ServiceResult<Transaction> {
        transaction.validate()?;
        self.store.insert(transaction.clone())?;
        self.cache
            .invalidate_affected(transaction.workspace_id, &transaction, self.lookback_months);
        info!(
            scope = %transaction.workspace_id,
            transaction = %transaction.id,
            kind = %transaction.transaction_type(),
            "transaction created"
        );
        Ok(transaction)
    }

    /// Replaces a stored transaction and returns the previous version.
    pub fn update(&self, transaction: Transaction) -> ServiceResult<Transaction> {
        transaction.validate()?;
        let scope = transaction.workspace_id;
        let previous = self.store.update(transaction.clone())?;
        self.cache
            .invalidate_affected(scope, &previous, self.lookback_months);
        self.cache
            .invalidate_affected(scope, &transaction, self.lookback_months);
        info!(%scope, transaction = %transaction.id, "transaction updated");
        Ok(previous)
    }

    pub fn delete(&self, scope: Uuid, id: Uuid) -> ServiceResult<Transaction> {
        let removed = self.store.delete(scope, id)?;
        self.cache
            .invalidate_affected(scope, &removed, self.lookback_months);
        info!(%scope, transaction = %id, "transaction deleted");
        Ok(removed)
    }

    /// Inserts a batch after validating every row. Nothing is kept if any row
    /// is invalid or fails to store: rows written before a failed insert are
    /// removed again.
    pub fn import_many(&self, transactions: Vec<Transaction>) -> ServiceResult<usize> {
        for (index, transaction) in transactions.iter().enumerate() {
            transaction.validate().map_err(|err| {
                ServiceError::Invalid(format!("row {}: {}", index + 1, err))
            })?;
        }
        let count = transactions.len();
        let mut scopes = BTreeSet::new();
        let mut inserted = Vec::with_capacity(count);
        let mut outcome = Ok(());
        for transaction in transactions {
            let (scope, id) = (transaction.workspace_id, transaction.id);
            scopes.insert(scope);
            if let Err(err) = self.store.insert(transaction) {
                outcome = Err(err);
                break;
            }
            inserted.push((scope, id));
        }

        if outcome.is_err() {
            for (scope, id) in inserted.iter().rev() {
                if let Err(err) = self.store.delete(*scope, *id) {
                    warn!(%scope, transaction = %id, error = %err, "import rollback failed");
                }
            }
        }
        // Invalidate even on failure: a row whose rollback failed is still stored.
        for scope in &scopes {
            self.cache.invalidate_scope(*scope);
        }
        outcome?;

        info!(rows = count, scopes = scopes.len(), "transactions imported");
        Ok(count)
    }

    pub fn invalidate_scope(&self, scope: Uuid) {
        self.cache.invalidate_scope(scope);
    }
}
