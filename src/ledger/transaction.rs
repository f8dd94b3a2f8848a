use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::errors::{InvoiceError, Result};

/// A persisted financial record. The invoice engine only ever reads these.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Transaction {
    pub id: Uuid,
    pub workspace_id: Uuid,
    pub description: String,
    pub amount: Decimal,
    #[serde(flatten)]
    pub kind: TransactionKind,
    pub start_date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<Uuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        workspace_id: Uuid,
        description: impl Into<String>,
        amount: Decimal,
        kind: TransactionKind,
        start_date: NaiveDate,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            workspace_id,
            description: description.into(),
            amount,
            kind,
            start_date,
            category_id: None,
            class_id: None,
            created_at: Utc::now(),
        }
    }

    pub fn with_category(mut self, category_id: Uuid) -> Self {
        self.category_id = Some(category_id);
        self
    }

    pub fn with_class(mut self, class_id: Uuid) -> Self {
        self.class_id = Some(class_id);
        self
    }

    pub fn transaction_type(&self) -> TransactionType {
        self.kind.transaction_type()
    }

    /// End date of a recurring transaction; always `None` for other kinds.
    pub fn end_date(&self) -> Option<NaiveDate> {
        match self.kind {
            TransactionKind::Recurring { end_date } => end_date,
            _ => None,
        }
    }

    /// Checks the invariants the write path is responsible for.
    pub fn validate(&self) -> Result<()> {
        if self.description.trim().is_empty() {
            return Err(InvoiceError::InvalidTransaction(
                "description must not be empty".into(),
            ));
        }
        if self.amount <= Decimal::ZERO {
            return Err(InvoiceError::InvalidTransaction(format!(
                "amount must be positive, got {}",
                self.amount
            )));
        }
        match self.kind {
            TransactionKind::Single => {}
            TransactionKind::Installment { installments } => {
                if installments < 2 {
                    return Err(InvoiceError::InvalidInstallmentCount(installments));
                }
            }
            TransactionKind::Recurring { end_date } => {
                if let Some(end) = end_date {
                    if end < self.start_date {
                        return Err(InvoiceError::InvalidTransaction(format!(
                            "end date {} is before start date {}",
                            end, self.start_date
                        )));
                    }
                }
            }
        }
        Ok(())
    }
}

/// Recurrence kind with the data that only makes sense for that kind.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum TransactionKind {
    Single,
    Installment {
        /// Missing or non-positive counts are kept as-is so malformed rows
        /// still load; the projection skips them.
        #[serde(default)]
        installments: i64,
    },
    Recurring {
        #[serde(default)]
        end_date: Option<NaiveDate>,
    },
}

impl TransactionKind {
    pub fn transaction_type(&self) -> TransactionType {
        match self {
            TransactionKind::Single => TransactionType::Single,
            TransactionKind::Installment { .. } => TransactionType::Installment,
            TransactionKind::Recurring { .. } => TransactionType::Recurring,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    Single,
    Installment,
    Recurring,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionType::Single => "single",
            TransactionType::Installment => "installment",
            TransactionType::Recurring => "recurring",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
