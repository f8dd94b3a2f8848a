use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    currency::{from_cents, to_cents},
    errors::{InvoiceError, Result},
};

use super::{month::CalendarMonth, transaction::TransactionType};

/// Amount a single transaction contributes to one invoice month.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InvoiceLineItem {
    pub transaction_id: Uuid,
    pub description: String,
    pub year: i32,
    pub month: u32,
    pub amount: Decimal,
    pub detail: LineItemDetail,
}

impl InvoiceLineItem {
    pub fn kind(&self) -> TransactionType {
        match self.detail {
            LineItemDetail::Single => TransactionType::Single,
            LineItemDetail::Installment { .. } => TransactionType::Installment,
            LineItemDetail::Recurring { .. } => TransactionType::Recurring,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LineItemDetail {
    Single,
    /// `position` of `count`, e.g. 2 of 3.
    Installment { position: u32, count: i64 },
    Recurring { open_ended: bool },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Invoice {
    pub month: CalendarMonth,
    /// Sorted by amount, largest first.
    pub items: Vec<InvoiceLineItem>,
    pub total: Decimal,
}

impl Invoice {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn items_of(&self, kind: TransactionType) -> impl Iterator<Item = &InvoiceLineItem> + '_ {
        self.items.iter().filter(move |item| item.kind() == kind)
    }

    pub fn totals_by_kind(&self) -> Result<KindTotals> {
        let mut single = 0i64;
        let mut installment = 0i64;
        let mut recurring = 0i64;
        for item in &self.items {
            let cents = to_cents(item.amount)?;
            let bucket = match item.kind() {
                TransactionType::Single => &mut single,
                TransactionType::Installment => &mut installment,
                TransactionType::Recurring => &mut recurring,
            };
            *bucket = bucket
                .checked_add(cents)
                .ok_or(InvoiceError::AmountOutOfRange(item.amount))?;
        }
        let total = single
            .checked_add(installment)
            .and_then(|sum| sum.checked_add(recurring))
            .ok_or(InvoiceError::AmountOutOfRange(self.total))?;
        Ok(KindTotals {
            single: from_cents(single),
            installment: from_cents(installment),
            recurring: from_cents(recurring),
            total: from_cents(total),
        })
    }

    /// How much of an optional spending limit this invoice uses. A missing or
    /// non-positive limit counts as no limit.
    pub fn limit_usage(&self, limit: Option<Decimal>) -> LimitUsage {
        LimitUsage::evaluate(self.total, limit)
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct KindTotals {
    pub single: Decimal,
    pub installment: Decimal,
    pub recurring: Decimal,
    pub total: Decimal,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LimitUsage {
    Unlimited {
        used: Decimal,
    },
    Limited {
        limit: Decimal,
        used: Decimal,
        remaining: Decimal,
        used_percent: Decimal,
        /// `used / limit` clamped to `[0, 1]`.
        progress: Decimal,
        is_over: bool,
    },
}

impl LimitUsage {
    pub fn evaluate(used: Decimal, limit: Option<Decimal>) -> Self {
        let limit = match limit {
            Some(limit) if limit > Decimal::ZERO => limit,
            _ => return LimitUsage::Unlimited { used },
        };
        // Extreme ratios saturate.
        let ratio = used.checked_div(limit).unwrap_or(Decimal::MAX);
        LimitUsage::Limited {
            limit,
            used,
            remaining: limit.checked_sub(used).unwrap_or(Decimal::MIN),
            used_percent: ratio
                .checked_mul(Decimal::ONE_HUNDRED)
                .unwrap_or(Decimal::MAX),
            progress: ratio.clamp(Decimal::ZERO, Decimal::ONE),
            is_over: used > limit,
        }
    }

    pub fn used(&self) -> Decimal {
        match self {
            LimitUsage::Unlimited { used } | LimitUsage::Limited { used, .. } => *used,
        }
    }

    pub fn progress(&self) -> Decimal {
        match self {
            LimitUsage::Unlimited { .. } => Decimal::ZERO,
            LimitUsage::Limited { progress, .. } => *progress,
        }
    }

    pub fn is_over(&self) -> bool {
        matches!(self, LimitUsage::Limited { is_over: true, .. })
    }
}
