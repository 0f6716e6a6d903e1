//! Financial ledger domain module.
//!
//! Ledger entries are local financial-transaction records, independent of
//! the gateway's own payment objects. An entry created for a gateway charge
//! carries an explicit `payment_id` foreign key; settlement updates are
//! keyed by that id, never by text matching on descriptions.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, LedgerEntryId, Money};
use crate::domain::payment::BillingType;

/// Direction of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

impl EntryKind {
    /// Sign applied to the amount when totalling.
    pub fn sign(&self) -> i64 {
        match self {
            EntryKind::Income => 1,
            EntryKind::Expense => -1,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EntryKind::Income => "income",
            EntryKind::Expense => "expense",
        }
    }
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "income" => Ok(EntryKind::Income),
            "expense" => Ok(EntryKind::Expense),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown ledger entry kind: {}", other),
            )),
        }
    }
}

/// Settlement state of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Awaiting confirmation of the correlated charge.
    Pending,

    /// The correlated charge settled (or the entry was recorded settled).
    Settled,

    /// The correlated charge was cancelled; the entry stays for the audit
    /// trail but is excluded from totals.
    Void,
}

impl EntryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Pending => "pending",
            EntryStatus::Settled => "settled",
            EntryStatus::Void => "void",
        }
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EntryStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EntryStatus::Pending),
            "settled" => Ok(EntryStatus::Settled),
            "void" => Ok(EntryStatus::Void),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown ledger entry status: {}", other),
            )),
        }
    }
}

/// A single financial-transaction record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerEntry {
    pub id: LedgerEntryId,
    pub description: String,
    pub kind: EntryKind,
    pub amount: Money,
    pub entry_date: NaiveDate,
    pub category: String,
    /// Gateway payment id this entry mirrors, when gateway-originated.
    pub payment_id: Option<String>,
    pub status: EntryStatus,
    /// Billing method the payer actually used, known at settlement.
    pub settled_method: Option<BillingType>,
    pub created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Category for event registration income.
    pub const CATEGORY_EVENT_REGISTRATIONS: &'static str = "event_registrations";

    /// Category for dues income.
    pub const CATEGORY_DUES: &'static str = "dues";

    /// A pending income entry correlated to a gateway charge.
    pub fn pending_income(
        description: impl Into<String>,
        amount: Money,
        entry_date: NaiveDate,
        category: impl Into<String>,
        payment_id: impl Into<String>,
    ) -> Self {
        Self {
            id: LedgerEntryId::new(),
            description: description.into(),
            kind: EntryKind::Income,
            amount,
            entry_date,
            category: category.into(),
            payment_id: Some(payment_id.into()),
            status: EntryStatus::Pending,
            settled_method: None,
            created_at: Utc::now(),
        }
    }
}
