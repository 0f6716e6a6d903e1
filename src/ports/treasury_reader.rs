//! TreasuryReader port - read model for admin reporting.
//!
//! Derived, read-only views over members, subscriptions, and the ledger.

use async_trait::async_trait;
use chrono::NaiveDate;

use crate::domain::foundation::{DomainError, Money};

/// Dues collection across the eligible membership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CollectionRate {
    /// Members whose rank makes them payment-eligible.
    pub eligible_members: u64,

    /// Eligible members with an active dues subscription.
    pub paying_members: u64,
}

impl CollectionRate {
    /// Paying eligible members over total eligible members; 0.0 when no
    /// member is eligible.
    pub fn rate(&self) -> f64 {
        if self.eligible_members == 0 {
            return 0.0;
        }
        self.paying_members as f64 / self.eligible_members as f64
    }

    /// Eligible members not yet paying.
    pub fn pending_members(&self) -> u64 {
        self.eligible_members.saturating_sub(self.paying_members)
    }
}

/// Settled ledger totals over a date range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedgerTotals {
    pub income: Money,
    pub expense: Money,
}

impl LedgerTotals {
    pub fn net(&self) -> Money {
        self.income - self.expense
    }
}

/// Per-category ledger totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryTotal {
    pub category: String,
    pub totals: LedgerTotals,
}

/// Port for the reporting read model.
#[async_trait]
pub trait TreasuryReader: Send + Sync {
    async fn collection_rate(&self) -> Result<CollectionRate, DomainError>;

    async fn ledger_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<LedgerTotals, DomainError>;

    async fn ledger_totals_by_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, DomainError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_zero_with_no_eligible_members() {
        let rate = CollectionRate::default();
        assert_eq!(rate.rate(), 0.0);
    }

    #[test]
    fn rate_is_paying_over_eligible() {
        let rate = CollectionRate {
            eligible_members: 40,
            paying_members: 30,
        };
        assert!((rate.rate() - 0.75).abs() < f64::EPSILON);
        assert_eq!(rate.pending_members(), 10);
    }

    #[test]
    fn net_subtracts_expense_from_income() {
        let totals = LedgerTotals {
            income: Money::from_cents(10_000),
            expense: Money::from_cents(3_500),
        };
        assert_eq!(totals.net(), Money::from_cents(6_500));
    }
}
