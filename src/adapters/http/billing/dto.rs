//! DTOs for the subscription and treasury APIs.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::application::handlers::reporting::TreasuryReport;
use crate::domain::subscription::DuesSubscription;
use crate::ports::CategoryTotal;

/// Request body for activating a dues subscription.
#[derive(Debug, Deserialize)]
pub struct ActivateSubscriptionRequest {
    /// "BOLETO", "CREDIT_CARD", or "PIX".
    pub billing_type: String,
}

/// A subscription as returned by the API.
#[derive(Debug, Serialize)]
pub struct SubscriptionResponse {
    pub id: String,
    pub member_id: String,
    pub gateway_subscription_id: String,
    pub cycle: String,
    /// Installment value in cents.
    pub value: i64,
    pub next_due_date: NaiveDate,
    pub status: String,
}

impl From<DuesSubscription> for SubscriptionResponse {
    fn from(subscription: DuesSubscription) -> Self {
        Self {
            id: subscription.id.to_string(),
            member_id: subscription.member_id.to_string(),
            gateway_subscription_id: subscription.gateway_subscription_id,
            cycle: subscription.cycle.to_string(),
            value: subscription.value.cents(),
            next_due_date: subscription.next_due_date,
            status: subscription.status.to_string(),
        }
    }
}

/// Query parameters for the treasury report.
#[derive(Debug, Deserialize)]
pub struct TreasuryReportParams {
    pub from: NaiveDate,
    pub to: NaiveDate,
}

#[derive(Debug, Serialize)]
pub struct CollectionRateResponse {
    pub eligible_members: u64,
    pub paying_members: u64,
    pub pending_members: u64,
    pub rate: f64,
}

#[derive(Debug, Serialize)]
pub struct LedgerTotalsResponse {
    /// Amounts in cents.
    pub income: i64,
    pub expense: i64,
    pub net: i64,
}

#[derive(Debug, Serialize)]
pub struct CategoryTotalResponse {
    pub category: String,
    pub income: i64,
    pub expense: i64,
}

impl From<&CategoryTotal> for CategoryTotalResponse {
    fn from(total: &CategoryTotal) -> Self {
        Self {
            category: total.category.clone(),
            income: total.totals.income.cents(),
            expense: total.totals.expense.cents(),
        }
    }
}

/// Response body for the treasury report.
#[derive(Debug, Serialize)]
pub struct TreasuryReportResponse {
    pub collection: CollectionRateResponse,
    pub totals: LedgerTotalsResponse,
    pub by_category: Vec<CategoryTotalResponse>,
}

impl From<TreasuryReport> for TreasuryReportResponse {
    fn from(report: TreasuryReport) -> Self {
        Self {
            collection: CollectionRateResponse {
                eligible_members: report.collection.eligible_members,
                paying_members: report.collection.paying_members,
                pending_members: report.collection.pending_members(),
                rate: report.collection.rate(),
            },
            totals: LedgerTotalsResponse {
                income: report.totals.income.cents(),
                expense: report.totals.expense.cents(),
                net: report.totals.net().cents(),
            },
            by_category: report.by_category.iter().map(Into::into).collect(),
        }
    }
}
