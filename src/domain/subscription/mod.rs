//! Dues subscription domain module.
//!
//! Each member holds at most one *active* subscription at a time; the
//! storage layer enforces this with a partial unique index.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Money, SubscriptionId};
use crate::domain::payment::BillingCycle;

/// Status of a dues subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionStatus {
    /// Billing at the gateway; installments arrive on schedule.
    Active,

    /// Cancelled by the member (gateway cancellation confirmed first).
    Cancelled,

    /// The gateway reported the subscription lapsed (overdue installment).
    Expired,
}

impl SubscriptionStatus {
    pub fn is_active(&self) -> bool {
        matches!(self, SubscriptionStatus::Active)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Cancelled => "cancelled",
            SubscriptionStatus::Expired => "expired",
        }
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for SubscriptionStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(SubscriptionStatus::Active),
            "cancelled" => Ok(SubscriptionStatus::Cancelled),
            "expired" => Ok(SubscriptionStatus::Expired),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown subscription status: {}", other),
            )),
        }
    }
}

/// A member's recurring dues subscription.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DuesSubscription {
    pub id: SubscriptionId,
    pub member_id: MemberId,
    pub gateway_subscription_id: String,
    pub cycle: BillingCycle,
    pub value: Money,
    pub next_due_date: NaiveDate,
    pub status: SubscriptionStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl DuesSubscription {
    /// A newly-activated subscription; called only after the gateway
    /// subscription exists.
    pub fn activate(
        member_id: MemberId,
        gateway_subscription_id: impl Into<String>,
        cycle: BillingCycle,
        value: Money,
        next_due_date: NaiveDate,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: SubscriptionId::new(),
            member_id,
            gateway_subscription_id: gateway_subscription_id.into(),
            cycle,
            value,
            next_due_date,
            status: SubscriptionStatus::Active,
            created_at: now,
            updated_at: now,
        }
    }

    /// The due date one cycle after `from`, clamping the day of month when
    /// the target month is shorter.
    pub fn due_date_after(&self, from: NaiveDate) -> NaiveDate {
        add_months(from, self.cycle.months())
    }
}

fn add_months(date: NaiveDate, months: u32) -> NaiveDate {
    let zero_based = date.month0() + months;
    let year = date.year() + (zero_based / 12) as i32;
    let month = zero_based % 12 + 1;
    let day = date.day();
    // Clamp to the last valid day of the target month.
    (1..=day)
        .rev()
        .find_map(|d| NaiveDate::from_ymd_opt(year, month, d))
        .unwrap_or(date)
}
