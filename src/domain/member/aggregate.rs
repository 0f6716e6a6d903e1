//! Member aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Rank;
use crate::domain::foundation::MemberId;

/// A member of the community.
///
/// The `gateway_customer_id` mirrors the customer created at the payment
/// gateway. It is populated at most once, immediately after the first
/// successful `create_customer` call, so a retry after a partial failure
/// reuses the existing customer instead of creating a duplicate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Member {
    pub id: MemberId,
    pub full_name: String,
    pub email: String,
    pub rank: Rank,
    pub gateway_customer_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Member {
    /// Creates a new member at the entry rank.
    pub fn new(id: MemberId, full_name: impl Into<String>, email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id,
            full_name: full_name.into(),
            email: email.into(),
            rank: Rank::Aluno,
            gateway_customer_id: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Returns true if this member is billed monthly dues.
    pub fn is_payment_eligible(&self) -> bool {
        self.rank.is_payment_eligible()
    }
}
