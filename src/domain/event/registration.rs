//! Event registrations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, MemberId, Money, RegistrationId};

/// Payment state of a single registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RegistrationPaymentStatus {
    /// A gateway charge exists; confirmation has not arrived yet.
    Pending,

    /// The gateway confirmed payment.
    Paid,

    /// The event was free; no charge was ever created.
    Free,

    /// The charge was cancelled; the seat has been released.
    Cancelled,
}

impl RegistrationPaymentStatus {
    /// Returns true while the registration holds a seat.
    pub fn holds_seat(&self) -> bool {
        !matches!(self, RegistrationPaymentStatus::Cancelled)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            RegistrationPaymentStatus::Pending => "pending",
            RegistrationPaymentStatus::Paid => "paid",
            RegistrationPaymentStatus::Free => "free",
            RegistrationPaymentStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for RegistrationPaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for RegistrationPaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(RegistrationPaymentStatus::Pending),
            "paid" => Ok(RegistrationPaymentStatus::Paid),
            "free" => Ok(RegistrationPaymentStatus::Free),
            "cancelled" => Ok(RegistrationPaymentStatus::Cancelled),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown registration payment status: {}", other),
            )),
        }
    }
}

/// A member's registration for an event. Unique per (event, member) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRegistration {
    pub id: RegistrationId,
    pub event_id: EventId,
    pub member_id: MemberId,
    pub payment_status: RegistrationPaymentStatus,
    pub gateway_payment_id: Option<String>,
    pub amount_paid: Money,
    pub created_at: DateTime<Utc>,
}

impl EventRegistration {
    /// A registration for a free event.
    pub fn free(event_id: EventId, member_id: MemberId) -> Self {
        Self {
            id: RegistrationId::new(),
            event_id,
            member_id,
            payment_status: RegistrationPaymentStatus::Free,
            gateway_payment_id: None,
            amount_paid: Money::ZERO,
            created_at: Utc::now(),
        }
    }

    /// A registration awaiting confirmation of the given gateway charge.
    pub fn pending(event_id: EventId, member_id: MemberId, gateway_payment_id: String) -> Self {
        Self {
            id: RegistrationId::new(),
            event_id,
            member_id,
            payment_status: RegistrationPaymentStatus::Pending,
            gateway_payment_id: Some(gateway_payment_id),
            amount_paid: Money::ZERO,
            created_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_registration_holds_seat_with_no_charge() {
        let reg = EventRegistration::free(EventId::new(), MemberId::new());
        assert_eq!(reg.payment_status, RegistrationPaymentStatus::Free);
        assert!(reg.payment_status.holds_seat());
        assert!(reg.gateway_payment_id.is_none());
    }

    #[test]
    fn pending_registration_references_its_charge() {
        let reg = EventRegistration::pending(EventId::new(), MemberId::new(), "pay_1".to_string());
        assert_eq!(reg.payment_status, RegistrationPaymentStatus::Pending);
        assert_eq!(reg.gateway_payment_id.as_deref(), Some("pay_1"));
    }

    #[test]
    fn only_cancelled_releases_the_seat() {
        assert!(RegistrationPaymentStatus::Pending.holds_seat());
        assert!(RegistrationPaymentStatus::Paid.holds_seat());
        assert!(RegistrationPaymentStatus::Free.holds_seat());
        assert!(!RegistrationPaymentStatus::Cancelled.holds_seat());
    }

    #[test]
    fn payment_status_roundtrips_through_storage_string() {
        for status in [
            RegistrationPaymentStatus::Pending,
            RegistrationPaymentStatus::Paid,
            RegistrationPaymentStatus::Free,
            RegistrationPaymentStatus::Cancelled,
        ] {
            let parsed: RegistrationPaymentStatus = status.as_str().parse().unwrap();
            assert_eq!(status, parsed);
        }
    }
}
