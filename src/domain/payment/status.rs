//! Payment status state machine.
//!
//! A charge only ever moves forward: PENDING -> CONFIRMED -> RECEIVED on the
//! success path, or PENDING/CONFIRMED -> OVERDUE | CANCELLED on failure.
//! There is no path back to PENDING, so applying the same terminal webhook
//! twice is a no-op rather than an error.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Status of a gateway charge as mirrored locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PaymentStatus {
    /// Charge exists; the payer has not acted yet.
    Pending,

    /// The gateway confirmed the payment; funds not yet settled.
    Confirmed,

    /// Funds settled. Terminal success.
    Received,

    /// The due date passed without payment. Terminal failure.
    Overdue,

    /// The charge was cancelled. Terminal failure.
    Cancelled,
}

impl PaymentStatus {
    /// Position along the success path; terminal failures sit outside it.
    fn success_order(&self) -> Option<u8> {
        match self {
            PaymentStatus::Pending => Some(0),
            PaymentStatus::Confirmed => Some(1),
            PaymentStatus::Received => Some(2),
            PaymentStatus::Overdue | PaymentStatus::Cancelled => None,
        }
    }

    /// Returns true for statuses a charge never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PaymentStatus::Received | PaymentStatus::Overdue | PaymentStatus::Cancelled
        )
    }

    /// Returns true once funds are settled.
    pub fn is_settled(&self) -> bool {
        matches!(self, PaymentStatus::Received)
    }

    /// Returns true if the status may advance from `self` to `target`.
    ///
    /// Re-asserting the current status is not an advance; callers treat it
    /// as a no-op.
    pub fn can_advance_to(&self, target: &PaymentStatus) -> bool {
        if self == target {
            return false;
        }
        match (self.success_order(), target.success_order()) {
            // Forward along the success path only.
            (Some(from), Some(to)) => from < to,
            // Failure is reachable while not settled.
            (Some(_), None) => !self.is_settled(),
            // Terminal failures never move.
            (None, _) => false,
        }
    }

    /// Canonical storage string (matches the gateway wire format).
    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "PENDING",
            PaymentStatus::Confirmed => "CONFIRMED",
            PaymentStatus::Received => "RECEIVED",
            PaymentStatus::Overdue => "OVERDUE",
            PaymentStatus::Cancelled => "CANCELLED",
        }
    }

    /// All statuses.
    pub fn all() -> [PaymentStatus; 5] {
        [
            PaymentStatus::Pending,
            PaymentStatus::Confirmed,
            PaymentStatus::Received,
            PaymentStatus::Overdue,
            PaymentStatus::Cancelled,
        ]
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for PaymentStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(PaymentStatus::Pending),
            "CONFIRMED" => Ok(PaymentStatus::Confirmed),
            "RECEIVED" => Ok(PaymentStatus::Received),
            "OVERDUE" => Ok(PaymentStatus::Overdue),
            "CANCELLED" => Ok(PaymentStatus::Cancelled),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown payment status: {}", other),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_path_moves_forward() {
        assert!(PaymentStatus::Pending.can_advance_to(&PaymentStatus::Confirmed));
        assert!(PaymentStatus::Pending.can_advance_to(&PaymentStatus::Received));
        assert!(PaymentStatus::Confirmed.can_advance_to(&PaymentStatus::Received));
    }

    #[test]
    fn no_path_back_to_pending() {
        for status in [
            PaymentStatus::Confirmed,
            PaymentStatus::Received,
            PaymentStatus::Overdue,
            PaymentStatus::Cancelled,
        ] {
            assert!(!status.can_advance_to(&PaymentStatus::Pending));
        }
    }

    #[test]
    fn failure_is_reachable_until_settled() {
        assert!(PaymentStatus::Pending.can_advance_to(&PaymentStatus::Overdue));
        assert!(PaymentStatus::Pending.can_advance_to(&PaymentStatus::Cancelled));
        assert!(PaymentStatus::Confirmed.can_advance_to(&PaymentStatus::Cancelled));

        assert!(!PaymentStatus::Received.can_advance_to(&PaymentStatus::Overdue));
        assert!(!PaymentStatus::Received.can_advance_to(&PaymentStatus::Cancelled));
    }

    #[test]
    fn terminal_failures_never_move() {
        for target in PaymentStatus::all() {
            assert!(!PaymentStatus::Overdue.can_advance_to(&target));
            assert!(!PaymentStatus::Cancelled.can_advance_to(&target));
        }
    }

    #[test]
    fn reasserting_current_status_is_not_an_advance() {
        for status in PaymentStatus::all() {
            assert!(!status.can_advance_to(&status));
        }
    }

    #[test]
    fn status_roundtrips_through_storage_string() {
        for status in PaymentStatus::all() {
            let parsed: PaymentStatus = status.as_str().parse().unwrap();
            assert_eq!(status, parsed);
        }
    }
}
