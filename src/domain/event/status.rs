//! Event lifecycle status state machine.
//!
//! Status only advances forward through the lifecycle; `Cancelled` is the
//! one escape hatch, reachable from any non-terminal state by explicit
//! admin action (never by date-driven reconciliation).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::{DomainError, ErrorCode};

/// Lifecycle status of a community event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventStatus {
    /// Being organized; not yet visible.
    Planning,

    /// Announced; registrations accepted.
    Published,

    /// Registration period formally open.
    RegistrationOpen,

    /// Less than a week until start; last call for registrations.
    FinalDays,

    /// Currently running.
    Active,

    /// Past its end date.
    Completed,

    /// Explicitly cancelled by an admin.
    Cancelled,
}

impl EventStatus {
    /// Returns true if new registrations are accepted in this status.
    pub fn accepts_registrations(&self) -> bool {
        matches!(
            self,
            EventStatus::Published | EventStatus::RegistrationOpen | EventStatus::FinalDays
        )
    }

    /// Returns true for statuses the lifecycle never leaves.
    pub fn is_terminal(&self) -> bool {
        matches!(self, EventStatus::Completed | EventStatus::Cancelled)
    }

    /// Position in the forward lifecycle. `Cancelled` sits outside the
    /// ordering and is handled separately.
    fn order(&self) -> u8 {
        match self {
            EventStatus::Planning => 0,
            EventStatus::Published => 1,
            EventStatus::RegistrationOpen => 2,
            EventStatus::FinalDays => 3,
            EventStatus::Active => 4,
            EventStatus::Completed => 5,
            EventStatus::Cancelled => 6,
        }
    }

    /// Returns true if the lifecycle may move from `self` to `target`.
    ///
    /// Forward moves only, except `Cancelled`, which is reachable from any
    /// non-terminal state.
    pub fn can_transition_to(&self, target: &EventStatus) -> bool {
        if self == target {
            return false;
        }
        if *target == EventStatus::Cancelled {
            return !self.is_terminal();
        }
        !self.is_terminal() && self.order() < target.order()
    }

    /// Canonical storage string for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            EventStatus::Planning => "planning",
            EventStatus::Published => "published",
            EventStatus::RegistrationOpen => "registration_open",
            EventStatus::FinalDays => "final_days",
            EventStatus::Active => "active",
            EventStatus::Completed => "completed",
            EventStatus::Cancelled => "cancelled",
        }
    }

    /// All statuses, in lifecycle order.
    pub fn all() -> [EventStatus; 7] {
        [
            EventStatus::Planning,
            EventStatus::Published,
            EventStatus::RegistrationOpen,
            EventStatus::FinalDays,
            EventStatus::Active,
            EventStatus::Completed,
            EventStatus::Cancelled,
        ]
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for EventStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "planning" => Ok(EventStatus::Planning),
            "published" => Ok(EventStatus::Published),
            "registration_open" => Ok(EventStatus::RegistrationOpen),
            "final_days" => Ok(EventStatus::FinalDays),
            "active" => Ok(EventStatus::Active),
            "completed" => Ok(EventStatus::Completed),
            "cancelled" => Ok(EventStatus::Cancelled),
            other => Err(DomainError::new(
                ErrorCode::InvalidFormat,
                format!("Unknown event status: {}", other),
            )),
        }
    }
}
