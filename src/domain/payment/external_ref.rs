//! External references.
//!
//! An opaque string embedded in every gateway charge, used to correlate the
//! charge back to the local entity that created it. Two forms exist:
//!
//! - `event:<event_id>:<member_id>` - a one-off event registration charge
//! - `dues:<member_id>` - a recurring dues installment

use std::fmt;

use crate::domain::foundation::{EventId, MemberId};

/// Typed correlation reference carried in a gateway charge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExternalRef {
    /// Charge for an event registration.
    Event { event_id: EventId, member_id: MemberId },

    /// Installment of a member's dues subscription.
    Dues { member_id: MemberId },
}

impl ExternalRef {
    pub fn for_event(event_id: EventId, member_id: MemberId) -> Self {
        ExternalRef::Event { event_id, member_id }
    }

    pub fn for_dues(member_id: MemberId) -> Self {
        ExternalRef::Dues { member_id }
    }

    /// Prefix of all event-registration references; the reconciliation
    /// sweep lists gateway charges by this prefix.
    pub const EVENT_PREFIX: &'static str = "event:";

    /// Parses a reference string.
    ///
    /// Returns `None` for anything unrecognized: charges created outside
    /// this system carry foreign references and are simply not correlated.
    pub fn parse(s: &str) -> Option<ExternalRef> {
        if let Some(rest) = s.strip_prefix("event:") {
            let (event_part, member_part) = rest.split_once(':')?;
            let event_id = event_part.parse().ok()?;
            let member_id = member_part.parse().ok()?;
            return Some(ExternalRef::Event { event_id, member_id });
        }
        if let Some(rest) = s.strip_prefix("dues:") {
            let member_id = rest.parse().ok()?;
            return Some(ExternalRef::Dues { member_id });
        }
        None
    }
}

impl fmt::Display for ExternalRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExternalRef::Event { event_id, member_id } => {
                write!(f, "event:{}:{}", event_id, member_id)
            }
            ExternalRef::Dues { member_id } => write!(f, "dues:{}", member_id),
        }
    }
}
