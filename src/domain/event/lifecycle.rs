//! Date-driven event status reconciliation.
//!
//! `reconcile_status` is a pure, idempotent function of the current status,
//! the event schedule, and a caller-supplied clock. It never produces
//! `Cancelled` (that is an explicit admin action) and never moves a terminal
//! status. The caller persists the result only when it differs from the
//! stored status, under a compare-and-set write, so a concurrent admin
//! cancellation is never clobbered.

use chrono::{DateTime, Utc};

use super::EventStatus;

/// Number of days before the start date at which a `RegistrationOpen` event
/// enters its last-call window.
pub const FINAL_DAYS_WINDOW: i64 = 7;

/// Computes the status an event should hold at `now`.
///
/// Transition rules, evaluated in precedence order:
/// 1. Past the end date and not yet completed/cancelled: `Completed`.
/// 2. Inside the [start, end] window and not active/cancelled: `Active`.
/// 3. `RegistrationOpen` with 0 < days until start <= 7: `FinalDays`.
/// 4. Otherwise unchanged.
pub fn reconcile_status(
    status: EventStatus,
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    now: DateTime<Utc>,
) -> EventStatus {
    if now > end && !matches!(status, EventStatus::Completed | EventStatus::Cancelled) {
        return EventStatus::Completed;
    }

    if start <= now && now <= end && !matches!(status, EventStatus::Active | EventStatus::Cancelled)
    {
        return EventStatus::Active;
    }

    if status == EventStatus::RegistrationOpen {
        let days_until_start = (start - now).num_days();
        if (1..=FINAL_DAYS_WINDOW).contains(&days_until_start) {
            return EventStatus::FinalDays;
        }
    }

    status
}
