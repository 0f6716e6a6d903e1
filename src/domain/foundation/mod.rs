//! Foundation types shared across the domain.
//!
//! - `errors` - `DomainError` and the error-code taxonomy
//! - `ids` - strongly-typed identifier value objects
//! - `money` - integer-cents monetary amounts

mod errors;
mod ids;
mod money;

pub use errors::{DomainError, ErrorCode};
pub use ids::{EventId, LedgerEntryId, MemberId, RegistrationId, SubscriptionId};
pub use money::Money;
