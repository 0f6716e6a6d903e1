//! Dues subscription handlers.

mod activate;
mod cancel;

pub use activate::{ActivateDuesSubscriptionCommand, ActivateDuesSubscriptionHandler};
pub use cancel::{CancelDuesSubscriptionCommand, CancelDuesSubscriptionHandler};
