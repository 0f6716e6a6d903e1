//! Out-of-band reconciliation handlers.

mod sweep;

pub use sweep::{OrphanedCharge, ReconciliationSweepHandler, SweepReport};
