//! Event lifecycle handlers.

mod reconcile_status;

pub use reconcile_status::ReconcileEventStatusHandler;
