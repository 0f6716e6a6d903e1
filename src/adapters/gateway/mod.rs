//! Payment gateway adapters.
//!
//! - `http` - the real REST adapter (reqwest, bounded timeouts)
//! - `mock` - deterministic in-memory gateway for tests and local runs
//! - `wire` - serde DTOs matching the provider's JSON

mod http;
mod mock;
mod wire;

pub use http::{GatewayConfig, HttpPaymentGateway};
pub use mock::MockPaymentGateway;
