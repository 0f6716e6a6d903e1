//! Event registration handlers.

mod register;
mod unregister;

pub use register::{
    PaymentCheckout, RegisterForEventCommand, RegisterForEventHandler, RegistrationResult,
};
pub use unregister::{UnregisterFromEventCommand, UnregisterFromEventHandler};
