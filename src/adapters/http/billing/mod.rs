//! Subscription and treasury API routes.

mod dto;
mod handlers;
mod routes;

pub use routes::{member_routes, treasury_routes};
