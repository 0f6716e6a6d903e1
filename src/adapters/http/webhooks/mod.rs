//! Gateway webhook routes.

mod handlers;
mod routes;

pub use routes::routes;
