//! Registration API routes.

mod dto;
mod handlers;
mod routes;

pub use routes::routes;
