//! Garrison - Membership Community Platform Core
//!
//! This crate implements the payments-and-events core of the platform:
//! recurring dues subscriptions, paid event registrations with finite
//! capacity, and a financial ledger, reconciled against an external payment
//! gateway that reports state changes via asynchronous webhooks.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
