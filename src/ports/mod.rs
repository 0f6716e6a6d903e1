//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between the
//! domain and the outside world. Adapters implement these ports.
//!
//! ## External collaborators
//!
//! - `PaymentGateway` - the payment provider (customers, subscriptions,
//!   one-off charges)
//! - The store ports below, all backed by one relational database with
//!   transactions
//!
//! ## Store ports
//!
//! - `MemberRepository` / `EventRepository` / `SubscriptionRepository` /
//!   `PaymentRepository` / `LedgerStore` - per-entity persistence
//! - `RegistrationStore` - registrations, with the capacity-checked atomic
//!   insert the concurrency model relies on
//! - `WebhookEventRepository` - idempotency ledger for inbound notifications
//! - `TreasuryReader` - read model for admin reporting

mod event_repository;
mod ledger_store;
mod member_repository;
mod payment_gateway;
mod payment_repository;
mod registration_store;
mod subscription_repository;
mod treasury_reader;
mod webhook_event_repository;

pub use event_repository::EventRepository;
pub use ledger_store::LedgerStore;
pub use member_repository::MemberRepository;
pub use payment_gateway::{
    CustomerRef, GatewayCharge, GatewayChargeSummary, GatewayError, GatewayErrorCode,
    GatewaySubscriptionRef, NewCustomer, NewGatewayPayment, NewGatewaySubscription, PaymentGateway,
};
pub use payment_repository::PaymentRepository;
pub use registration_store::{NewPaidRegistration, RegistrationDenial, RegistrationInsert, RegistrationStore};
pub use subscription_repository::SubscriptionRepository;
pub use treasury_reader::{CategoryTotal, CollectionRate, LedgerTotals, TreasuryReader};
pub use webhook_event_repository::{ClaimOutcome, StoredNotification, WebhookEventRepository};
