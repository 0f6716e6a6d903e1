//! PostgreSQL implementations of the store ports.
//!
//! All adapters share one `PgPool`. Queries are runtime-bound; enum columns
//! are stored as their canonical strings and parsed through the domain
//! `FromStr` implementations.

mod event_repository;
mod ledger_store;
mod member_repository;
mod payment_repository;
mod registration_store;
mod subscription_repository;
mod treasury_reader;
mod webhook_event_repository;

pub use event_repository::PostgresEventRepository;
pub use ledger_store::PostgresLedgerStore;
pub use member_repository::PostgresMemberRepository;
pub use payment_repository::PostgresPaymentRepository;
pub use registration_store::PostgresRegistrationStore;
pub use subscription_repository::PostgresSubscriptionRepository;
pub use treasury_reader::PostgresTreasuryReader;
pub use webhook_event_repository::PostgresWebhookEventRepository;

use crate::domain::foundation::DomainError;

/// Maps an sqlx error into the domain database error.
pub(crate) fn db_error(context: &str, err: sqlx::Error) -> DomainError {
    DomainError::database(format!("{}: {}", context, err))
}
