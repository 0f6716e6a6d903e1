//! Garrison server binary.
//!
//! Wires the Postgres adapters, the gateway REST adapter, and the axum
//! router together, and runs the two background loops: the event lifecycle
//! tick and the reconciliation sweep.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sqlx::postgres::PgPoolOptions;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use garrison::adapters::gateway::{GatewayConfig, HttpPaymentGateway};
use garrison::adapters::http::{api_router, AppState};
use garrison::adapters::postgres::{
    PostgresEventRepository, PostgresLedgerStore, PostgresMemberRepository,
    PostgresPaymentRepository, PostgresRegistrationStore, PostgresSubscriptionRepository,
    PostgresTreasuryReader, PostgresWebhookEventRepository,
};
use garrison::config::AppConfig;
use garrison::domain::foundation::Money;
use garrison::domain::webhook::NotificationVerifier;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .json()
        .init();

    let config = AppConfig::load()?;
    config.validate()?;

    let pool = PgPoolOptions::new()
        .min_connections(config.database.min_connections)
        .max_connections(config.database.max_connections)
        .acquire_timeout(config.database.acquire_timeout())
        .connect(&config.database.url)
        .await?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations").run(&pool).await?;
        tracing::info!("database migrations applied");
    }

    let gateway = Arc::new(HttpPaymentGateway::new(GatewayConfig::new(
        config.gateway.api_key.clone(),
        config.gateway.base_url.clone(),
        config.gateway.request_timeout(),
    )));

    let state = AppState {
        members: Arc::new(PostgresMemberRepository::new(pool.clone())),
        events: Arc::new(PostgresEventRepository::new(pool.clone())),
        registrations: Arc::new(PostgresRegistrationStore::new(pool.clone())),
        subscriptions: Arc::new(PostgresSubscriptionRepository::new(pool.clone())),
        payments: Arc::new(PostgresPaymentRepository::new(pool.clone())),
        ledger: Arc::new(PostgresLedgerStore::new(pool.clone())),
        webhook_events: Arc::new(PostgresWebhookEventRepository::new(pool.clone())),
        treasury: Arc::new(PostgresTreasuryReader::new(pool.clone())),
        gateway,
        webhook_verifier: Arc::new(NotificationVerifier::new(
            config.gateway.webhook_secret.clone(),
        )),
        dues_value: Money::from_cents(config.billing.dues_value_cents),
        webhook_retry_grace: chrono::Duration::seconds(
            config.billing.webhook_retry_grace_secs as i64,
        ),
        stale_pending_after_days: config.billing.stale_pending_after_days,
    };

    spawn_lifecycle_tick(state.clone(), config.billing.lifecycle_interval_secs);
    spawn_reconciliation_sweep(state.clone(), config.billing.sweep_interval_secs);

    let app = api_router()
        .layer(TraceLayer::new_for_http())
        .layer(TimeoutLayer::new(Duration::from_secs(30)))
        .with_state(state);
    let app = axum::Router::new().nest("/api", app);

    let addr = config.server.socket_addr();
    tracing::info!(%addr, "garrison listening");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

/// Periodically advances event statuses so readers do not depend on the
/// on-read reconcile alone.
fn spawn_lifecycle_tick(state: AppState, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match state.reconcile_handler().reconcile_all(Utc::now()).await {
                Ok(0) => {}
                Ok(changed) => tracing::info!(changed, "lifecycle tick advanced events"),
                Err(err) => tracing::error!(error = %err, "lifecycle tick failed"),
            }
        }
    });
}

/// Periodically retries unprocessed webhooks and reports inconsistencies.
fn spawn_reconciliation_sweep(state: AppState, interval_secs: u64) {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        loop {
            interval.tick().await;
            match state.sweep_handler().handle(Utc::now()).await {
                Ok(report) => {
                    if report.retried > 0 || !report.orphaned_charges.is_empty() {
                        tracing::info!(
                            retried = report.retried,
                            recovered = report.recovered,
                            orphaned = report.orphaned_charges.len(),
                            stale = report.stale_pending.len(),
                            "reconciliation sweep completed"
                        );
                    }
                }
                Err(err) => tracing::error!(error = %err, "reconciliation sweep failed"),
            }
        }
    });
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to listen for shutdown signal");
    }
    tracing::info!("shutdown signal received");
}
