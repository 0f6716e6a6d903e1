//! PostgreSQL implementation of WebhookEventRepository.
//!
//! The claim insert races on the `webhook_events` primary key
//! (`ON CONFLICT DO NOTHING`): of two concurrent deliveries exactly one
//! inserts, the other reads the stored row's state.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::ports::{ClaimOutcome, StoredNotification, WebhookEventRepository};

use super::db_error;

pub struct PostgresWebhookEventRepository {
    pool: PgPool,
}

impl PostgresWebhookEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct WebhookEventRow {
    event_id: String,
    event_type: String,
    payload: serde_json::Value,
    processed: bool,
    received_at: DateTime<Utc>,
    processed_at: Option<DateTime<Utc>>,
    last_error: Option<String>,
}

impl From<WebhookEventRow> for StoredNotification {
    fn from(row: WebhookEventRow) -> Self {
        StoredNotification {
            event_id: row.event_id,
            event_type: row.event_type,
            payload: row.payload,
            processed: row.processed,
            received_at: row.received_at,
            processed_at: row.processed_at,
            last_error: row.last_error,
        }
    }
}

#[async_trait]
impl WebhookEventRepository for PostgresWebhookEventRepository {
    async fn claim(
        &self,
        event_id: &str,
        event_type: &str,
        payload: serde_json::Value,
    ) -> Result<ClaimOutcome, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO webhook_events (event_id, event_type, payload, processed, received_at)
            VALUES ($1, $2, $3, false, now())
            ON CONFLICT (event_id) DO NOTHING
            "#,
        )
        .bind(event_id)
        .bind(event_type)
        .bind(&payload)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to store webhook event", e))?;

        if result.rows_affected() == 1 {
            return Ok(ClaimOutcome::Claimed);
        }

        let processed: Option<(bool,)> =
            sqlx::query_as("SELECT processed FROM webhook_events WHERE event_id = $1")
                .bind(event_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| db_error("Failed to read webhook event", e))?;

        match processed {
            Some((true,)) => Ok(ClaimOutcome::AlreadyProcessed),
            // Row present but unprocessed, or deleted by retention between
            // the two statements: dispatch again, it is idempotent.
            _ => Ok(ClaimOutcome::Redelivery),
        }
    }

    async fn mark_processed(&self, event_id: &str) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            UPDATE webhook_events
            SET processed = true, processed_at = now(), last_error = NULL
            WHERE event_id = $1
            "#,
        )
        .bind(event_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark webhook event processed", e))?;

        Ok(())
    }

    async fn record_failure(&self, event_id: &str, error: &str) -> Result<(), DomainError> {
        sqlx::query("UPDATE webhook_events SET last_error = $2 WHERE event_id = $1")
            .bind(event_id)
            .bind(error)
            .execute(&self.pool)
            .await
            .map_err(|e| db_error("Failed to record webhook failure", e))?;

        Ok(())
    }

    async fn find_unprocessed(
        &self,
        older_than: DateTime<Utc>,
        limit: u32,
    ) -> Result<Vec<StoredNotification>, DomainError> {
        let rows: Vec<WebhookEventRow> = sqlx::query_as(
            r#"
            SELECT event_id, event_type, payload, processed, received_at, processed_at, last_error
            FROM webhook_events
            WHERE processed = false AND received_at < $1
            ORDER BY received_at
            LIMIT $2
            "#,
        )
        .bind(older_than)
        .bind(i64::from(limit))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list unprocessed webhook events", e))?;

        Ok(rows.into_iter().map(StoredNotification::from).collect())
    }
}
