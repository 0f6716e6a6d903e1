//! PostgreSQL implementation of EventRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::event::{CommunityEvent, EventStatus};
use crate::domain::foundation::{DomainError, EventId, Money};
use crate::ports::EventRepository;

use super::db_error;

pub struct PostgresEventRepository {
    pool: PgPool,
}

impl PostgresEventRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(super) struct EventRow {
    id: Uuid,
    title: String,
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
    max_participants: i32,
    registered_participants: i32,
    price_cents: i64,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<EventRow> for CommunityEvent {
    type Error = DomainError;

    fn try_from(row: EventRow) -> Result<Self, Self::Error> {
        Ok(CommunityEvent {
            id: EventId::from_uuid(row.id),
            title: row.title,
            starts_at: row.starts_at,
            ends_at: row.ends_at,
            max_participants: row.max_participants.max(0) as u32,
            registered_participants: row.registered_participants.max(0) as u32,
            price: Money::from_cents(row.price_cents),
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

const EVENT_COLUMNS: &str = "id, title, starts_at, ends_at, max_participants, \
                             registered_participants, price_cents, status, created_at, updated_at";

#[async_trait]
impl EventRepository for PostgresEventRepository {
    async fn find_by_id(&self, id: &EventId) -> Result<Option<CommunityEvent>, DomainError> {
        let row: Option<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE id = $1",
            EVENT_COLUMNS
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find event", e))?;

        row.map(CommunityEvent::try_from).transpose()
    }

    async fn update_status(
        &self,
        id: &EventId,
        from: EventStatus,
        to: EventStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE events
            SET status = $3, updated_at = now()
            WHERE id = $1 AND status = $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(from.as_str())
        .bind(to.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to update event status", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn list_reconcilable(&self) -> Result<Vec<CommunityEvent>, DomainError> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!(
            "SELECT {} FROM events WHERE status NOT IN ('completed', 'cancelled') ORDER BY starts_at",
            EVENT_COLUMNS
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list reconcilable events", e))?;

        rows.into_iter().map(CommunityEvent::try_from).collect()
    }
}
