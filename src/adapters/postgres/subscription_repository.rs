//! PostgreSQL implementation of SubscriptionRepository.
//!
//! The partial unique index `dues_subscriptions_one_active_per_member`
//! (on member_id where status = 'active') enforces the single-active
//! invariant; its violation is mapped to `AlreadySubscribed`.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, ErrorCode, MemberId, Money, SubscriptionId};
use crate::domain::subscription::{DuesSubscription, SubscriptionStatus};
use crate::ports::SubscriptionRepository;

use super::db_error;

const ONE_ACTIVE_CONSTRAINT: &str = "dues_subscriptions_one_active_per_member";

pub struct PostgresSubscriptionRepository {
    pool: PgPool,
}

impl PostgresSubscriptionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct SubscriptionRow {
    id: Uuid,
    member_id: Uuid,
    gateway_subscription_id: String,
    cycle: String,
    value_cents: i64,
    next_due_date: NaiveDate,
    status: String,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<SubscriptionRow> for DuesSubscription {
    type Error = DomainError;

    fn try_from(row: SubscriptionRow) -> Result<Self, Self::Error> {
        Ok(DuesSubscription {
            id: SubscriptionId::from_uuid(row.id),
            member_id: MemberId::from_uuid(row.member_id),
            gateway_subscription_id: row.gateway_subscription_id,
            cycle: row.cycle.parse()?,
            value: Money::from_cents(row.value_cents),
            next_due_date: row.next_due_date,
            status: row.status.parse()?,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl SubscriptionRepository for PostgresSubscriptionRepository {
    async fn insert(&self, subscription: &DuesSubscription) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO dues_subscriptions
                (id, member_id, gateway_subscription_id, cycle, value_cents,
                 next_due_date, status, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(subscription.id.as_uuid())
        .bind(subscription.member_id.as_uuid())
        .bind(&subscription.gateway_subscription_id)
        .bind(subscription.cycle.as_str())
        .bind(subscription.value.cents())
        .bind(subscription.next_due_date)
        .bind(subscription.status.as_str())
        .bind(subscription.created_at)
        .bind(subscription.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(db_err) = &e {
                if db_err.constraint() == Some(ONE_ACTIVE_CONSTRAINT) {
                    return DomainError::new(
                        ErrorCode::AlreadySubscribed,
                        "Member already has an active dues subscription",
                    );
                }
            }
            db_error("Failed to insert subscription", e)
        })?;

        Ok(())
    }

    async fn find_active_by_member(
        &self,
        member_id: &MemberId,
    ) -> Result<Option<DuesSubscription>, DomainError> {
        let row: Option<SubscriptionRow> = sqlx::query_as(
            r#"
            SELECT id, member_id, gateway_subscription_id, cycle, value_cents,
                   next_due_date, status, created_at, updated_at
            FROM dues_subscriptions
            WHERE member_id = $1 AND status = 'active'
            "#,
        )
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find active subscription", e))?;

        row.map(DuesSubscription::try_from).transpose()
    }

    async fn set_status(
        &self,
        id: &SubscriptionId,
        status: SubscriptionStatus,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE dues_subscriptions SET status = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id.as_uuid())
        .bind(status.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to set subscription status", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn advance_next_due(
        &self,
        id: &SubscriptionId,
        next_due_date: NaiveDate,
    ) -> Result<bool, DomainError> {
        // Forward only: a replayed older installment must not pull the due
        // date back.
        let result = sqlx::query(
            r#"
            UPDATE dues_subscriptions
            SET next_due_date = $2, updated_at = now()
            WHERE id = $1 AND next_due_date < $2
            "#,
        )
        .bind(id.as_uuid())
        .bind(next_due_date)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to advance next due date", e))?;

        Ok(result.rows_affected() == 1)
    }
}
