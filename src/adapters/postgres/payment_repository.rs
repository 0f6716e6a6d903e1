//! PostgreSQL implementation of PaymentRepository.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::payment::{PaymentRecord, PaymentStatus};
use crate::ports::PaymentRepository;

use super::db_error;

pub struct PostgresPaymentRepository {
    pool: PgPool,
}

impl PostgresPaymentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct PaymentRow {
    gateway_id: String,
    value_cents: i64,
    net_value_cents: Option<i64>,
    status: String,
    billing_type: String,
    due_date: NaiveDate,
    payment_date: Option<NaiveDate>,
    external_ref: Option<String>,
    created_at: DateTime<Utc>,
}

impl TryFrom<PaymentRow> for PaymentRecord {
    type Error = DomainError;

    fn try_from(row: PaymentRow) -> Result<Self, Self::Error> {
        Ok(PaymentRecord {
            gateway_id: row.gateway_id,
            value: Money::from_cents(row.value_cents),
            net_value: row.net_value_cents.map(Money::from_cents),
            status: row.status.parse()?,
            billing_type: row.billing_type.parse()?,
            due_date: row.due_date,
            payment_date: row.payment_date,
            external_ref: row.external_ref,
            created_at: row.created_at,
        })
    }
}

const PAYMENT_COLUMNS: &str = "gateway_id, value_cents, net_value_cents, status, billing_type, \
                               due_date, payment_date, external_ref, created_at";

#[async_trait]
impl PaymentRepository for PostgresPaymentRepository {
    async fn find(&self, gateway_id: &str) -> Result<Option<PaymentRecord>, DomainError> {
        let row: Option<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE gateway_id = $1",
            PAYMENT_COLUMNS
        ))
        .bind(gateway_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find payment", e))?;

        row.map(PaymentRecord::try_from).transpose()
    }

    async fn insert(&self, record: &PaymentRecord) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            INSERT INTO payments
                (gateway_id, value_cents, net_value_cents, status, billing_type,
                 due_date, payment_date, external_ref, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (gateway_id) DO NOTHING
            "#,
        )
        .bind(&record.gateway_id)
        .bind(record.value.cents())
        .bind(record.net_value.map(|v| v.cents()))
        .bind(record.status.as_str())
        .bind(record.billing_type.as_str())
        .bind(record.due_date)
        .bind(record.payment_date)
        .bind(&record.external_ref)
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert payment", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn advance_status(
        &self,
        gateway_id: &str,
        to: PaymentStatus,
        payment_date: Option<NaiveDate>,
        net_value: Option<Money>,
    ) -> Result<bool, DomainError> {
        // The forward-only check runs under a row lock so concurrent
        // deliveries serialize; a stale or repeated event becomes a no-op.
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let current: Option<(String,)> =
            sqlx::query_as("SELECT status FROM payments WHERE gateway_id = $1 FOR UPDATE")
                .bind(gateway_id)
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| db_error("Failed to lock payment", e))?;

        let Some((status,)) = current else {
            return Ok(false);
        };

        if !status.parse::<PaymentStatus>()?.can_advance_to(&to) {
            return Ok(false);
        }

        sqlx::query(
            r#"
            UPDATE payments
            SET status = $2,
                payment_date = COALESCE($3, payment_date),
                net_value_cents = COALESCE($4, net_value_cents)
            WHERE gateway_id = $1
            "#,
        )
        .bind(gateway_id)
        .bind(to.as_str())
        .bind(payment_date)
        .bind(net_value.map(|v| v.cents()))
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to advance payment status", e))?;

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit payment advance", e))?;

        Ok(true)
    }

    async fn find_stale_pending(
        &self,
        cutoff: NaiveDate,
    ) -> Result<Vec<PaymentRecord>, DomainError> {
        let rows: Vec<PaymentRow> = sqlx::query_as(&format!(
            "SELECT {} FROM payments WHERE status = 'PENDING' AND due_date <= $1 ORDER BY due_date",
            PAYMENT_COLUMNS
        ))
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to list stale pending payments", e))?;

        rows.into_iter().map(PaymentRecord::try_from).collect()
    }
}
