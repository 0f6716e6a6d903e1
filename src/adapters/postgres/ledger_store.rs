//! PostgreSQL implementation of LedgerStore.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::foundation::DomainError;
use crate::domain::ledger::LedgerEntry;
use crate::domain::payment::BillingType;
use crate::ports::LedgerStore;

use super::db_error;

pub struct PostgresLedgerStore {
    pool: PgPool,
}

impl PostgresLedgerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LedgerStore for PostgresLedgerStore {
    async fn insert(&self, entry: &LedgerEntry) -> Result<(), DomainError> {
        sqlx::query(
            r#"
            INSERT INTO ledger_entries
                (id, description, kind, amount_cents, entry_date, category,
                 payment_id, status, settled_method, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(entry.id.as_uuid())
        .bind(&entry.description)
        .bind(entry.kind.as_str())
        .bind(entry.amount.cents())
        .bind(entry.entry_date)
        .bind(&entry.category)
        .bind(&entry.payment_id)
        .bind(entry.status.as_str())
        .bind(entry.settled_method.map(|m| m.as_str()))
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to insert ledger entry", e))?;

        Ok(())
    }

    async fn settle_by_payment(
        &self,
        payment_id: &str,
        method: Option<BillingType>,
        settled_on: NaiveDate,
    ) -> Result<bool, DomainError> {
        // The entry date moves to the day money actually moved.
        let result = sqlx::query(
            r#"
            UPDATE ledger_entries
            SET status = 'settled',
                settled_method = COALESCE($2, settled_method),
                entry_date = $3
            WHERE payment_id = $1 AND status <> 'void'
            "#,
        )
        .bind(payment_id)
        .bind(method.map(|m| m.as_str()))
        .bind(settled_on)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to settle ledger entry", e))?;

        Ok(result.rows_affected() > 0)
    }

    async fn void_by_payment(&self, payment_id: &str) -> Result<bool, DomainError> {
        let result = sqlx::query(
            "UPDATE ledger_entries SET status = 'void' WHERE payment_id = $1",
        )
        .bind(payment_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to void ledger entry", e))?;

        Ok(result.rows_affected() > 0)
    }
}
