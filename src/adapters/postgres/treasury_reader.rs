//! PostgreSQL implementation of TreasuryReader.
//!
//! Only settled ledger entries count toward totals; pending income is not
//! money yet and void entries never were.

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::domain::foundation::{DomainError, Money};
use crate::domain::member::Rank;
use crate::ports::{CategoryTotal, CollectionRate, LedgerTotals, TreasuryReader};

use super::db_error;

pub struct PostgresTreasuryReader {
    pool: PgPool,
}

impl PostgresTreasuryReader {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct TotalsRow {
    income_cents: Option<i64>,
    expense_cents: Option<i64>,
}

impl From<TotalsRow> for LedgerTotals {
    fn from(row: TotalsRow) -> Self {
        LedgerTotals {
            income: Money::from_cents(row.income_cents.unwrap_or(0)),
            expense: Money::from_cents(row.expense_cents.unwrap_or(0)),
        }
    }
}

#[async_trait]
impl TreasuryReader for PostgresTreasuryReader {
    async fn collection_rate(&self) -> Result<CollectionRate, DomainError> {
        let row: (i64, i64) = sqlx::query_as(
            r#"
            SELECT
                COUNT(*) AS eligible,
                COUNT(s.id) AS paying
            FROM members m
            LEFT JOIN dues_subscriptions s
                   ON s.member_id = m.id AND s.status = 'active'
            WHERE m.rank <> $1
            "#,
        )
        .bind(Rank::Aluno.as_str())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute collection rate", e))?;

        Ok(CollectionRate {
            eligible_members: row.0.max(0) as u64,
            paying_members: row.1.max(0) as u64,
        })
    }

    async fn ledger_totals(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<LedgerTotals, DomainError> {
        let row: TotalsRow = sqlx::query_as(
            r#"
            SELECT
                SUM(amount_cents) FILTER (WHERE kind = 'income') AS income_cents,
                SUM(amount_cents) FILTER (WHERE kind = 'expense') AS expense_cents
            FROM ledger_entries
            WHERE status = 'settled' AND entry_date BETWEEN $1 AND $2
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute ledger totals", e))?;

        Ok(row.into())
    }

    async fn ledger_totals_by_category(
        &self,
        from: NaiveDate,
        to: NaiveDate,
    ) -> Result<Vec<CategoryTotal>, DomainError> {
        #[derive(Debug, sqlx::FromRow)]
        struct CategoryRow {
            category: String,
            income_cents: Option<i64>,
            expense_cents: Option<i64>,
        }

        let rows: Vec<CategoryRow> = sqlx::query_as(
            r#"
            SELECT
                category,
                SUM(amount_cents) FILTER (WHERE kind = 'income') AS income_cents,
                SUM(amount_cents) FILTER (WHERE kind = 'expense') AS expense_cents
            FROM ledger_entries
            WHERE status = 'settled' AND entry_date BETWEEN $1 AND $2
            GROUP BY category
            ORDER BY category
            "#,
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| db_error("Failed to compute ledger totals by category", e))?;

        Ok(rows
            .into_iter()
            .map(|row| CategoryTotal {
                category: row.category,
                totals: LedgerTotals {
                    income: Money::from_cents(row.income_cents.unwrap_or(0)),
                    expense: Money::from_cents(row.expense_cents.unwrap_or(0)),
                },
            })
            .collect())
    }
}
