//! PostgreSQL implementation of MemberRepository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::foundation::{DomainError, MemberId};
use crate::domain::member::Member;
use crate::ports::MemberRepository;

use super::db_error;

pub struct PostgresMemberRepository {
    pool: PgPool,
}

impl PostgresMemberRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct MemberRow {
    id: Uuid,
    full_name: String,
    email: String,
    rank: String,
    gateway_customer_id: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<MemberRow> for Member {
    type Error = DomainError;

    fn try_from(row: MemberRow) -> Result<Self, Self::Error> {
        Ok(Member {
            id: MemberId::from_uuid(row.id),
            full_name: row.full_name,
            email: row.email,
            rank: row.rank.parse()?,
            gateway_customer_id: row.gateway_customer_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

#[async_trait]
impl MemberRepository for PostgresMemberRepository {
    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError> {
        let row: Option<MemberRow> = sqlx::query_as(
            r#"
            SELECT id, full_name, email, rank, gateway_customer_id, created_at, updated_at
            FROM members
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find member", e))?;

        row.map(Member::try_from).transpose()
    }

    async fn set_gateway_customer(
        &self,
        id: &MemberId,
        gateway_customer_id: &str,
    ) -> Result<(), DomainError> {
        // First write wins; an existing mapping is never replaced.
        sqlx::query(
            r#"
            UPDATE members
            SET gateway_customer_id = $2, updated_at = now()
            WHERE id = $1 AND gateway_customer_id IS NULL
            "#,
        )
        .bind(id.as_uuid())
        .bind(gateway_customer_id)
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to set gateway customer", e))?;

        Ok(())
    }
}
