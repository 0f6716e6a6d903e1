//! PostgreSQL implementation of RegistrationStore.
//!
//! The insert locks the event row (`SELECT ... FOR UPDATE`) and performs
//! the status check, capacity check, registration insert, counter
//! increment, and - for priced events - the charge mirror and ledger
//! writes inside one transaction. The unique `(event_id, member_id)`
//! constraint settles the duplicate race; the row lock settles the
//! last-seat race.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::domain::event::{EventRegistration, EventStatus, RegistrationPaymentStatus};
use crate::domain::foundation::{DomainError, EventId, MemberId, Money, RegistrationId};
use crate::ports::{
    NewPaidRegistration, RegistrationDenial, RegistrationInsert, RegistrationStore,
};

use super::db_error;

pub struct PostgresRegistrationStore {
    pool: PgPool,
}

impl PostgresRegistrationStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct EventGuardRow {
    status: String,
    max_participants: i32,
    registered_participants: i32,
}

#[derive(Debug, sqlx::FromRow)]
struct RegistrationRow {
    id: Uuid,
    event_id: Uuid,
    member_id: Uuid,
    payment_status: String,
    gateway_payment_id: Option<String>,
    amount_paid_cents: i64,
    created_at: DateTime<Utc>,
}

impl TryFrom<RegistrationRow> for EventRegistration {
    type Error = DomainError;

    fn try_from(row: RegistrationRow) -> Result<Self, Self::Error> {
        Ok(EventRegistration {
            id: RegistrationId::from_uuid(row.id),
            event_id: EventId::from_uuid(row.event_id),
            member_id: MemberId::from_uuid(row.member_id),
            payment_status: row.payment_status.parse()?,
            gateway_payment_id: row.gateway_payment_id,
            amount_paid: Money::from_cents(row.amount_paid_cents),
            created_at: row.created_at,
        })
    }
}

async fn insert_registration_row(
    tx: &mut Transaction<'_, Postgres>,
    registration: &EventRegistration,
) -> Result<bool, DomainError> {
    let result = sqlx::query(
        r#"
        INSERT INTO event_registrations
            (id, event_id, member_id, payment_status, gateway_payment_id, amount_paid_cents, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (event_id, member_id) DO NOTHING
        "#,
    )
    .bind(registration.id.as_uuid())
    .bind(registration.event_id.as_uuid())
    .bind(registration.member_id.as_uuid())
    .bind(registration.payment_status.as_str())
    .bind(&registration.gateway_payment_id)
    .bind(registration.amount_paid.cents())
    .bind(registration.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert registration", e))?;

    Ok(result.rows_affected() == 1)
}

async fn write_paid_side_effects(
    tx: &mut Transaction<'_, Postgres>,
    paid: &NewPaidRegistration,
) -> Result<(), DomainError> {
    let payment = &paid.payment;
    sqlx::query(
        r#"
        INSERT INTO payments
            (gateway_id, value_cents, net_value_cents, status, billing_type,
             due_date, payment_date, external_ref, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        ON CONFLICT (gateway_id) DO NOTHING
        "#,
    )
    .bind(&payment.gateway_id)
    .bind(payment.value.cents())
    .bind(payment.net_value.map(|v| v.cents()))
    .bind(payment.status.as_str())
    .bind(payment.billing_type.as_str())
    .bind(payment.due_date)
    .bind(payment.payment_date)
    .bind(&payment.external_ref)
    .bind(payment.created_at)
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert payment mirror", e))?;

    let entry = &paid.ledger_entry;
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
    .execute(&mut **tx)
    .await
    .map_err(|e| db_error("Failed to insert ledger entry", e))?;

    Ok(())
}

#[async_trait]
impl RegistrationStore for PostgresRegistrationStore {
    async fn insert(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
        paid: Option<NewPaidRegistration>,
    ) -> Result<RegistrationInsert, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let guard: Option<EventGuardRow> = sqlx::query_as(
            r#"
            SELECT status, max_participants, registered_participants
            FROM events
            WHERE id = $1
            FOR UPDATE
            "#,
        )
        .bind(event_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to lock event", e))?;

        let guard = guard.ok_or_else(|| {
            DomainError::new(
                crate::domain::foundation::ErrorCode::EventNotFound,
                "Event not found",
            )
        })?;

        let status: EventStatus = guard.status.parse()?;
        if !status.accepts_registrations() {
            return Ok(RegistrationInsert::Denied(RegistrationDenial::Closed(status)));
        }
        if guard.registered_participants >= guard.max_participants {
            return Ok(RegistrationInsert::Denied(RegistrationDenial::Full));
        }

        let registration = match &paid {
            Some(p) => EventRegistration::pending(
                *event_id,
                *member_id,
                p.payment.gateway_id.clone(),
            ),
            None => EventRegistration::free(*event_id, *member_id),
        };

        if !insert_registration_row(&mut tx, &registration).await? {
            return Ok(RegistrationInsert::Denied(RegistrationDenial::AlreadyRegistered));
        }

        sqlx::query(
            "UPDATE events SET registered_participants = registered_participants + 1, updated_at = now() WHERE id = $1",
        )
        .bind(event_id.as_uuid())
        .execute(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to increment seat counter", e))?;

        if let Some(p) = &paid {
            write_paid_side_effects(&mut tx, p).await?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit registration", e))?;

        Ok(RegistrationInsert::Inserted(registration))
    }

    async fn remove(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let removed: Option<(String,)> = sqlx::query_as(
            r#"
            DELETE FROM event_registrations
            WHERE event_id = $1 AND member_id = $2
            RETURNING payment_status
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to delete registration", e))?;

        let Some((payment_status,)) = removed else {
            return Ok(false);
        };

        // A cancelled registration released its seat when it was cancelled.
        if payment_status.parse::<RegistrationPaymentStatus>()?.holds_seat() {
            sqlx::query(
                r#"
                UPDATE events
                SET registered_participants = GREATEST(registered_participants - 1, 0),
                    updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(event_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to decrement seat counter", e))?;
        }

        tx.commit()
            .await
            .map_err(|e| db_error("Failed to commit unregistration", e))?;

        Ok(true)
    }

    async fn find(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<Option<EventRegistration>, DomainError> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            r#"
            SELECT id, event_id, member_id, payment_status, gateway_payment_id,
                   amount_paid_cents, created_at
            FROM event_registrations
            WHERE event_id = $1 AND member_id = $2
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| db_error("Failed to find registration", e))?;

        row.map(EventRegistration::try_from).transpose()
    }

    async fn mark_paid(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
        amount: Money,
    ) -> Result<bool, DomainError> {
        let result = sqlx::query(
            r#"
            UPDATE event_registrations
            SET payment_status = 'paid', amount_paid_cents = $3
            WHERE event_id = $1 AND member_id = $2 AND payment_status <> 'cancelled'
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(member_id.as_uuid())
        .bind(amount.cents())
        .execute(&self.pool)
        .await
        .map_err(|e| db_error("Failed to mark registration paid", e))?;

        Ok(result.rows_affected() == 1)
    }

    async fn cancel_and_release_seat(
        &self,
        event_id: &EventId,
        member_id: &MemberId,
    ) -> Result<bool, DomainError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| db_error("Failed to begin transaction", e))?;

        let cancelled: Option<(Uuid,)> = sqlx::query_as(
            r#"
            UPDATE event_registrations
            SET payment_status = 'cancelled'
            WHERE event_id = $1 AND member_id = $2 AND payment_status <> 'cancelled'
            RETURNING id
            "#,
        )
        .bind(event_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to cancel registration", e))?;

        if cancelled.is_some() {
            sqlx::query(
                r#"
                UPDATE events
                SET registered_participants = GREATEST(registered_participants - 1, 0),
                    updated_at = now()
                WHERE id = $1
                "#,
            )
            .bind(event_id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| db_error("Failed to release seat", e))?;

            tx.commit()
                .await
                .map_err(|e| db_error("Failed to commit cancellation", e))?;
            return Ok(true);
        }

        // Nothing updated: distinguish "already cancelled" (idempotent
        // success) from "no such registration".
        let exists: Option<(Uuid,)> = sqlx::query_as(
            "SELECT id FROM event_registrations WHERE event_id = $1 AND member_id = $2",
        )
        .bind(event_id.as_uuid())
        .bind(member_id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(|e| db_error("Failed to check registration", e))?;

        Ok(exists.is_some())
    }
}
