//! UnregisterFromEventHandler - command handler for leaving an event.
//!
//! Deletes the registration row and releases the seat in one transaction.
//! An in-flight gateway charge is deliberately left alone: the
//! reconciliation sweep flags it once stale, and cancellation stays a
//! manual decision.

use std::sync::Arc;

use crate::domain::foundation::{DomainError, ErrorCode, EventId, MemberId};
use crate::ports::RegistrationStore;

/// Command to remove a member's event registration.
#[derive(Debug, Clone)]
pub struct UnregisterFromEventCommand {
    pub event_id: EventId,
    pub member_id: MemberId,
}

/// Handler for event unregistration.
pub struct UnregisterFromEventHandler {
    registrations: Arc<dyn RegistrationStore>,
}

impl UnregisterFromEventHandler {
    pub fn new(registrations: Arc<dyn RegistrationStore>) -> Self {
        Self { registrations }
    }

    pub async fn handle(&self, cmd: UnregisterFromEventCommand) -> Result<(), DomainError> {
        let removed = self
            .registrations
            .remove(&cmd.event_id, &cmd.member_id)
            .await?;

        if !removed {
            return Err(DomainError::new(
                ErrorCode::RegistrationNotFound,
                "Member is not registered for this event",
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::event::EventRegistration;
    use crate::domain::foundation::Money;
    use crate::ports::{NewPaidRegistration, RegistrationInsert};
    use async_trait::async_trait;
    use std::sync::Mutex;

    struct MockRegistrationStore {
        removed: Mutex<Vec<(EventId, MemberId)>>,
        exists: bool,
    }

    impl MockRegistrationStore {
        fn with_registration() -> Self {
            Self {
                removed: Mutex::new(Vec::new()),
                exists: true,
            }
        }

        fn empty() -> Self {
            Self {
                removed: Mutex::new(Vec::new()),
                exists: false,
            }
        }
    }

    #[async_trait]
    impl RegistrationStore for MockRegistrationStore {
        async fn insert(
            &self,
            event_id: &EventId,
            member_id: &MemberId,
            _paid: Option<NewPaidRegistration>,
        ) -> Result<RegistrationInsert, DomainError> {
            Ok(RegistrationInsert::Inserted(EventRegistration::free(
                *event_id, *member_id,
            )))
        }

        async fn remove(
            &self,
            event_id: &EventId,
            member_id: &MemberId,
        ) -> Result<bool, DomainError> {
            if self.exists {
                self.removed.lock().unwrap().push((*event_id, *member_id));
            }
            Ok(self.exists)
        }

        async fn find(
            &self,
            _event_id: &EventId,
            _member_id: &MemberId,
        ) -> Result<Option<EventRegistration>, DomainError> {
            Ok(None)
        }

        async fn mark_paid(
            &self,
            _event_id: &EventId,
            _member_id: &MemberId,
            _amount: Money,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }

        async fn cancel_and_release_seat(
            &self,
            _event_id: &EventId,
            _member_id: &MemberId,
        ) -> Result<bool, DomainError> {
            Ok(false)
        }
    }

    #[tokio::test]
    async fn unregistering_removes_the_registration() {
        let store = Arc::new(MockRegistrationStore::with_registration());
        let handler = UnregisterFromEventHandler::new(store.clone());

        let cmd = UnregisterFromEventCommand {
            event_id: EventId::new(),
            member_id: MemberId::new(),
        };
        handler.handle(cmd.clone()).await.unwrap();

        assert_eq!(
            store.removed.lock().unwrap().as_slice(),
            &[(cmd.event_id, cmd.member_id)]
        );
    }

    #[tokio::test]
    async fn unregistering_twice_fails_the_second_time() {
        let handler = UnregisterFromEventHandler::new(Arc::new(MockRegistrationStore::empty()));

        let err = handler
            .handle(UnregisterFromEventCommand {
                event_id: EventId::new(),
                member_id: MemberId::new(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.code, ErrorCode::RegistrationNotFound);
    }
}
