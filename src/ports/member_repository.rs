//! MemberRepository port.

use async_trait::async_trait;

use crate::domain::foundation::{DomainError, MemberId};
use crate::domain::member::Member;

/// Port for member persistence.
#[async_trait]
pub trait MemberRepository: Send + Sync {
    async fn find_by_id(&self, id: &MemberId) -> Result<Option<Member>, DomainError>;

    /// Records the gateway customer mapping for a member.
    ///
    /// Called immediately after a successful `create_customer`, before any
    /// other write, so a retry after a partial failure finds the mapping
    /// and does not create a duplicate customer. Only the first write wins:
    /// an existing mapping is never overwritten.
    async fn set_gateway_customer(
        &self,
        id: &MemberId,
        gateway_customer_id: &str,
    ) -> Result<(), DomainError>;
}
