//! Traits for storage operations needed by the resolver.

use async_trait::async_trait;

use crate::error::DomainResult;
use crate::model::Permission;

/// Trait for membership-graph reads needed by the resolver.
#[async_trait]
pub trait MembershipReader: Send + Sync {
    /// Returns the containers the member belongs to, in insertion order.
    /// The member may be a group uuid or a user id.
    async fn containers_of(&self, member_id: &str) -> DomainResult<Vec<String>>;

    /// Checks if a group exists.
    async fn group_exists(&self, uuid: &str) -> DomainResult<bool>;
}

/// Trait for grant reads needed by the resolver.
#[async_trait]
pub trait GrantReader: Send + Sync {
    /// Returns a group's direct grants in insertion order.
    /// Groups with no grants yield an empty list.
    async fn grants_for_group(&self, uuid: &str) -> DomainResult<Vec<Permission>>;

    /// Returns a user's direct grants in insertion order.
    async fn grants_for_user(&self, user_id: &str) -> DomainResult<Vec<Permission>>;
}
