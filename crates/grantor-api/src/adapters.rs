//! Adapters that bridge the storage layer to the domain layer.
//!
//! The domain layer (grantor-domain) defines abstract traits for data access:
//! - `MembershipReader`: Traverse membership edges
//! - `GrantReader`: Read direct grants
//!
//! The storage layer (grantor-storage) implements `AuthStore` with concrete
//! backends. This module provides adapters that implement the domain traits
//! using `AuthStore`, so the resolver works with any storage backend.

use std::sync::Arc;

use async_trait::async_trait;

use grantor_domain::error::{DomainError, DomainResult};
use grantor_domain::model::Permission;
use grantor_domain::resolver::{GrantReader, MembershipReader};
use grantor_storage::{AuthStore, GranteeRef, StorageError, StoredGrant};

/// Converts a storage error into a domain error.
pub(crate) fn map_storage_error(err: StorageError) -> DomainError {
    match err {
        StorageError::GroupNotFound { uuid } => DomainError::GroupNotFound { uuid },
        StorageError::InvalidInput { message } => DomainError::InvalidInput { message },
        other => DomainError::Internal {
            message: format!("storage error: {other}"),
        },
    }
}

fn to_permission(grant: StoredGrant) -> Permission {
    Permission {
        action: grant.action,
        resource_type: grant.resource_type,
        resource_id: grant.resource_id,
    }
}

pub(crate) fn to_stored_grant(permission: &Permission) -> StoredGrant {
    StoredGrant {
        action: permission.action.clone(),
        resource_type: permission.resource_type.clone(),
        resource_id: permission.resource_id.clone(),
    }
}

/// Adapter that implements `MembershipReader` using an `AuthStore`.
pub struct AuthStoreMembershipReader<S: AuthStore> {
    storage: Arc<S>,
}

impl<S: AuthStore> AuthStoreMembershipReader<S> {
    /// Creates a new adapter wrapping the given storage.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: AuthStore> MembershipReader for AuthStoreMembershipReader<S> {
    async fn containers_of(&self, member_id: &str) -> DomainResult<Vec<String>> {
        self.storage
            .containers_of(member_id)
            .await
            .map_err(map_storage_error)
    }

    async fn group_exists(&self, uuid: &str) -> DomainResult<bool> {
        self.storage
            .group_exists(uuid)
            .await
            .map_err(map_storage_error)
    }
}

/// Adapter that implements `GrantReader` using an `AuthStore`.
pub struct AuthStoreGrantReader<S: AuthStore> {
    storage: Arc<S>,
}

impl<S: AuthStore> AuthStoreGrantReader<S> {
    /// Creates a new adapter wrapping the given storage.
    pub fn new(storage: Arc<S>) -> Self {
        Self { storage }
    }
}

#[async_trait]
impl<S: AuthStore> GrantReader for AuthStoreGrantReader<S> {
    async fn grants_for_group(&self, uuid: &str) -> DomainResult<Vec<Permission>> {
        let grants = self
            .storage
            .grants_of(&GranteeRef::group(uuid))
            .await
            .map_err(map_storage_error)?;
        Ok(grants.into_iter().map(to_permission).collect())
    }

    async fn grants_for_user(&self, user_id: &str) -> DomainResult<Vec<Permission>> {
        let grants = self
            .storage
            .grants_of(&GranteeRef::user(user_id))
            .await
            .map_err(map_storage_error)?;
        Ok(grants.into_iter().map(to_permission).collect())
    }
}
