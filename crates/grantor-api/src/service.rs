//! Authorization service facade.
//!
//! Composes the group/grant store and the resolution engine behind the public
//! operations, enforcing existence checks before delegating and translating
//! storage errors into domain errors. A rejected operation leaves the store
//! unchanged; operations with nothing to do (revoking from an unknown
//! grantee) succeed silently.

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use uuid::Uuid;

use grantor_domain::error::{DomainError, DomainResult};
use grantor_domain::model::{Permission, Principal, RESOURCE_TYPE_GROUP};
use grantor_domain::resolver::{PermissionMap, PermissionResolver, ResolverConfig};
use grantor_storage::{AuthStore, GranteeRef, GroupRecord};

use crate::adapters::{
    map_storage_error, to_stored_grant, AuthStoreGrantReader, AuthStoreMembershipReader,
};

/// Action granted to a group's creator on the new group.
const CREATOR_ACTION: &str = "ADMIN";

/// A group as exposed by the public API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl From<GroupRecord> for Group {
    fn from(record: GroupRecord) -> Self {
        Self {
            uuid: record.uuid,
            name: record.name,
            description: record.description,
            created_at: record.created_at,
        }
    }
}

/// Policy deciding who may query another principal's permissions.
///
/// The superuser set is configuration, not a hard-coded identity; see
/// `authorization.superusers` in the server config.
#[derive(Debug, Clone, Default)]
pub struct AccessPolicy {
    superusers: HashSet<String>,
}

impl AccessPolicy {
    /// Creates a policy from a list of superuser ids.
    pub fn new(superusers: impl IntoIterator<Item = String>) -> Self {
        Self {
            superusers: superusers.into_iter().collect(),
        }
    }

    /// Returns true if the user may act on behalf of other principals.
    pub fn is_superuser(&self, user_id: &str) -> bool {
        self.superusers.contains(user_id)
    }
}

/// Authorization service composing storage and the permission resolver.
pub struct AuthorizationService<S: AuthStore> {
    storage: Arc<S>,
    resolver: PermissionResolver<AuthStoreMembershipReader<S>, AuthStoreGrantReader<S>>,
    policy: AccessPolicy,
}

impl<S: AuthStore> AuthorizationService<S> {
    /// Creates a service with an empty access policy.
    pub fn new(storage: Arc<S>) -> Self {
        Self::with_policy(storage, AccessPolicy::default())
    }

    /// Creates a service with the given access policy.
    pub fn with_policy(storage: Arc<S>, policy: AccessPolicy) -> Self {
        Self::with_policy_and_resolver_config(storage, policy, ResolverConfig::default())
    }

    /// Creates a service with custom policy and resolver configuration.
    pub fn with_policy_and_resolver_config(
        storage: Arc<S>,
        policy: AccessPolicy,
        resolver_config: ResolverConfig,
    ) -> Self {
        let membership = Arc::new(AuthStoreMembershipReader::new(Arc::clone(&storage)));
        let grants = Arc::new(AuthStoreGrantReader::new(Arc::clone(&storage)));
        let resolver = PermissionResolver::with_config(membership, grants, resolver_config);
        Self {
            storage,
            resolver,
            policy,
        }
    }

    /// Creates a group and establishes the creator's capability over it: an
    /// `ADMIN GROUP <uuid>` grant plus the creator→group membership edge.
    #[instrument(skip(self, description))]
    pub async fn create_group(
        &self,
        caller: &str,
        name: &str,
        description: &str,
    ) -> DomainResult<Group> {
        if caller.is_empty() {
            return Err(DomainError::InvalidInput {
                message: "caller id must not be empty".to_string(),
            });
        }

        let uuid = Uuid::new_v4().to_string();
        let record = self
            .storage
            .create_group(&uuid, name, description)
            .await
            .map_err(map_storage_error)?;

        // Creator capability: fixed rule, not an optional policy.
        self.storage
            .add_membership(caller, &uuid)
            .await
            .map_err(map_storage_error)?;
        self.storage
            .insert_grant(
                &GranteeRef::user(caller),
                to_stored_grant(&Permission::on_group(CREATOR_ACTION, &uuid)),
            )
            .await
            .map_err(map_storage_error)?;

        info!(group = %uuid, %caller, "group created");
        Ok(record.into())
    }

    /// Deletes a group, cascading to its membership edges and every grant
    /// where it is grantee or target.
    #[instrument(skip(self))]
    pub async fn delete_group(&self, uuid: &str) -> DomainResult<()> {
        self.storage
            .delete_group(uuid)
            .await
            .map_err(map_storage_error)?;
        info!(group = %uuid, "group deleted");
        Ok(())
    }

    /// Gets a group by uuid.
    pub async fn get_group(&self, uuid: &str) -> DomainResult<Group> {
        let record = self
            .storage
            .get_group(uuid)
            .await
            .map_err(map_storage_error)?;
        Ok(record.into())
    }

    /// Lists all groups.
    pub async fn list_groups(&self) -> DomainResult<Vec<Group>> {
        let records = self
            .storage
            .list_groups()
            .await
            .map_err(map_storage_error)?;
        Ok(records.into_iter().map(Group::from).collect())
    }

    /// Adds `member` as a member of `container`. Both must exist; cycles are
    /// permitted.
    #[instrument(skip(self))]
    pub async fn add_group_to_group(
        &self,
        member_uuid: &str,
        container_uuid: &str,
    ) -> DomainResult<()> {
        self.ensure_group_exists(member_uuid).await?;
        self.storage
            .add_membership(member_uuid, container_uuid)
            .await
            .map_err(map_storage_error)
    }

    /// Grants a permission to a group. Both the grantee group and the
    /// permission's target must exist.
    #[instrument(skip(self))]
    pub async fn grant_group_permission(
        &self,
        grantee_uuid: &str,
        permission: Permission,
    ) -> DomainResult<()> {
        self.ensure_target_exists(&permission).await?;
        self.ensure_group_exists(grantee_uuid).await?;
        self.storage
            .insert_grant(&GranteeRef::group(grantee_uuid), to_stored_grant(&permission))
            .await
            .map_err(map_storage_error)
    }

    /// Revokes a permission from a group.
    ///
    /// An unknown grantee is a silent success (there is nothing to revoke
    /// from), but a permission whose target does not exist cannot be
    /// validated and is rejected.
    #[instrument(skip(self))]
    pub async fn revoke_group_permission(
        &self,
        grantee_uuid: &str,
        permission: &Permission,
    ) -> DomainResult<()> {
        self.ensure_target_exists(permission).await?;
        self.storage
            .remove_grant(&GranteeRef::group(grantee_uuid), &to_stored_grant(permission))
            .await
            .map_err(map_storage_error)
    }

    /// Grants a permission to a user. User ids are free-form and never
    /// existence-checked; the permission's target must exist.
    #[instrument(skip(self))]
    pub async fn grant_user_permission(
        &self,
        user_id: &str,
        permission: Permission,
    ) -> DomainResult<()> {
        self.ensure_target_exists(&permission).await?;
        self.storage
            .insert_grant(&GranteeRef::user(user_id), to_stored_grant(&permission))
            .await
            .map_err(map_storage_error)
    }

    /// Revokes a permission from a user. The permission's target must exist.
    #[instrument(skip(self))]
    pub async fn revoke_user_permission(
        &self,
        user_id: &str,
        permission: &Permission,
    ) -> DomainResult<()> {
        self.ensure_target_exists(permission).await?;
        self.storage
            .remove_grant(&GranteeRef::user(user_id), &to_stored_grant(permission))
            .await
            .map_err(map_storage_error)
    }

    /// Returns a group's effective permissions: every membership-reachable
    /// group keyed by uuid, each with its direct grants in insertion order.
    pub async fn get_group_permissions(&self, uuid: &str) -> DomainResult<PermissionMap> {
        self.resolver
            .effective_permissions(&Principal::group(uuid))
            .await
    }

    /// Returns the caller's permission view, or another principal's when
    /// `on_behalf_of` is given and the caller is a superuser.
    pub async fn get_my_permissions(
        &self,
        caller: &str,
        on_behalf_of: Option<&str>,
    ) -> DomainResult<PermissionMap> {
        let subject = match on_behalf_of {
            Some(other) if other != caller => {
                if !self.policy.is_superuser(caller) {
                    return Err(DomainError::PermissionDenied {
                        message: "not permitted to inspect other users".to_string(),
                    });
                }
                other
            }
            _ => caller,
        };

        self.resolver.my_permissions(subject).await
    }

    /// Reports storage health for readiness checks.
    pub async fn health(&self) -> DomainResult<grantor_storage::HealthStatus> {
        self.storage.health_check().await.map_err(map_storage_error)
    }

    async fn ensure_group_exists(&self, uuid: &str) -> DomainResult<()> {
        if !self
            .storage
            .group_exists(uuid)
            .await
            .map_err(map_storage_error)?
        {
            return Err(DomainError::GroupNotFound {
                uuid: uuid.to_string(),
            });
        }
        Ok(())
    }

    /// A permission's target exists iff it names a group that exists; GROUP
    /// is the only resource type this service can validate.
    async fn ensure_target_exists(&self, permission: &Permission) -> DomainResult<()> {
        let target_ok = permission.resource_type == RESOURCE_TYPE_GROUP
            && self
                .storage
                .group_exists(&permission.resource_id)
                .await
                .map_err(map_storage_error)?;

        if !target_ok {
            return Err(DomainError::TargetNotFound {
                resource_type: permission.resource_type.clone(),
                resource_id: permission.resource_id.clone(),
            });
        }
        Ok(())
    }
}
