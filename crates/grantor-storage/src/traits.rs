//! AuthStore trait definition.

use async_trait::async_trait;

use crate::error::{StorageError, StorageResult};

/// Resource type under which groups are addressable as grant targets.
pub const RESOURCE_TYPE_GROUP: &str = "GROUP";

/// Maximum length accepted for group names.
pub const MAX_GROUP_NAME_LEN: usize = 256;

/// Maximum length accepted for group descriptions.
pub const MAX_GROUP_DESCRIPTION_LEN: usize = 4096;

/// A stored group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GroupRecord {
    pub uuid: String,
    pub name: String,
    pub description: String,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

/// A stored permission grant: an opaque (action, resource_type, resource_id)
/// tuple with value equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct StoredGrant {
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
}

impl StoredGrant {
    pub fn new(
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
    ) -> Self {
        Self {
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
        }
    }
}

/// The principal a grant is attached to.
///
/// User ids are free-form strings and are never existence-checked by the
/// store. Group grantees are keyed by group uuid.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GranteeRef {
    User(String),
    Group(String),
}

impl GranteeRef {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    pub fn group(uuid: impl Into<String>) -> Self {
        Self::Group(uuid.into())
    }

    /// Returns the grantee id without the type discriminant.
    pub fn id(&self) -> &str {
        match self {
            GranteeRef::User(id) => id,
            GranteeRef::Group(uuid) => uuid,
        }
    }

    /// Stable map key, disambiguating users from groups.
    pub(crate) fn storage_key(&self) -> String {
        match self {
            GranteeRef::User(id) => format!("user:{id}"),
            GranteeRef::Group(uuid) => format!("group:{uuid}"),
        }
    }
}

/// Backend health report.
#[derive(Debug, Clone)]
pub struct HealthStatus {
    pub healthy: bool,
    pub message: Option<String>,
}

/// Validates a group identifier (non-empty, no control characters).
pub fn validate_group_id(uuid: &str) -> StorageResult<()> {
    if uuid.is_empty() {
        return Err(StorageError::InvalidInput {
            message: "group uuid must not be empty".to_string(),
        });
    }
    if uuid.chars().any(char::is_control) {
        return Err(StorageError::InvalidInput {
            message: "group uuid must not contain control characters".to_string(),
        });
    }
    Ok(())
}

/// Validates a group name against length bounds.
pub fn validate_group_name(name: &str) -> StorageResult<()> {
    if name.is_empty() {
        return Err(StorageError::InvalidInput {
            message: "group name must not be empty".to_string(),
        });
    }
    if name.len() > MAX_GROUP_NAME_LEN {
        return Err(StorageError::InvalidInput {
            message: format!("group name exceeds {MAX_GROUP_NAME_LEN} bytes"),
        });
    }
    Ok(())
}

/// Validates a group description against length bounds.
pub fn validate_group_description(description: &str) -> StorageResult<()> {
    if description.len() > MAX_GROUP_DESCRIPTION_LEN {
        return Err(StorageError::InvalidInput {
            message: format!("group description exceeds {MAX_GROUP_DESCRIPTION_LEN} bytes"),
        });
    }
    Ok(())
}

/// Validates a grant tuple (all fields non-empty).
pub fn validate_grant(grant: &StoredGrant) -> StorageResult<()> {
    if grant.action.is_empty() || grant.resource_type.is_empty() || grant.resource_id.is_empty() {
        return Err(StorageError::InvalidInput {
            message: "grant action, resource_type and resource_id must not be empty".to_string(),
        });
    }
    Ok(())
}

/// Abstract storage interface for groups, membership edges and grants.
///
/// Implementations must be thread-safe (Send + Sync) and support async
/// operations. Each method is atomic from the caller's perspective: a
/// concurrent reader never observes a partially-applied mutation of a
/// single call.
#[async_trait]
pub trait AuthStore: Send + Sync + 'static {
    // Group operations

    /// Creates a new group. Fails with `GroupAlreadyExists` on uuid collision.
    async fn create_group(
        &self,
        uuid: &str,
        name: &str,
        description: &str,
    ) -> StorageResult<GroupRecord>;

    /// Gets a group by uuid.
    async fn get_group(&self, uuid: &str) -> StorageResult<GroupRecord>;

    /// Deletes a group and cascades: removes every membership edge where the
    /// group is member or container, every grant where it is the grantee, and
    /// every grant targeting it.
    async fn delete_group(&self, uuid: &str) -> StorageResult<()>;

    /// Checks whether a group exists.
    async fn group_exists(&self, uuid: &str) -> StorageResult<bool>;

    /// Lists all groups.
    async fn list_groups(&self) -> StorageResult<Vec<GroupRecord>>;

    // Membership operations

    /// Adds a directed membership edge `member -> container`.
    ///
    /// The container must be an existing group. The member is not checked at
    /// this layer; it may be a user id. Duplicate edges are idempotent.
    async fn add_membership(&self, member_id: &str, container_uuid: &str) -> StorageResult<()>;

    /// Returns the containers the member belongs to, in insertion order.
    async fn containers_of(&self, member_id: &str) -> StorageResult<Vec<String>>;

    // Grant operations

    /// Attaches a grant to a grantee. Granting an identical tuple twice is a
    /// no-op; insertion order of distinct grants is preserved.
    async fn insert_grant(&self, grantee: &GranteeRef, grant: StoredGrant) -> StorageResult<()>;

    /// Detaches a grant from a grantee. Removing an absent grant, or removing
    /// from an unknown grantee, succeeds silently.
    async fn remove_grant(&self, grantee: &GranteeRef, grant: &StoredGrant) -> StorageResult<()>;

    /// Returns the grantee's direct grants in insertion order. Unknown
    /// grantees yield an empty list; existence policy lives above this layer.
    async fn grants_of(&self, grantee: &GranteeRef) -> StorageResult<Vec<StoredGrant>>;

    /// Reports backend health.
    async fn health_check(&self) -> StorageResult<HealthStatus>;
}
