//! Permission and principal value types.

use serde::{Deserialize, Serialize};

/// Resource type under which groups are addressable as grant targets.
pub const RESOURCE_TYPE_GROUP: &str = "GROUP";

/// Key under which a caller's own direct grants appear in a
/// my-permissions response.
pub const SELF_KEY: &str = "";

/// A permission: an opaque (action, resource_type, resource_id) tuple.
///
/// Two permissions with identical fields are interchangeable; the store does
/// not interpret action names (e.g. ADMIN vs WRITE) beyond equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Permission {
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
}

impl Permission {
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

    /// Shorthand for a permission targeting a group.
    pub fn on_group(action: impl Into<String>, group_uuid: impl Into<String>) -> Self {
        Self::new(action, RESOURCE_TYPE_GROUP, group_uuid)
    }
}

impl std::fmt::Display for Permission {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.action, self.resource_type, self.resource_id
        )
    }
}

/// The starting point of a permission resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Principal {
    /// A free-form user identifier.
    User(String),
    /// A group, by uuid.
    Group(String),
}

impl Principal {
    pub fn user(id: impl Into<String>) -> Self {
        Self::User(id.into())
    }

    pub fn group(uuid: impl Into<String>) -> Self {
        Self::Group(uuid.into())
    }

    /// Returns the principal id without the type discriminant.
    pub fn id(&self) -> &str {
        match self {
            Principal::User(id) => id,
            Principal::Group(uuid) => uuid,
        }
    }
}
