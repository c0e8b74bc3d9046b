//! Permission resolver over the group-membership graph.
//!
//! The resolver performs a breadth-first traversal of the membership graph
//! starting at a principal, collecting each reachable group's direct grants
//! under that group's own key.
//!
//! # Architecture Decisions
//!
//! - **Cycle Tolerance**: Membership cycles are legal data. A visited-set
//!   worklist guarantees each group is expanded exactly once, so traversal
//!   terminates in O(V+E) regardless of cycles.
//!
//! - **Visit Limiting**: `ResolverConfig::max_visited` bounds memory and
//!   latency on pathologically large graphs.
//!
//! - **Reachability Keys**: Every reachable group appears in the result map
//!   even when it holds zero direct grants. Membership reachability, not
//!   grant presence, determines key presence.

use std::collections::{BTreeMap, HashSet, VecDeque};
use std::sync::Arc;

use tracing::instrument;

use crate::error::{DomainError, DomainResult};
use crate::model::{Permission, Principal, SELF_KEY};

use super::config::ResolverConfig;
use super::traits::{GrantReader, MembershipReader};

/// Effective permissions of a principal: group uuid to that group's direct
/// grants, in grant insertion order. Key ordering is lexicographic and
/// deterministic.
pub type PermissionMap = BTreeMap<String, Vec<Permission>>;

/// Permission resolver over the group-membership graph.
pub struct PermissionResolver<M, G> {
    membership: Arc<M>,
    grants: Arc<G>,
    config: ResolverConfig,
}

impl<M, G> PermissionResolver<M, G>
where
    M: MembershipReader + 'static,
    G: GrantReader + 'static,
{
    /// Creates a new resolver with default configuration.
    pub fn new(membership: Arc<M>, grants: Arc<G>) -> Self {
        Self {
            membership,
            grants,
            config: ResolverConfig::default(),
        }
    }

    /// Creates a new resolver with custom configuration.
    pub fn with_config(membership: Arc<M>, grants: Arc<G>, config: ResolverConfig) -> Self {
        Self {
            membership,
            grants,
            config,
        }
    }

    /// Computes the effective permissions of a principal.
    ///
    /// The key set is exactly {the principal itself, if it is a group} plus
    /// every group reachable by following membership edges outward from the
    /// principal, transitively. A group principal that does not exist fails
    /// with `GroupNotFound`; a user principal is never existence-checked.
    #[instrument(skip(self))]
    pub async fn effective_permissions(&self, principal: &Principal) -> DomainResult<PermissionMap> {
        let mut queue: VecDeque<String> = VecDeque::new();

        match principal {
            Principal::Group(uuid) => {
                if !self.membership.group_exists(uuid).await? {
                    return Err(DomainError::GroupNotFound { uuid: uuid.clone() });
                }
                queue.push_back(uuid.clone());
            }
            Principal::User(id) => {
                // Users are not keys in the map; start at their containers.
                queue.extend(self.membership.containers_of(id).await?);
            }
        }

        let mut permissions = PermissionMap::new();
        let mut visited: HashSet<String> = HashSet::new();

        while let Some(uuid) = queue.pop_front() {
            if !visited.insert(uuid.clone()) {
                continue;
            }
            if visited.len() > self.config.max_visited {
                return Err(DomainError::TraversalLimitExceeded {
                    max_visited: self.config.max_visited,
                });
            }

            let grants = self.grants.grants_for_group(&uuid).await?;
            permissions.insert(uuid.clone(), grants);

            for container in self.membership.containers_of(&uuid).await? {
                if !visited.contains(&container) {
                    queue.push_back(container);
                }
            }
        }

        Ok(permissions)
    }

    /// Computes a user's own permission view: the transitive map of
    /// `effective_permissions` for the user, plus the user's direct grants
    /// under the self key (`""`).
    #[instrument(skip(self))]
    pub async fn my_permissions(&self, user_id: &str) -> DomainResult<PermissionMap> {
        let mut permissions = self
            .effective_permissions(&Principal::user(user_id))
            .await?;

        let direct = self.grants.grants_for_user(user_id).await?;
        permissions.insert(SELF_KEY.to_string(), direct);

        Ok(permissions)
    }
}
