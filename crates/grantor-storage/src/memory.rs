//! In-memory storage implementation.
//!
//! Grant lists are stored as `Vec<StoredGrant>` rather than a set because the
//! API exposes them in insertion order; idempotency is enforced with a
//! contains-check on insert, which is O(N) in the grants of one grantee and
//! fine for the small per-grantee lists this service sees.

use std::sync::Arc;

use async_trait::async_trait;
use dashmap::DashMap;
use tracing::instrument;

use crate::error::{StorageError, StorageResult};
use crate::traits::{
    validate_grant, validate_group_description, validate_group_id, validate_group_name, AuthStore,
    GranteeRef, GroupRecord, HealthStatus, StoredGrant, RESOURCE_TYPE_GROUP,
};

/// In-memory implementation of AuthStore.
///
/// # Performance Characteristics
///
/// - **Group lookup / insert / delete**: O(1) average (DashMap)
/// - **Grant insert / remove**: O(G) where G is grants of one grantee
/// - **Cascade delete**: O(V + E + T) over groups, edges and grants
///
/// Uses DashMap for thread-safe concurrent access without a global lock.
/// Mutations of the same grantee's grant list or the same member's edge list
/// are serialized by the map's per-shard locks.
#[derive(Debug, Default)]
pub struct MemoryAuthStore {
    groups: DashMap<String, GroupRecord>,
    /// Outgoing membership edges, keyed by member id (group uuid or user id).
    /// Containers are kept in insertion order; duplicates are rejected on add.
    memberships: DashMap<String, Vec<String>>,
    /// Grants keyed by grantee (see `GranteeRef::storage_key`), insertion order.
    grants: DashMap<String, Vec<StoredGrant>>,
}

impl MemoryAuthStore {
    /// Creates a new in-memory store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a new in-memory store wrapped in Arc.
    pub fn new_shared() -> Arc<Self> {
        Arc::new(Self::new())
    }
}

#[async_trait]
impl AuthStore for MemoryAuthStore {
    async fn create_group(
        &self,
        uuid: &str,
        name: &str,
        description: &str,
    ) -> StorageResult<GroupRecord> {
        validate_group_id(uuid)?;
        validate_group_name(name)?;
        validate_group_description(description)?;

        let group = GroupRecord {
            uuid: uuid.to_string(),
            name: name.to_string(),
            description: description.to_string(),
            created_at: chrono::Utc::now(),
        };

        // Use atomic entry API to prevent race condition between check and insert
        use dashmap::mapref::entry::Entry;
        match self.groups.entry(uuid.to_string()) {
            Entry::Occupied(_) => Err(StorageError::GroupAlreadyExists {
                uuid: uuid.to_string(),
            }),
            Entry::Vacant(entry) => {
                entry.insert(group.clone());
                Ok(group)
            }
        }
    }

    async fn get_group(&self, uuid: &str) -> StorageResult<GroupRecord> {
        self.groups
            .get(uuid)
            .map(|g| g.value().clone())
            .ok_or_else(|| StorageError::GroupNotFound {
                uuid: uuid.to_string(),
            })
    }

    #[instrument(skip(self), fields(group = %uuid))]
    async fn delete_group(&self, uuid: &str) -> StorageResult<()> {
        if self.groups.remove(uuid).is_none() {
            return Err(StorageError::GroupNotFound {
                uuid: uuid.to_string(),
            });
        }

        // Cascade: edges where the group is the member
        self.memberships.remove(uuid);

        // Cascade: edges where the group is the container
        for mut entry in self.memberships.iter_mut() {
            entry.value_mut().retain(|container| container != uuid);
        }
        self.memberships.retain(|_, containers| !containers.is_empty());

        // Cascade: grants where the group is the grantee
        self.grants.remove(&GranteeRef::group(uuid).storage_key());

        // Cascade: grants where the group is the target resource
        for mut entry in self.grants.iter_mut() {
            entry
                .value_mut()
                .retain(|g| !(g.resource_type == RESOURCE_TYPE_GROUP && g.resource_id == uuid));
        }

        Ok(())
    }

    async fn group_exists(&self, uuid: &str) -> StorageResult<bool> {
        Ok(self.groups.contains_key(uuid))
    }

    async fn list_groups(&self) -> StorageResult<Vec<GroupRecord>> {
        Ok(self.groups.iter().map(|g| g.value().clone()).collect())
    }

    async fn add_membership(&self, member_id: &str, container_uuid: &str) -> StorageResult<()> {
        if member_id.is_empty() {
            return Err(StorageError::InvalidInput {
                message: "member id must not be empty".to_string(),
            });
        }
        if !self.groups.contains_key(container_uuid) {
            return Err(StorageError::GroupNotFound {
                uuid: container_uuid.to_string(),
            });
        }

        let mut containers = self.memberships.entry(member_id.to_string()).or_default();
        if !containers.iter().any(|c| c == container_uuid) {
            containers.push(container_uuid.to_string());
        }
        Ok(())
    }

    async fn containers_of(&self, member_id: &str) -> StorageResult<Vec<String>> {
        Ok(self
            .memberships
            .get(member_id)
            .map(|c| c.value().clone())
            .unwrap_or_default())
    }

    async fn insert_grant(&self, grantee: &GranteeRef, grant: StoredGrant) -> StorageResult<()> {
        validate_grant(&grant)?;

        let mut grants = self.grants.entry(grantee.storage_key()).or_default();
        // Granting an identical tuple twice must not duplicate the list entry
        if !grants.contains(&grant) {
            grants.push(grant);
        }
        Ok(())
    }

    async fn remove_grant(&self, grantee: &GranteeRef, grant: &StoredGrant) -> StorageResult<()> {
        // Removing from an unknown grantee, or removing an absent grant, is a
        // silent success: there is nothing to revoke.
        if let Some(mut grants) = self.grants.get_mut(&grantee.storage_key()) {
            grants.retain(|g| g != grant);
        }
        Ok(())
    }

    async fn grants_of(&self, grantee: &GranteeRef) -> StorageResult<Vec<StoredGrant>> {
        Ok(self
            .grants
            .get(&grantee.storage_key())
            .map(|g| g.value().clone())
            .unwrap_or_default())
    }

    async fn health_check(&self) -> StorageResult<HealthStatus> {
        // In-memory storage is always healthy - no external dependencies
        Ok(HealthStatus {
            healthy: true,
            message: Some("in-memory storage".to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn admin_on(uuid: &str) -> StoredGrant {
        StoredGrant::new("ADMIN", RESOURCE_TYPE_GROUP, uuid)
    }

    // Test: store can be created and starts empty
    #[tokio::test]
    async fn test_memory_store_can_be_created() {
        let store = MemoryAuthStore::new();
        let groups = store.list_groups().await.unwrap();
        assert!(groups.is_empty());
    }

    #[tokio::test]
    async fn test_create_and_get_group() {
        let store = MemoryAuthStore::new();
        let created = store.create_group("g1", "name1", "description1").await.unwrap();

        assert_eq!(created.uuid, "g1");
        assert_eq!(created.name, "name1");
        assert_eq!(created.description, "description1");

        let retrieved = store.get_group("g1").await.unwrap();
        assert_eq!(retrieved, created);
    }

    #[tokio::test]
    async fn test_get_nonexistent_group() {
        let store = MemoryAuthStore::new();
        let result = store.get_group("nonexistent").await;

        assert!(matches!(result, Err(StorageError::GroupNotFound { .. })));
    }

    #[tokio::test]
    async fn test_create_duplicate_group_fails() {
        let store = MemoryAuthStore::new();
        store.create_group("g1", "name1", "d1").await.unwrap();

        let result = store.create_group("g1", "other", "d2").await;
        assert!(matches!(
            result,
            Err(StorageError::GroupAlreadyExists { .. })
        ));
    }

    #[tokio::test]
    async fn test_create_group_validates_inputs() {
        let store = MemoryAuthStore::new();

        assert!(store.create_group("", "name", "d").await.is_err());
        assert!(store.create_group("g1", "", "d").await.is_err());
        let long_name = "x".repeat(crate::traits::MAX_GROUP_NAME_LEN + 1);
        assert!(store.create_group("g1", &long_name, "d").await.is_err());
    }

    // Test: delete of an absent group fails with GroupNotFound
    #[tokio::test]
    async fn test_delete_nonexistent_group_fails() {
        let store = MemoryAuthStore::new();
        let result = store.delete_group("nope").await;
        assert!(matches!(result, Err(StorageError::GroupNotFound { .. })));
    }

    // Test: double delete raises on the second call
    #[tokio::test]
    async fn test_double_delete_fails_second_time() {
        let store = MemoryAuthStore::new();
        store.create_group("g1", "name1", "d1").await.unwrap();
        store.delete_group("g1").await.unwrap();

        let result = store.delete_group("g1").await;
        assert!(matches!(result, Err(StorageError::GroupNotFound { .. })));
    }

    #[tokio::test]
    async fn test_add_membership_requires_container() {
        let store = MemoryAuthStore::new();
        store.create_group("g1", "name1", "d1").await.unwrap();

        // Unknown container is rejected
        let result = store.add_membership("g1", "missing").await;
        assert!(matches!(result, Err(StorageError::GroupNotFound { .. })));

        // Member is not checked at this layer (may be a user id)
        store.add_membership("alice@example.com", "g1").await.unwrap();
        assert_eq!(
            store.containers_of("alice@example.com").await.unwrap(),
            vec!["g1".to_string()]
        );
    }

    // Test: duplicate edges are idempotent and order is preserved
    #[tokio::test]
    async fn test_membership_edges_ordered_and_idempotent() {
        let store = MemoryAuthStore::new();
        store.create_group("g1", "n", "d").await.unwrap();
        store.create_group("g2", "n", "d").await.unwrap();
        store.create_group("g3", "n", "d").await.unwrap();

        store.add_membership("m", "g2").await.unwrap();
        store.add_membership("m", "g1").await.unwrap();
        store.add_membership("m", "g2").await.unwrap();
        store.add_membership("m", "g3").await.unwrap();

        assert_eq!(
            store.containers_of("m").await.unwrap(),
            vec!["g2".to_string(), "g1".to_string(), "g3".to_string()]
        );
    }

    // Test: granting the same permission twice does not duplicate the entry
    #[tokio::test]
    async fn test_insert_grant_is_idempotent() {
        let store = MemoryAuthStore::new();
        let grantee = GranteeRef::group("g1");
        let grant = StoredGrant::new("WRITE", RESOURCE_TYPE_GROUP, "g2");

        store.insert_grant(&grantee, grant.clone()).await.unwrap();
        store.insert_grant(&grantee, grant.clone()).await.unwrap();

        let grants = store.grants_of(&grantee).await.unwrap();
        assert_eq!(grants, vec![grant]);
    }

    // Test: distinct grants keep insertion order
    #[tokio::test]
    async fn test_grants_preserve_insertion_order() {
        let store = MemoryAuthStore::new();
        let grantee = GranteeRef::user("u1");

        let g1 = StoredGrant::new("WRITE", RESOURCE_TYPE_GROUP, "a");
        let g2 = StoredGrant::new("READ", RESOURCE_TYPE_GROUP, "b");
        let g3 = StoredGrant::new("ADMIN", RESOURCE_TYPE_GROUP, "c");

        store.insert_grant(&grantee, g1.clone()).await.unwrap();
        store.insert_grant(&grantee, g2.clone()).await.unwrap();
        store.insert_grant(&grantee, g3.clone()).await.unwrap();

        assert_eq!(store.grants_of(&grantee).await.unwrap(), vec![g1, g2, g3]);
    }

    // Test: removing an absent grant or unknown grantee succeeds silently
    #[tokio::test]
    async fn test_remove_grant_is_idempotent() {
        let store = MemoryAuthStore::new();
        let grantee = GranteeRef::group("not a group");
        let grant = StoredGrant::new("READ", RESOURCE_TYPE_GROUP, "g1");

        assert!(store.remove_grant(&grantee, &grant).await.is_ok());

        let grantee = GranteeRef::user("u1");
        store.insert_grant(&grantee, grant.clone()).await.unwrap();
        store.remove_grant(&grantee, &grant).await.unwrap();
        store.remove_grant(&grantee, &grant).await.unwrap();
        assert!(store.grants_of(&grantee).await.unwrap().is_empty());
    }

    // Test: user and group grantees with the same id do not collide
    #[tokio::test]
    async fn test_user_and_group_grantee_keys_are_distinct() {
        let store = MemoryAuthStore::new();
        let grant = StoredGrant::new("READ", RESOURCE_TYPE_GROUP, "g9");

        store
            .insert_grant(&GranteeRef::user("same-id"), grant.clone())
            .await
            .unwrap();

        assert!(store
            .grants_of(&GranteeRef::group("same-id"))
            .await
            .unwrap()
            .is_empty());
        assert_eq!(
            store.grants_of(&GranteeRef::user("same-id")).await.unwrap(),
            vec![grant]
        );
    }

    // Test: cascade removes edges in both directions and grants both ways
    #[tokio::test]
    async fn test_delete_group_cascades() {
        let store = MemoryAuthStore::new();
        store.create_group("g1", "n", "d").await.unwrap();
        store.create_group("g2", "n", "d").await.unwrap();
        store.create_group("g3", "n", "d").await.unwrap();

        // g1 -> g2, g3 -> g1, u1 -> g1
        store.add_membership("g1", "g2").await.unwrap();
        store.add_membership("g3", "g1").await.unwrap();
        store.add_membership("u1", "g1").await.unwrap();

        // g1 as grantee; g1 as target from both a group and a user
        store
            .insert_grant(&GranteeRef::group("g1"), admin_on("g2"))
            .await
            .unwrap();
        store
            .insert_grant(&GranteeRef::group("g2"), admin_on("g1"))
            .await
            .unwrap();
        store
            .insert_grant(&GranteeRef::user("u1"), admin_on("g1"))
            .await
            .unwrap();
        store
            .insert_grant(&GranteeRef::user("u1"), admin_on("g3"))
            .await
            .unwrap();

        store.delete_group("g1").await.unwrap();

        assert!(!store.group_exists("g1").await.unwrap());
        assert!(store.containers_of("g1").await.unwrap().is_empty());
        assert!(store.containers_of("g3").await.unwrap().is_empty());
        assert!(store.containers_of("u1").await.unwrap().is_empty());
        assert!(store
            .grants_of(&GranteeRef::group("g1"))
            .await
            .unwrap()
            .is_empty());
        assert!(store
            .grants_of(&GranteeRef::group("g2"))
            .await
            .unwrap()
            .is_empty());
        // Grants not referencing g1 survive
        assert_eq!(
            store.grants_of(&GranteeRef::user("u1")).await.unwrap(),
            vec![admin_on("g3")]
        );
    }

    // Test: deleting a sibling leaves unrelated membership intact
    #[tokio::test]
    async fn test_delete_group_leaves_third_party_untouched() {
        let store = MemoryAuthStore::new();
        store.create_group("g1", "n", "d").await.unwrap();
        store.create_group("g2", "n", "d").await.unwrap();
        store.create_group("g3", "n", "d").await.unwrap();

        store.add_membership("g3", "g2").await.unwrap();
        store
            .insert_grant(&GranteeRef::group("g2"), admin_on("g3"))
            .await
            .unwrap();

        store.delete_group("g1").await.unwrap();

        assert_eq!(
            store.containers_of("g3").await.unwrap(),
            vec!["g2".to_string()]
        );
        assert_eq!(
            store.grants_of(&GranteeRef::group("g2")).await.unwrap(),
            vec![admin_on("g3")]
        );
    }

    // Test: concurrent grants to disjoint grantees don't lose data
    #[tokio::test]
    async fn test_concurrent_grants_dont_lose_data() {
        let store = MemoryAuthStore::new_shared();
        store.create_group("target", "n", "d").await.unwrap();

        let num_tasks = 100;
        let mut handles = Vec::with_capacity(num_tasks);

        for i in 0..num_tasks {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let grantee = GranteeRef::user(format!("user{i}"));
                store
                    .insert_grant(&grantee, admin_on("target"))
                    .await
                    .unwrap();
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        for i in 0..num_tasks {
            let grants = store
                .grants_of(&GranteeRef::user(format!("user{i}")))
                .await
                .unwrap();
            assert_eq!(grants.len(), 1, "grant for user{i} should be preserved");
        }
    }

    // Test: concurrent create_group calls resolve to exactly one winner
    #[tokio::test]
    async fn test_concurrent_create_group_no_race_condition() {
        let store = MemoryAuthStore::new_shared();
        let num_tasks = 100;

        let handles: Vec<_> = (0..num_tasks)
            .map(|i| {
                let store = Arc::clone(&store);
                let name = format!("name{i}");
                tokio::spawn(async move { store.create_group("contested", &name, "d").await })
            })
            .collect();

        let results: Vec<_> = futures::future::join_all(handles)
            .await
            .into_iter()
            .map(|r| r.unwrap())
            .collect();

        let successes = results.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1, "exactly one create_group should win");

        for failure in results.into_iter().filter(|r| r.is_err()) {
            assert!(matches!(
                failure,
                Err(StorageError::GroupAlreadyExists { .. })
            ));
        }
    }

    // Test: resolution queries run concurrently with mutations without panics
    #[tokio::test]
    async fn test_concurrent_reads_while_writing() {
        let store = MemoryAuthStore::new_shared();
        store.create_group("g1", "n", "d").await.unwrap();
        for i in 0..50 {
            store
                .insert_grant(&GranteeRef::group("g1"), admin_on(&format!("t{i}")))
                .await
                .unwrap();
        }

        let mut handles = Vec::new();
        for i in 50..100 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store
                    .insert_grant(&GranteeRef::group("g1"), admin_on(&format!("t{i}")))
                    .await
                    .unwrap();
            }));
        }
        for _ in 0..50 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                let grants = store.grants_of(&GranteeRef::group("g1")).await.unwrap();
                assert!(grants.len() >= 50, "should see at least initial grants");
            }));
        }

        for handle in handles {
            handle.await.unwrap();
        }

        let grants = store.grants_of(&GranteeRef::group("g1")).await.unwrap();
        assert_eq!(grants.len(), 100);
    }

    // Test: health check reports healthy for in-memory backend
    #[tokio::test]
    async fn test_in_memory_health_check_always_returns_healthy() {
        let store = MemoryAuthStore::new();
        let status = store.health_check().await.unwrap();
        assert!(status.healthy);
        assert_eq!(status.message, Some("in-memory storage".to_string()));
    }
}
