//! Shared user collection guarded by a single mutex.

use crate::{
    metrics::{MetricsSnapshot, StoreMetrics},
    store::types::{IdAllocation, StoreError, User, UserFields, UserId},
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// Abstraction over the user collection used by the HTTP surface.
#[async_trait]
pub trait UserApi: Send + Sync {
    /// Return every stored user in insertion order.
    async fn list_users(&self) -> Vec<User>;

    /// Assign an id to `fields`, append the record, and return it.
    async fn create_user(&self, fields: UserFields) -> User;

    /// Shallow-merge `patch` into the first user with `id`.
    async fn update_user(&self, id: UserId, patch: UserFields) -> Result<User, StoreError>;

    /// Remove every user with `id`, returning how many were removed.
    async fn delete_user(&self, id: UserId) -> usize;

    /// Number of users currently stored.
    async fn user_count(&self) -> usize;

    /// Retrieve the current activity counters.
    fn metrics_snapshot(&self) -> MetricsSnapshot;
}

#[derive(Debug, Default)]
struct Collection {
    users: Vec<User>,
    last_issued: UserId,
}

impl Collection {
    fn next_id(&mut self, allocation: IdAllocation) -> UserId {
        let id = match allocation {
            IdAllocation::CollectionSize => self.users.len() as UserId + 1,
            IdAllocation::Sequence => self.last_issued + 1,
        };
        self.last_issued = self.last_issued.max(id);
        id
    }
}

/// Process-local user registry.
///
/// Construct it once at startup and share it through an `Arc`; all operations lock the whole
/// collection for their duration.
#[derive(Debug, Default)]
pub struct UserStore {
    collection: Mutex<Collection>,
    allocation: IdAllocation,
    metrics: StoreMetrics,
}

impl UserStore {
    /// Empty store using [`IdAllocation::CollectionSize`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Empty store using the given id allocation strategy.
    pub fn with_allocation(allocation: IdAllocation) -> Self {
        Self {
            allocation,
            ..Self::default()
        }
    }

    /// Strategy this store uses for new ids.
    pub fn allocation(&self) -> IdAllocation {
        self.allocation
    }
}

#[async_trait]
impl UserApi for UserStore {
    async fn list_users(&self) -> Vec<User> {
        self.collection.lock().await.users.clone()
    }

    async fn create_user(&self, fields: UserFields) -> User {
        let mut collection = self.collection.lock().await;
        let id = collection.next_id(self.allocation);
        if collection.users.iter().any(|user| user.id == id) {
            tracing::warn!(user_id = id, "Assigned id is already in use");
        }
        let user = User::new(id, fields);
        collection.users.push(user.clone());
        self.metrics.record_created();
        tracing::debug!(user_id = id, total = collection.users.len(), "User created");
        user
    }

    async fn update_user(&self, id: UserId, patch: UserFields) -> Result<User, StoreError> {
        let mut collection = self.collection.lock().await;
        let Some(user) = collection.users.iter_mut().find(|user| user.id == id) else {
            self.metrics.record_update_miss();
            tracing::debug!(user_id = id, "Update target not found");
            return Err(StoreError::NotFound(id));
        };
        user.merge(patch);
        self.metrics.record_updated();
        tracing::debug!(user_id = id, "User updated");
        Ok(user.clone())
    }

    async fn delete_user(&self, id: UserId) -> usize {
        let mut collection = self.collection.lock().await;
        let before = collection.users.len();
        collection.users.retain(|user| user.id != id);
        let removed = before - collection.users.len();
        self.metrics.record_deleted(removed as u64);
        tracing::debug!(
            user_id = id,
            removed,
            total = collection.users.len(),
            "Delete processed"
        );
        removed
    }

    async fn user_count(&self) -> usize {
        self.collection.lock().await.users.len()
    }

    fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{Value, json};

    fn fields(value: Value) -> UserFields {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    fn ids(users: &[User]) -> Vec<UserId> {
        users.iter().map(|user| user.id).collect()
    }

    #[tokio::test]
    async fn sequential_creates_number_from_one() {
        let store = UserStore::new();
        for name in ["a", "b", "c", "d"] {
            store.create_user(fields(json!({ "name": name }))).await;
        }
        assert_eq!(ids(&store.list_users().await), vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn create_overwrites_caller_id() {
        let store = UserStore::new();
        let user = store.create_user(fields(json!({"id": 42, "name": "x"}))).await;
        assert_eq!(user.id, 1);
        assert_eq!(store.list_users().await[0].id, 1);
    }

    #[tokio::test]
    async fn listing_twice_is_stable() {
        let store = UserStore::new();
        store.create_user(fields(json!({"name": "a"}))).await;
        store.create_user(fields(json!({"name": "b"}))).await;
        assert_eq!(store.list_users().await, store.list_users().await);
    }

    #[tokio::test]
    async fn update_missing_leaves_collection_untouched() {
        let store = UserStore::new();
        store.create_user(fields(json!({"name": "a"}))).await;
        let before = store.list_users().await;

        let result = store.update_user(999, fields(json!({"name": "z"}))).await;

        assert_eq!(result, Err(StoreError::NotFound(999)));
        assert_eq!(store.list_users().await, before);
        assert_eq!(store.metrics_snapshot().update_misses, 1);
    }

    #[tokio::test]
    async fn update_merges_into_matching_record() {
        let store = UserStore::new();
        store.create_user(fields(json!({"name": "A", "age": 30}))).await;
        let updated = store.update_user(1, fields(json!({"age": 31}))).await.unwrap();
        assert_eq!(
            serde_json::to_value(&updated).unwrap(),
            json!({"id": 1, "name": "A", "age": 31})
        );
        assert_eq!(store.list_users().await, vec![updated]);
    }

    #[tokio::test]
    async fn delete_missing_is_a_no_op() {
        let store = UserStore::new();
        store.create_user(fields(json!({"name": "a"}))).await;
        let before = store.list_users().await;
        assert_eq!(store.delete_user(5).await, 0);
        assert_eq!(store.list_users().await, before);
    }

    #[tokio::test]
    async fn recreating_after_deleting_last_reuses_its_id() {
        let store = UserStore::new();
        store.create_user(fields(json!({"name": "one"}))).await;
        store.create_user(fields(json!({"name": "two"}))).await;
        assert_eq!(store.delete_user(2).await, 1);

        let recreated = store.create_user(fields(json!({"name": "three"}))).await;

        assert_eq!(recreated.id, 2);
        assert_eq!(ids(&store.list_users().await), vec![1, 2]);
    }

    #[tokio::test]
    async fn collection_size_ids_can_collide_after_delete() {
        let store = UserStore::new();
        for name in ["one", "two", "three"] {
            store.create_user(fields(json!({ "name": name }))).await;
        }
        store.delete_user(1).await;

        let created = store.create_user(fields(json!({"name": "four"}))).await;

        assert_eq!(created.id, 3);
        assert_eq!(ids(&store.list_users().await), vec![2, 3, 3]);

        // Both records sharing id 3 go away together.
        assert_eq!(store.delete_user(3).await, 2);
        assert_eq!(ids(&store.list_users().await), vec![2]);
    }

    #[tokio::test]
    async fn update_with_duplicate_ids_touches_first_match_only() {
        let store = UserStore::new();
        for name in ["one", "two", "three"] {
            store.create_user(fields(json!({ "name": name }))).await;
        }
        store.delete_user(1).await;
        store.create_user(fields(json!({"name": "four"}))).await;

        store.update_user(3, fields(json!({"flag": true}))).await.unwrap();

        let users = store.list_users().await;
        assert_eq!(users[1].fields.get("flag"), Some(&json!(true)));
        assert_eq!(users[2].fields.get("flag"), None);
    }

    #[tokio::test]
    async fn sequence_allocation_never_reuses_ids() {
        let store = UserStore::with_allocation(IdAllocation::Sequence);
        assert_eq!(store.allocation(), IdAllocation::Sequence);
        for name in ["one", "two", "three"] {
            store.create_user(fields(json!({ "name": name }))).await;
        }
        store.delete_user(1).await;
        store.delete_user(3).await;

        let created = store.create_user(fields(json!({"name": "four"}))).await;

        assert_eq!(created.id, 4);
        assert_eq!(ids(&store.list_users().await), vec![2, 4]);
    }

    #[tokio::test]
    async fn metrics_track_writes() {
        let store = UserStore::new();
        store.create_user(fields(json!({}))).await;
        store.create_user(fields(json!({}))).await;
        store.update_user(2, fields(json!({"x": 1}))).await.unwrap();
        store.delete_user(1).await;
        store.delete_user(1).await;

        let snapshot = store.metrics_snapshot();
        assert_eq!(snapshot.users_created, 2);
        assert_eq!(snapshot.users_updated, 1);
        assert_eq!(snapshot.users_deleted, 1);
        assert_eq!(store.user_count().await, 1);
    }
}
