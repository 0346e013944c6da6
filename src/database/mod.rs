//! # Database Layer
//!
//! Storage seams for users and groups. The dispatch core only depends on the
//! [`UserStore`] and [`GroupStore`] traits; [`memory`] provides the in-process
//! implementation and [`seed`] loads initial records from YAML.
//!
//! - **Version**: 1.0.0
//! - **Since**: 1.0.0
//! - **Toggleable**: false

pub mod memory;
pub mod seed;

use async_trait::async_trait;
use log::{debug, info, warn};

use crate::core::{Group, StoreError, User};

pub use memory::{MemoryGroupStore, MemoryUserStore};
pub use seed::SeedConfig;

#[async_trait]
pub trait UserStore: Send + Sync {
    /// `StoreError::NotFound` when the user has never been saved
    async fn find_by_id(&self, id: i64) -> Result<User, StoreError>;
    async fn save(&self, user: &User) -> Result<(), StoreError>;
}

#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn find_by_id(&self, id: i64) -> Result<Group, StoreError>;
    async fn save(&self, group: &Group) -> Result<(), StoreError>;
}

/// Load `user_id`, creating and persisting a default record on first contact.
///
/// Calling it again for the same id returns the stored record unchanged.
pub async fn ensure_user(store: &dyn UserStore, user_id: i64) -> Result<User, StoreError> {
    match store.find_by_id(user_id).await {
        Ok(user) => Ok(user),
        Err(StoreError::NotFound(_)) => {
            let user = User::new(user_id);
            store.save(&user).await?;
            info!("Provisioned new user {user_id}");
            Ok(user)
        }
        Err(e) => Err(e),
    }
}

/// Whether `command` is enabled in `group_id`.
///
/// Fails open: a missing group, a missing override, or an unreadable store all
/// count as enabled.
pub async fn command_enabled(groups: &dyn GroupStore, group_id: i64, command: &str) -> bool {
    match groups.find_by_id(group_id).await {
        Ok(group) => group.is_command_enabled(&command.trim().to_lowercase()),
        Err(StoreError::NotFound(_)) => {
            debug!("Group {group_id} not found; treating /{command} as enabled");
            true
        }
        Err(e) => {
            warn!("Failed to load group {group_id} while checking /{command}: {e}");
            true
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Permission;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct BrokenStore;

    #[async_trait]
    impl UserStore for BrokenStore {
        async fn find_by_id(&self, _id: i64) -> Result<User, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }

        async fn save(&self, _user: &User) -> Result<(), StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
    }

    #[async_trait]
    impl GroupStore for BrokenStore {
        async fn find_by_id(&self, _id: i64) -> Result<Group, StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }

        async fn save(&self, _group: &Group) -> Result<(), StoreError> {
            Err(StoreError::Backend(anyhow::anyhow!("connection refused")))
        }
    }

    /// Finds nothing, counts saves, and refuses to persist
    #[derive(Default)]
    struct ReadOnlyStore {
        saves: AtomicUsize,
    }

    #[async_trait]
    impl UserStore for ReadOnlyStore {
        async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
            Err(StoreError::NotFound(id))
        }

        async fn save(&self, _user: &User) -> Result<(), StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            Err(StoreError::Backend(anyhow::anyhow!("read-only replica")))
        }
    }

    #[tokio::test]
    async fn test_ensure_user_creates_once() {
        let store = MemoryUserStore::new();

        let first = ensure_user(&store, 42).await.unwrap();
        assert_eq!(first.id, 42);
        assert_eq!(store.len(), 1);

        let second = ensure_user(&store, 42).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn test_ensure_user_keeps_existing_grants() {
        let store = MemoryUserStore::new();
        let mut user = User::new(42);
        user.grant(-100, Permission::Admin);
        store.save(&user).await.unwrap();

        let loaded = ensure_user(&store, 42).await.unwrap();
        assert_eq!(loaded.permission_in(-100), Permission::Admin);
    }

    #[tokio::test]
    async fn test_ensure_user_propagates_save_failure() {
        let store = ReadOnlyStore::default();
        let err = ensure_user(&store, 1).await.unwrap_err();
        assert!(!err.is_not_found());
        assert_eq!(store.saves.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_ensure_user_propagates_lookup_failure() {
        let err = ensure_user(&BrokenStore, 1).await.unwrap_err();
        assert!(err.to_string().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_command_enabled_fails_open() {
        let groups = MemoryGroupStore::new();
        assert!(command_enabled(&groups, -100, "ban").await);
        assert!(command_enabled(&BrokenStore, -100, "ban").await);

        let mut group = Group::new(-100, "mods");
        group.set_command_enabled("ban", false, 1);
        groups.save(&group).await.unwrap();

        assert!(!command_enabled(&groups, -100, "ban").await);
        assert!(command_enabled(&groups, -100, "kick").await);
        assert!(command_enabled(&groups, -200, "ban").await);
    }
}
