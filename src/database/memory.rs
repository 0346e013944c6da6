//! In-process user and group stores backed by DashMap

use async_trait::async_trait;
use dashmap::DashMap;

use super::{GroupStore, UserStore};
use crate::core::{Group, StoreError, User};

#[derive(Default)]
pub struct MemoryUserStore {
    users: DashMap<i64, User>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: i64) -> Result<User, StoreError> {
        self.users
            .get(&id)
            .map(|user| user.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, user: &User) -> Result<(), StoreError> {
        self.users.insert(user.id, user.clone());
        Ok(())
    }
}

#[derive(Default)]
pub struct MemoryGroupStore {
    groups: DashMap<i64, Group>,
}

impl MemoryGroupStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

#[async_trait]
impl GroupStore for MemoryGroupStore {
    async fn find_by_id(&self, id: i64) -> Result<Group, StoreError> {
        self.groups
            .get(&id)
            .map(|group| group.clone())
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, group: &Group) -> Result<(), StoreError> {
        self.groups.insert(group.id, group.clone());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Permission;

    #[tokio::test]
    async fn test_user_roundtrip_and_not_found() {
        let store = MemoryUserStore::new();
        assert!(store.find_by_id(1).await.unwrap_err().is_not_found());

        let mut user = User::new(1);
        user.grant(-100, Permission::Owner);
        store.save(&user).await.unwrap();

        let loaded = store.find_by_id(1).await.unwrap();
        assert_eq!(loaded.permission_in(-100), Permission::Owner);
    }

    #[tokio::test]
    async fn test_group_save_overwrites() {
        let store = MemoryGroupStore::new();
        let mut group = Group::new(-100, "first");
        store.save(&group).await.unwrap();

        group.title = "renamed".to_string();
        store.save(&group).await.unwrap();

        assert_eq!(store.len(), 1);
        assert_eq!(store.find_by_id(-100).await.unwrap().title, "renamed");
    }
}
