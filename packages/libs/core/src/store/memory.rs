//! 메모리 저장소

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;

use crate::id::UserId;
use crate::user::User;

use super::{StoreError, UserStore};

/// `RwLock<HashMap>` 기반 사용자 저장소
#[derive(Debug, Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 사용자 추가 또는 교체
    pub fn insert(&self, user: User) -> Option<User> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.insert(user.id, user)
    }

    /// 사용자 삭제
    pub fn remove(&self, id: &UserId) -> Option<User> {
        let mut users = self.users.write().unwrap_or_else(|e| e.into_inner());
        users.remove(id)
    }

    pub fn len(&self) -> usize {
        self.users.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl FromIterator<User> for MemoryUserStore {
    fn from_iter<I: IntoIterator<Item = User>>(iter: I) -> Self {
        let users = iter.into_iter().map(|u| (u.id, u)).collect();
        Self {
            users: RwLock::new(users),
        }
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, StoreError> {
        let users = self.users.read().unwrap_or_else(|e| e.into_inner());
        Ok(users.get(id).cloned())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}
