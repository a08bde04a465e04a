use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use userbase_core::{User, UserId, UserPatch};

use super::{StoreError, StoreResult, UserStore};

/// In-memory user collection.
///
/// Intended for tests/dev. Records are kept in insertion order; lookups are
/// linear.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    users: RwLock<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> StoreResult<RwLockReadGuard<'_, Vec<User>>> {
        self.users
            .read()
            .map_err(|_| StoreError::Unavailable("user collection lock poisoned".to_string()))
    }

    fn write(&self) -> StoreResult<RwLockWriteGuard<'_, Vec<User>>> {
        self.users
            .write()
            .map_err(|_| StoreError::Unavailable("user collection lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn list(&self) -> StoreResult<Vec<User>> {
        Ok(self.read()?.clone())
    }

    async fn insert(&self, user: User) -> StoreResult<User> {
        let mut users = self.write()?;
        if users.iter().any(|u| u.id == user.id) {
            return Err(StoreError::Conflict(format!("user {} already exists", user.id)));
        }
        users.push(user.clone());
        Ok(user)
    }

    async fn get(&self, id: &UserId) -> StoreResult<User> {
        self.read()?
            .iter()
            .find(|u| u.id == *id)
            .cloned()
            .ok_or(StoreError::NotFound)
    }

    async fn update(&self, id: &UserId, patch: &UserPatch) -> StoreResult<User> {
        let mut users = self.write()?;
        let user = users
            .iter_mut()
            .find(|u| u.id == *id)
            .ok_or(StoreError::NotFound)?;
        user.apply(patch)?;
        Ok(user.clone())
    }

    async fn delete(&self, id: &UserId) -> StoreResult<()> {
        let mut users = self.write()?;
        let before = users.len();
        users.retain(|u| u.id != *id);
        if users.len() == before {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}
