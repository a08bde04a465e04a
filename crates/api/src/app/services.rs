use std::sync::Arc;

use thiserror::Error;

use userbase_core::{DomainError, User, UserFields, UserId, UserPatch};
use userbase_infra::{parse_id, StoreError, UserStore};

/// Outcome of a failed service call, already sorted by how the API reports it.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error("{0}")]
    Validation(String),

    #[error("user not found")]
    NotFound,

    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store error: {0}")]
    Store(String),
}

impl From<StoreError> for ServiceError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound | StoreError::Domain(DomainError::NotFound) => Self::NotFound,
            StoreError::Domain(DomainError::Validation(msg)) => Self::Validation(msg),
            StoreError::Domain(DomainError::InvalidId(_)) => Self::NotFound,
            StoreError::Unavailable(msg) => Self::Unavailable(msg),
            other => Self::Store(other.to_string()),
        }
    }
}

impl From<DomainError> for ServiceError {
    fn from(err: DomainError) -> Self {
        StoreError::Domain(err).into()
    }
}

/// Resolve a `:id` path segment. Malformed ids are `NotFound`.
pub fn resolve_id(raw: &str) -> Result<UserId, ServiceError> {
    Ok(parse_id(raw)?)
}

/// Store handle plus the rules that sit in front of it.
///
/// Constructed once at startup and shared by every request.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn UserStore>,
}

impl AppServices {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self { store }
    }

    pub async fn list_users(&self) -> Result<Vec<User>, ServiceError> {
        Ok(self.store.list().await?)
    }

    /// Validate, assign a fresh id, persist. Invalid input never reaches the store.
    pub async fn create_user(&self, fields: UserFields) -> Result<User, ServiceError> {
        let user = User::create(UserId::new(), fields)?;
        let created = self.store.insert(user).await?;
        tracing::info!(user_id = %created.id, "user created");
        Ok(created)
    }

    pub async fn get_user(&self, id: &UserId) -> Result<User, ServiceError> {
        Ok(self.store.get(id).await?)
    }

    /// Supplied fields are checked before the lookup, so a blank required
    /// field is a validation failure whether or not the id exists.
    pub async fn update_user(&self, id: &UserId, patch: UserPatch) -> Result<User, ServiceError> {
        patch.validate()?;
        let updated = self.store.update(id, &patch).await?;
        tracing::info!(user_id = %id, "user updated");
        Ok(updated)
    }

    pub async fn delete_user(&self, id: &UserId) -> Result<(), ServiceError> {
        self.store.delete(id).await?;
        tracing::info!(user_id = %id, "user deleted");
        Ok(())
    }

    pub async fn store_ready(&self) -> Result<(), ServiceError> {
        Ok(self.store.ping().await?)
    }
}
