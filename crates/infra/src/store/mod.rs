//! User collection storage boundary.
//!
//! `UserStore` is the only way the API touches persisted users. Records arrive
//! at `insert` already validated and carrying their id.

use std::sync::Arc;

use thiserror::Error;

use userbase_core::{DomainError, User, UserId, UserPatch};

use crate::config::{StoreBackend, StoreConfig};

pub mod in_memory;
pub mod postgres;

pub use in_memory::InMemoryUserStore;
pub use postgres::PostgresUserStore;

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operation error.
///
/// `NotFound` and `Domain` are caller-facing outcomes. The rest are
/// infrastructure failures.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("user not found")]
    NotFound,

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("database error: {0}")]
    Database(String),

    #[error("document serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Resolve a raw path segment into a `UserId`.
///
/// A malformed identifier cannot name any stored record, so it is reported as
/// `NotFound` rather than as a separate bad-id error.
pub fn parse_id(raw: &str) -> StoreResult<UserId> {
    raw.parse::<UserId>().map_err(|_| StoreError::NotFound)
}

/// Persistence for the single user collection.
///
/// Implementations must:
/// - return records from `list` in insertion order
/// - report absent ids as `StoreError::NotFound` from `get`, `update`, `delete`
/// - apply only the supplied fields of a patch and never change the id
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    async fn list(&self) -> StoreResult<Vec<User>>;

    async fn insert(&self, user: User) -> StoreResult<User>;

    async fn get(&self, id: &UserId) -> StoreResult<User>;

    async fn update(&self, id: &UserId, patch: &UserPatch) -> StoreResult<User>;

    async fn delete(&self, id: &UserId) -> StoreResult<()>;

    /// Backend liveness check.
    async fn ping(&self) -> StoreResult<()> {
        Ok(())
    }

    /// Release backend resources. Called once at shutdown.
    async fn close(&self) {}
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn list(&self) -> StoreResult<Vec<User>> {
        (**self).list().await
    }

    async fn insert(&self, user: User) -> StoreResult<User> {
        (**self).insert(user).await
    }

    async fn get(&self, id: &UserId) -> StoreResult<User> {
        (**self).get(id).await
    }

    async fn update(&self, id: &UserId, patch: &UserPatch) -> StoreResult<User> {
        (**self).update(id, patch).await
    }

    async fn delete(&self, id: &UserId) -> StoreResult<()> {
        (**self).delete(id).await
    }

    async fn ping(&self) -> StoreResult<()> {
        (**self).ping().await
    }

    async fn close(&self) {
        (**self).close().await
    }
}

/// Build the configured backend, ready to serve.
pub async fn connect(config: &StoreConfig) -> StoreResult<Arc<dyn UserStore>> {
    match &config.backend {
        StoreBackend::InMemory => {
            tracing::info!(backend = "in_memory", "user store ready");
            Ok(Arc::new(InMemoryUserStore::new()))
        }
        StoreBackend::Postgres { url, max_connections } => {
            let store = PostgresUserStore::connect(url, *max_connections).await?;
            store.ensure_collection().await?;
            tracing::info!(backend = "postgres", max_connections = *max_connections, "user store ready");
            Ok(Arc::new(store))
        }
    }
}
