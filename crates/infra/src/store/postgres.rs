//! Postgres-backed user collection.
//!
//! Each user is one JSONB document in the `users` table, keyed by its UUID.
//! A `seq` column records insertion order for `list`.
//!
//! ## Error Mapping
//!
//! | SQLx Error | PostgreSQL Error Code | StoreError |
//! |------------|----------------------|------------|
//! | Database (unique violation) | `23505` | `Conflict` |
//! | Database (other) | Any other | `Database` |
//! | PoolClosed / PoolTimedOut / Io | N/A | `Unavailable` |
//! | Other | N/A | `Database` |

use serde_json::{Map, Value as JsonValue};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{PgPool, Row};
use tracing::instrument;

use userbase_core::{User, UserId, UserPatch};

use super::{StoreError, StoreResult, UserStore};

const CREATE_COLLECTION: &str = r#"
CREATE TABLE IF NOT EXISTS users (
    seq BIGSERIAL NOT NULL,
    id UUID PRIMARY KEY,
    doc JSONB NOT NULL
)
"#;

/// Postgres-backed user store.
///
/// Uses the SQLx connection pool, which is `Send + Sync` and cheap to clone.
/// Single-record writes are one statement each, so they are atomic at the
/// database; concurrent updates to the same id are last-write-wins.
#[derive(Debug, Clone)]
pub struct PostgresUserStore {
    pool: PgPool,
}

impl PostgresUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Open a connection pool against `url`.
    pub async fn connect(url: &str, max_connections: u32) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(url)
            .await
            .map_err(|e| map_sqlx_error("connect", e))?;
        Ok(Self::new(pool))
    }

    /// Create the `users` table if it does not exist yet.
    pub async fn ensure_collection(&self) -> StoreResult<()> {
        sqlx::query(CREATE_COLLECTION)
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ensure_collection", e))?;
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait::async_trait]
impl UserStore for PostgresUserStore {
    #[instrument(skip(self), err)]
    async fn list(&self) -> StoreResult<Vec<User>> {
        let rows = sqlx::query("SELECT doc FROM users ORDER BY seq ASC")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("list", e))?;

        rows.iter().map(decode_doc).collect()
    }

    #[instrument(skip(self, user), fields(user_id = %user.id), err)]
    async fn insert(&self, user: User) -> StoreResult<User> {
        let doc = serde_json::to_value(&user)?;
        sqlx::query("INSERT INTO users (id, doc) VALUES ($1, $2)")
            .bind(user.id.as_uuid())
            .bind(Json(doc))
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;
        Ok(user)
    }

    #[instrument(skip(self, id), fields(user_id = %id), err)]
    async fn get(&self, id: &UserId) -> StoreResult<User> {
        let row = sqlx::query("SELECT doc FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("get", e))?
            .ok_or(StoreError::NotFound)?;
        decode_doc(&row)
    }

    #[instrument(skip(self, id, patch), fields(user_id = %id), err)]
    async fn update(&self, id: &UserId, patch: &UserPatch) -> StoreResult<User> {
        patch.validate()?;

        // `||` overwrites top-level keys present in the patch and keeps the rest.
        let row = sqlx::query("UPDATE users SET doc = doc || $2 WHERE id = $1 RETURNING doc")
            .bind(id.as_uuid())
            .bind(Json(patch_document(patch)))
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("update", e))?
            .ok_or(StoreError::NotFound)?;
        decode_doc(&row)
    }

    #[instrument(skip(self, id), fields(user_id = %id), err)]
    async fn delete(&self, id: &UserId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn ping(&self) -> StoreResult<()> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(|e| map_sqlx_error("ping", e))?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("postgres pool closed");
    }
}

fn decode_doc(row: &sqlx::postgres::PgRow) -> StoreResult<User> {
    let Json(doc): Json<JsonValue> = row
        .try_get("doc")
        .map_err(|e| map_sqlx_error("decode_doc", e))?;
    Ok(serde_json::from_value(doc)?)
}

/// JSON object holding only the fields a patch supplies.
///
/// Phone normalization matches `User::apply`: blank or `null` clears it.
fn patch_document(patch: &UserPatch) -> JsonValue {
    let mut doc = Map::new();
    if let Some(name) = &patch.name {
        doc.insert("name".to_string(), JsonValue::String(name.clone()));
    }
    if let Some(username) = &patch.username {
        doc.insert("username".to_string(), JsonValue::String(username.clone()));
    }
    if let Some(email) = &patch.email {
        doc.insert("email".to_string(), JsonValue::String(email.clone()));
    }
    if let Some(phone) = &patch.phone {
        let value = phone
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .map(|p| JsonValue::String(p.to_string()))
            .unwrap_or(JsonValue::Null);
        doc.insert("phone".to_string(), value);
    }
    JsonValue::Object(doc)
}

fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = format!("{} failed: {}", operation, db_err.message());
            match db_err.code() {
                Some(code) if code.as_ref() == "23505" => StoreError::Conflict(msg),
                _ => StoreError::Database(msg),
            }
        }
        sqlx::Error::PoolClosed | sqlx::Error::PoolTimedOut => {
            StoreError::Unavailable(format!("connection pool unavailable in {}", operation))
        }
        sqlx::Error::Io(e) => StoreError::Unavailable(format!("io error in {}: {}", operation, e)),
        other => StoreError::Database(format!("sqlx error in {}: {}", operation, other)),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn empty_patch_is_empty_object() {
        assert_eq!(patch_document(&UserPatch::default()), json!({}));
    }

    #[test]
    fn patch_document_carries_only_supplied_fields() {
        let patch = UserPatch {
            name: Some("Updated Name".to_string()),
            phone: Some(Some("555".to_string())),
            ..UserPatch::default()
        };
        assert_eq!(
            patch_document(&patch),
            json!({ "name": "Updated Name", "phone": "555" })
        );
    }

    #[test]
    fn null_or_blank_phone_clears() {
        for phone in [None, Some("  ".to_string())] {
            let patch = UserPatch {
                phone: Some(phone),
                ..UserPatch::default()
            };
            assert_eq!(patch_document(&patch), json!({ "phone": null }));
        }
    }

    #[test]
    fn pool_errors_are_unavailable() {
        assert!(matches!(
            map_sqlx_error("get", sqlx::Error::PoolTimedOut),
            StoreError::Unavailable(_)
        ));
        assert!(matches!(
            map_sqlx_error("get", sqlx::Error::RowNotFound),
            StoreError::Database(_)
        ));
    }
}
