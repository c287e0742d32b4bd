//! Profile document store
//!
//! Each user owns one JSON profile document plus a version counter. Writes
//! are expressed as a [`ProfileUpdate`] (field sets, set-union appends and
//! server timestamps) and applied atomically by the store. Passing an
//! expected version turns the update into a compare-and-swap.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use healthmate_shared::models::UserProfile;
use serde::Serialize;
use serde_json::{Map, Value};
use sqlx::PgPool;
use std::collections::HashMap;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::debug;
use uuid::Uuid;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Profile not found")]
    NotFound,

    #[error("Profile already exists")]
    AlreadyExists,

    #[error("Profile version conflict: expected {expected}, found {actual}")]
    Conflict { expected: i64, actual: i64 },

    #[error("Malformed profile document: {0}")]
    Malformed(String),

    #[error("Database error")]
    Database(#[from] sqlx::Error),
}

/// A stored document and the version it was read at
#[derive(Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct VersionedDocument {
    pub document: Value,
    pub version: i64,
}

impl VersionedDocument {
    pub fn profile(&self) -> Result<UserProfile, StoreError> {
        serde_json::from_value(self.document.clone()).map_err(|e| StoreError::Malformed(e.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq)]
enum FieldOp {
    Set(Value),
    /// Append unless an equal element is already present
    Union(Value),
    ServerTimestamp,
}

/// Field writes applied together in one store call
///
/// Paths are dot separated (`hydration_data.2025-05-10`); missing
/// intermediate objects are created.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProfileUpdate {
    ops: Vec<(String, FieldOp)>,
}

impl ProfileUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(mut self, path: impl Into<String>, value: impl Serialize) -> Result<Self, StoreError> {
        let value = to_json(value)?;
        self.ops.push((path.into(), FieldOp::Set(value)));
        Ok(self)
    }

    pub fn append(mut self, path: impl Into<String>, value: impl Serialize) -> Result<Self, StoreError> {
        let value = to_json(value)?;
        self.ops.push((path.into(), FieldOp::Union(value)));
        Ok(self)
    }

    pub fn server_timestamp(mut self, path: impl Into<String>) -> Self {
        self.ops.push((path.into(), FieldOp::ServerTimestamp));
        self
    }

    /// Apply every op to `document`, stamping server timestamps with `now`
    pub fn apply(&self, document: &mut Value, now: DateTime<Utc>) -> Result<(), StoreError> {
        let stamp = to_json(now)?;
        for (path, op) in &self.ops {
            let slot = field_mut(document, path)?;
            match op {
                FieldOp::Set(value) => *slot = value.clone(),
                FieldOp::ServerTimestamp => *slot = stamp.clone(),
                FieldOp::Union(value) => match slot {
                    Value::Array(items) => {
                        if !items.contains(value) {
                            items.push(value.clone());
                        }
                    }
                    other => *other = Value::Array(vec![value.clone()]),
                },
            }
        }
        Ok(())
    }
}

fn to_json(value: impl Serialize) -> Result<Value, StoreError> {
    serde_json::to_value(value).map_err(|e| StoreError::Malformed(e.to_string()))
}

fn field_mut<'a>(document: &'a mut Value, path: &str) -> Result<&'a mut Value, StoreError> {
    let mut current = document;
    for key in path.split('.') {
        if current.is_null() {
            *current = Value::Object(Map::new());
        }
        current = current
            .as_object_mut()
            .ok_or_else(|| StoreError::Malformed(format!("`{}` crosses a non-object field", path)))?
            .entry(key.to_string())
            .or_insert(Value::Null);
    }
    Ok(current)
}

/// Persistent home of profile documents
#[async_trait]
pub trait ProfileStore: Send + Sync {
    async fn get(&self, user_id: Uuid) -> Result<Option<VersionedDocument>, StoreError>;

    /// Insert the first version of a document
    async fn create(&self, user_id: Uuid, document: Value) -> Result<(), StoreError>;

    /// Apply `update` atomically and return the new version
    ///
    /// With `expected_version` set, fails with [`StoreError::Conflict`] when
    /// the stored version differs.
    async fn update(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError>;

    async fn health_check(&self) -> Result<(), StoreError>;
}

// ============================================================================
// PostgreSQL
// ============================================================================

/// Documents in the `profiles` table (JSONB)
pub struct PgProfileStore {
    pool: PgPool,
}

impl PgProfileStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProfileStore for PgProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<VersionedDocument>, StoreError> {
        let row = sqlx::query_as::<_, VersionedDocument>(
            r#"
            SELECT document, version
            FROM profiles
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row)
    }

    async fn create(&self, user_id: Uuid, document: Value) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            INSERT INTO profiles (user_id, document, version)
            VALUES ($1, $2, 1)
            ON CONFLICT (user_id) DO NOTHING
            "#,
        )
        .bind(user_id)
        .bind(document)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::AlreadyExists);
        }
        Ok(())
    }

    async fn update(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError> {
        let mut tx = self.pool.begin().await?;

        let current = sqlx::query_as::<_, VersionedDocument>(
            r#"
            SELECT document, version
            FROM profiles
            WHERE user_id = $1
            FOR UPDATE
            "#,
        )
        .bind(user_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(StoreError::NotFound)?;

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(StoreError::Conflict {
                    expected,
                    actual: current.version,
                });
            }
        }

        let mut document = current.document;
        update.apply(&mut document, Utc::now())?;
        let version = current.version + 1;

        sqlx::query(
            r#"
            UPDATE profiles
            SET document = $2, version = $3, updated_at = NOW()
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .bind(document)
        .bind(version)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        debug!(user_id = %user_id, version, "Profile updated");
        Ok(version)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}

// ============================================================================
// In-memory
// ============================================================================

/// Process-local documents, for development and tests
#[derive(Default)]
pub struct InMemoryProfileStore {
    documents: RwLock<HashMap<Uuid, VersionedDocument>>,
}

impl InMemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProfileStore for InMemoryProfileStore {
    async fn get(&self, user_id: Uuid) -> Result<Option<VersionedDocument>, StoreError> {
        Ok(self.documents.read().await.get(&user_id).cloned())
    }

    async fn create(&self, user_id: Uuid, document: Value) -> Result<(), StoreError> {
        let mut documents = self.documents.write().await;
        if documents.contains_key(&user_id) {
            return Err(StoreError::AlreadyExists);
        }
        documents.insert(user_id, VersionedDocument { document, version: 1 });
        Ok(())
    }

    async fn update(
        &self,
        user_id: Uuid,
        update: &ProfileUpdate,
        expected_version: Option<i64>,
    ) -> Result<i64, StoreError> {
        let mut documents = self.documents.write().await;
        let current = documents.get_mut(&user_id).ok_or(StoreError::NotFound)?;

        if let Some(expected) = expected_version {
            if expected != current.version {
                return Err(StoreError::Conflict {
                    expected,
                    actual: current.version,
                });
            }
        }

        // Apply to a copy so a failed op leaves the stored document untouched.
        let mut document = current.document.clone();
        update.apply(&mut document, Utc::now())?;
        current.document = document;
        current.version += 1;
        Ok(current.version)
    }

    async fn health_check(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 10, 9, 30, 0).unwrap()
    }

    #[test]
    fn test_apply_set_and_server_timestamp() {
        let mut doc = json!({"weight": 70.0});
        ProfileUpdate::new()
            .set("current_weight", 68.5)
            .unwrap()
            .server_timestamp("last_weight_update")
            .apply(&mut doc, now())
            .unwrap();

        assert_eq!(doc["current_weight"], 68.5);
        assert_eq!(doc["weight"], 70.0);
        assert_eq!(doc["last_weight_update"], json!(now()));
    }

    #[test]
    fn test_append_is_set_union() {
        let mut doc = json!({"run_history": [{"calories_burned": 300}]});
        ProfileUpdate::new()
            .append("run_history", json!({"calories_burned": 300}))
            .unwrap()
            .append("run_history", json!({"calories_burned": 420}))
            .unwrap()
            .apply(&mut doc, now())
            .unwrap();

        assert_eq!(
            doc["run_history"],
            json!([{"calories_burned": 300}, {"calories_burned": 420}])
        );
    }

    #[test]
    fn test_append_creates_missing_array() {
        let mut doc = json!({});
        ProfileUpdate::new()
            .append("screen_time_history", json!({"screen_time_hours": 3.0}))
            .unwrap()
            .apply(&mut doc, now())
            .unwrap();
        assert_eq!(doc["screen_time_history"].as_array().map(Vec::len), Some(1));
    }

    #[test]
    fn test_nested_set_creates_objects() {
        let mut doc = json!({"hydration_data": {"2025-05-09": {"cups": 4}}});
        ProfileUpdate::new()
            .set("hydration_data.2025-05-10", json!({"cups": 6}))
            .unwrap()
            .apply(&mut doc, now())
            .unwrap();

        assert_eq!(doc["hydration_data"]["2025-05-09"]["cups"], 4);
        assert_eq!(doc["hydration_data"]["2025-05-10"]["cups"], 6);
    }

    #[test]
    fn test_path_through_scalar_is_rejected() {
        let mut doc = json!({"age": 30});
        let result = ProfileUpdate::new()
            .set("age.years", 31)
            .unwrap()
            .apply(&mut doc, now());
        assert!(matches!(result, Err(StoreError::Malformed(_))));
    }

    #[tokio::test]
    async fn test_memory_store_versions() {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        store.create(user_id, json!({"age": 30})).await.unwrap();
        assert!(matches!(
            store.create(user_id, json!({})).await,
            Err(StoreError::AlreadyExists)
        ));

        let update = ProfileUpdate::new().set("age", 31).unwrap();
        assert_eq!(store.update(user_id, &update, Some(1)).await.unwrap(), 2);

        let stale = store.update(user_id, &update, Some(1)).await;
        assert!(matches!(stale, Err(StoreError::Conflict { expected: 1, actual: 2 })));

        let stored = store.get(user_id).await.unwrap().unwrap();
        assert_eq!(stored.version, 2);
        assert_eq!(stored.profile().unwrap().age, Some(31));
    }

    #[tokio::test]
    async fn test_memory_store_missing_profile() {
        let store = InMemoryProfileStore::new();
        let update = ProfileUpdate::new().server_timestamp("last_weight_update");
        assert!(matches!(
            store.update(Uuid::new_v4(), &update, None).await,
            Err(StoreError::NotFound)
        ));
        assert!(store.get(Uuid::new_v4()).await.unwrap().is_none());
    }
}
