use crate::db::connection::Database;
use crate::db::repository::RecordRepository;
use crate::db::traits::{CacheStore, DatabaseBackend};
use crate::db::StoredRecord;
use crate::error::{AppError, Result};
use crate::models::{CachedRecord, LookupKey, ResourceKind};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub struct LibSqlBackend {
    db: Database,
}

impl LibSqlBackend {
    pub fn new(db: Database) -> Self {
        Self { db }
    }
}

/// Cache reads and write-backs report failures as an unavailable store.
fn store_unavailable(error: AppError) -> AppError {
    match error {
        AppError::Database(e) => AppError::StoreUnavailable(e.to_string()),
        other => other,
    }
}

#[async_trait]
impl<R: StoredRecord + Clone> CacheStore<R> for LibSqlBackend {
    async fn find_cached(&self, key: &LookupKey) -> Result<Vec<CachedRecord<R>>> {
        let conn = self.db.connect().await.map_err(store_unavailable)?;
        RecordRepository::find_by_key(&conn, key)
            .await
            .map_err(store_unavailable)
    }

    async fn insert_records(
        &self,
        key: &LookupKey,
        records: &[R],
    ) -> Result<Vec<CachedRecord<R>>> {
        let conn = self.db.connect().await.map_err(store_unavailable)?;
        let _guard = self.db.lock_writes().await;
        RecordRepository::insert_batch(&conn, key, records)
            .await
            .map_err(store_unavailable)
    }
}

#[async_trait]
impl DatabaseBackend for LibSqlBackend {
    async fn sync(&self) -> Result<()> {
        self.db.sync().await
    }

    async fn ping(&self) -> Result<()> {
        self.db.ping().await
    }

    async fn location_exists(&self, id: i64) -> Result<bool> {
        let conn = self.db.connect().await?;
        RecordRepository::location_exists(&conn, id).await
    }

    async fn delete_created_before(
        &self,
        kind: ResourceKind,
        before: DateTime<Utc>,
    ) -> Result<u64> {
        let conn = self.db.connect().await?;
        let _guard = self.db.lock_writes().await;
        RecordRepository::delete_created_before(&conn, kind, before).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DatabaseConfig;
    use crate::models::{Business, Location};
    use tempfile::TempDir;

    async fn setup_test_db() -> (LibSqlBackend, TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let config =
            DatabaseConfig::local(format!("file:{}", dir.path().join("cache.db").display()));
        let db = Database::new(&config)
            .await
            .expect("Failed to create database");

        (LibSqlBackend::new(db), dir)
    }

    #[tokio::test]
    async fn test_cached_rows_survive_new_connections() {
        let (backend, _dir) = setup_test_db().await;
        let location = Location {
            search_query: "portland".into(),
            formatted_query: Some("Portland, OR, USA".into()),
            latitude: 45.5,
            longitude: -122.6,
        };
        let key = LookupKey::SearchQuery("portland".into());

        let stored = CacheStore::<Location>::insert_records(&backend, &key, &[location.clone()])
            .await
            .unwrap();
        let id = stored[0].id.unwrap();

        let found = CacheStore::<Location>::find_cached(&backend, &key)
            .await
            .unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].record, location);
        assert!(backend.location_exists(id).await.unwrap());
        backend.ping().await.unwrap();
    }

    #[tokio::test]
    async fn test_empty_batch_stores_nothing() {
        let (backend, _dir) = setup_test_db().await;
        let key = LookupKey::LocationId(1);

        let stored = CacheStore::<Business>::insert_records(&backend, &key, &[])
            .await
            .unwrap();
        assert!(stored.is_empty());
        assert!(CacheStore::<Business>::find_cached(&backend, &key)
            .await
            .unwrap()
            .is_empty());
    }

    fn cafe(name: &str) -> Business {
        Business {
            name: Some(name.into()),
            image_url: None,
            price: None,
            rating: Some(4.0),
            url: None,
        }
    }

    async fn insert_portland(backend: &LibSqlBackend) -> i64 {
        let stored = CacheStore::<Location>::insert_records(
            backend,
            &LookupKey::SearchQuery("portland".into()),
            &[Location {
                search_query: "portland".into(),
                formatted_query: None,
                latitude: 45.5,
                longitude: -122.6,
            }],
        )
        .await
        .unwrap();
        stored[0].id.unwrap()
    }

    #[tokio::test]
    async fn test_delete_created_before_only_touches_one_table() {
        let (backend, _dir) = setup_test_db().await;
        let key = LookupKey::LocationId(insert_portland(&backend).await);
        CacheStore::<Business>::insert_records(&backend, &key, &[cafe("Cafe")])
            .await
            .unwrap();

        let future = Utc::now() + chrono::Duration::seconds(5);
        assert_eq!(
            backend
                .delete_created_before(ResourceKind::Movie, future)
                .await
                .unwrap(),
            0
        );
        assert_eq!(
            backend
                .delete_created_before(ResourceKind::Business, future)
                .await
                .unwrap(),
            1
        );
    }

    #[tokio::test]
    async fn test_memory_backend_keeps_rows_between_calls() {
        let db = Database::new(&DatabaseConfig::local(":memory:"))
            .await
            .unwrap();
        let backend = LibSqlBackend::new(db);
        let key = LookupKey::LocationId(insert_portland(&backend).await);

        CacheStore::<Business>::insert_records(&backend, &key, &[cafe("A"), cafe("B")])
            .await
            .unwrap();

        let found = CacheStore::<Business>::find_cached(&backend, &key)
            .await
            .unwrap();
        assert_eq!(found.len(), 2);
        assert!(backend.location_exists(key.location_id().unwrap()).await.unwrap());
    }

    #[tokio::test]
    async fn test_failed_write_is_store_unavailable_and_keeps_nothing() {
        let (backend, _dir) = setup_test_db().await;
        let key = LookupKey::LocationId(insert_portland(&backend).await);
        backend
            .db
            .connect()
            .await
            .unwrap()
            .execute_batch(
                "CREATE TRIGGER reject_b BEFORE INSERT ON yelps WHEN NEW.name = 'B'
                 BEGIN SELECT RAISE(ABORT, 'rejected'); END;",
            )
            .await
            .unwrap();

        let result =
            CacheStore::<Business>::insert_records(&backend, &key, &[cafe("A"), cafe("B"), cafe("C")])
                .await;
        assert!(matches!(result, Err(AppError::StoreUnavailable(_))));

        let found = CacheStore::<Business>::find_cached(&backend, &key)
            .await
            .unwrap();
        assert!(found.is_empty());
    }
}
