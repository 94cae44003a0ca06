use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{
    Business, CachedRecord, Event, Location, LookupKey, Movie, ResourceKind, Trail, Weather,
};

use super::StoredRecord;

// ---------------------------------------------------------------------------
// Individual store traits
// ---------------------------------------------------------------------------

/// Read-through cache table for one record type.
#[async_trait]
pub trait CacheStore<R: StoredRecord>: Send + Sync {
    /// All rows stored under `key`, oldest first.
    async fn find_cached(&self, key: &LookupKey) -> Result<Vec<CachedRecord<R>>>;

    /// Persists `records` under `key` and returns them with their row ids.
    async fn insert_records(&self, key: &LookupKey, records: &[R])
        -> Result<Vec<CachedRecord<R>>>;
}

// ---------------------------------------------------------------------------
// Unified backend supertrait
// ---------------------------------------------------------------------------

/// A complete database backend: one cache table per resource plus lifecycle
/// operations.
#[async_trait]
pub trait DatabaseBackend:
    CacheStore<Location>
    + CacheStore<Weather>
    + CacheStore<Event>
    + CacheStore<Movie>
    + CacheStore<Business>
    + CacheStore<Trail>
{
    /// Sync with remote (e.g. Turso replication). No-op for local-only backends.
    async fn sync(&self) -> Result<()>;

    /// Fails if the store cannot answer a trivial query.
    async fn ping(&self) -> Result<()>;

    async fn location_exists(&self, id: i64) -> Result<bool>;

    /// Deletes rows of `kind` created before `before`. Returns the number removed.
    async fn delete_created_before(&self, kind: ResourceKind, before: DateTime<Utc>)
        -> Result<u64>;
}
