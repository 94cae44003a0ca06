use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{debug, error, info, warn};

use crate::db::{CacheStore, DatabaseBackend, StoredRecord};
use crate::error::{AppError, Result};
use crate::models::{CachedRecord, Lookup, LookupKey};
use crate::providers::{Cardinality, ResourceProvider};

use super::SingleFlight;

/// Lookaside cache in front of one provider.
///
/// Cached rows for a key are served as-is. On a miss the provider is called
/// once, every item is normalized, and the records are written back before
/// being returned. A failed write-back is logged and the fetched records are
/// still returned (with no row id).
pub struct LookasideResolver<P, S: ?Sized = dyn DatabaseBackend> {
    provider: P,
    store: Arc<S>,
    fetch_timeout: Duration,
    freshness: Option<Duration>,
    flights: Option<SingleFlight<LookupKey>>,
}

impl<P, S> LookasideResolver<P, S>
where
    P: ResourceProvider,
    P::Record: StoredRecord,
    S: CacheStore<P::Record> + ?Sized,
{
    pub fn new(provider: P, store: Arc<S>, fetch_timeout: Duration) -> Self {
        Self {
            provider,
            store,
            fetch_timeout,
            freshness: None,
            flights: None,
        }
    }

    /// Ignore cached rows older than `window`.
    pub fn with_freshness(mut self, window: Option<Duration>) -> Self {
        self.freshness = window;
        self
    }

    /// Serialize concurrent resolutions of the same key.
    pub fn with_single_flight(mut self, enabled: bool) -> Self {
        self.flights = enabled.then(SingleFlight::new);
        self
    }

    /// Resolve every record for `request`, from cache when possible.
    pub async fn resolve(&self, request: &P::Request) -> Result<Vec<CachedRecord<P::Record>>> {
        let key = request.lookup_key();
        let kind = self.provider.kind();

        if let Some(rows) = self.cached(&key).await? {
            return Ok(rows);
        }

        let _guard = match &self.flights {
            Some(flights) => {
                let guard = flights.acquire(key.clone()).await;
                // Another caller may have filled the cache while we waited.
                if let Some(rows) = self.cached(&key).await? {
                    return Ok(rows);
                }
                Some(guard)
            }
            None => None,
        };

        info!(kind = %kind, key = %key, provider = self.provider.name(), "Fetching from provider");

        let records = self.fetch_normalized(request).await.map_err(|e| {
            error!(kind = %kind, key = %key, error = %e, "Resolution failed");
            e
        })?;

        Ok(self.write_back(&key, records).await)
    }

    /// Resolve a single-record resource.
    pub async fn resolve_one(&self, request: &P::Request) -> Result<CachedRecord<P::Record>> {
        self.resolve(request).await?.into_iter().next().ok_or_else(|| {
            AppError::provider_malformed(self.provider.name(), "no usable result")
        })
    }

    async fn cached(&self, key: &LookupKey) -> Result<Option<Vec<CachedRecord<P::Record>>>> {
        let kind = self.provider.kind();
        let rows = self.store.find_cached(key).await.map_err(|e| {
            error!(kind = %kind, key = %key, error = %e, "Cache read failed");
            e
        })?;

        let total = rows.len();
        let now = Utc::now();
        let fresh: Vec<_> = rows
            .into_iter()
            .filter(|row| row.is_fresh(self.freshness, now))
            .collect();

        if fresh.is_empty() {
            debug!(kind = %kind, key = %key, stale = total, "Cache miss");
            return Ok(None);
        }

        debug!(kind = %kind, key = %key, rows = fresh.len(), "Serving from cache");
        Ok(Some(fresh))
    }

    async fn fetch_normalized(&self, request: &P::Request) -> Result<Vec<P::Record>> {
        let provider = self.provider.name();
        let raw = match tokio::time::timeout(self.fetch_timeout, self.provider.fetch(request)).await
        {
            Ok(result) => result?,
            Err(_) => {
                return Err(AppError::ProviderTimeout {
                    provider,
                    after_secs: self.fetch_timeout.as_secs(),
                })
            }
        };

        let raw = match self.provider.cardinality() {
            Cardinality::One => match raw.into_iter().next() {
                Some(first) => vec![first],
                None => return Err(AppError::provider_malformed(provider, "no usable result")),
            },
            Cardinality::Many => raw,
        };

        raw.into_iter()
            .map(|item| self.provider.normalize(request, item))
            .collect()
    }

    async fn write_back(
        &self,
        key: &LookupKey,
        records: Vec<P::Record>,
    ) -> Vec<CachedRecord<P::Record>> {
        let kind = self.provider.kind();
        if records.is_empty() {
            debug!(kind = %kind, key = %key, "Provider returned no items");
            return Vec::new();
        }

        match self.store.insert_records(key, &records).await {
            Ok(stored) => {
                debug!(kind = %kind, key = %key, rows = stored.len(), "Stored records");
                stored
            }
            Err(e) => {
                warn!(kind = %kind, key = %key, error = %e, "Write-back failed; returning unsaved records");
                let created_at = Utc::now();
                records
                    .into_iter()
                    .map(|record| CachedRecord {
                        id: None,
                        location_id: key.location_id(),
                        created_at,
                        record,
                    })
                    .collect()
            }
        }
    }
}
