use std::sync::Arc;

use crate::config::CacheConfig;
use crate::db::DatabaseBackend;
use crate::error::Result;
use crate::models::ResourceKind;
use chrono::Utc;
use tracing::{debug, error, info};

/// Background task removing cached rows that have outlived their freshness window
#[derive(Clone)]
pub struct StaleRowSweeper {
    db: Arc<dyn DatabaseBackend>,
    cache: CacheConfig,
}

impl StaleRowSweeper {
    pub fn new(db: Arc<dyn DatabaseBackend>, cache: CacheConfig) -> Self {
        Self { db, cache }
    }

    /// Run a single sweep over every expiring table
    ///
    /// Continues with the next table if one delete fails.
    /// Returns the number of rows removed.
    pub async fn run_once(&self) -> Result<u64> {
        info!("Starting stale row sweep");

        let now = Utc::now();
        let mut removed = 0u64;
        let mut error_count = 0;

        for kind in ResourceKind::ALL {
            let Some(window) = self.cache.window(kind) else {
                continue;
            };
            let Ok(window) = chrono::Duration::from_std(window) else {
                continue;
            };

            match self.db.delete_created_before(kind, now - window).await {
                Ok(count) => {
                    debug!(kind = %kind, rows = count, "Swept stale rows");
                    removed += count;
                }
                Err(e) => {
                    error!("Failed to sweep {} rows: {}", kind, e);
                    error_count += 1;
                }
            }
        }

        info!(
            "Stale row sweep complete: {} removed, {} errors",
            removed, error_count
        );

        Ok(removed)
    }

    /// Sweep interval in seconds; 0 means disabled
    pub fn interval_secs(&self) -> u64 {
        self.cache.sweep_interval_secs
    }
}
