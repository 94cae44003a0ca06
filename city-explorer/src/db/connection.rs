use libsql::{Builder, Connection};
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};

use crate::config::DatabaseConfig;
use crate::error::Result;

use super::schema;

pub struct Database {
    pub(crate) db: Arc<libsql::Database>,
    /// `:memory:` only: each fresh connection would be its own empty database.
    shared: Option<Connection>,
    /// Serializes transactions on the shared connection.
    write_lock: Arc<Mutex<()>>,
    /// Per-connection pragmas only apply to local SQLite files.
    local: bool,
    pub(crate) busy_timeout_ms: u64,
    pub(crate) journal_mode: String,
    pub(crate) synchronous: String,
}

impl Database {
    pub async fn new(config: &DatabaseConfig) -> Result<Self> {
        let busy_timeout_ms = config.busy_timeout_ms;
        let journal_mode = normalize_journal_mode(&config.journal_mode).to_string();
        let synchronous = normalize_synchronous(&config.synchronous).to_string();

        let remote = config.url.starts_with("libsql://") || config.url.starts_with("https://");
        let in_memory = config.url == ":memory:";

        let db = if remote {
            if let Some(ref local_path) = config.local_path {
                Builder::new_remote_replica(
                    local_path,
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?
            } else {
                Builder::new_remote(
                    config.url.clone(),
                    config.auth_token.clone().unwrap_or_default(),
                )
                .build()
                .await?
            }
        } else if in_memory {
            Builder::new_local(":memory:").build().await?
        } else {
            let path = config.url.strip_prefix("file:").unwrap_or(&config.url);
            Builder::new_local(path).build().await?
        };

        let shared = if in_memory { Some(db.connect()?) } else { None };

        let database = Self {
            db: Arc::new(db),
            shared,
            write_lock: Arc::new(Mutex::new(())),
            local: !remote,
            busy_timeout_ms,
            journal_mode,
            synchronous,
        };
        if let Some(conn) = &database.shared {
            database.apply_connection_pragmas(conn).await;
        }
        database.configure_database().await?;
        database.init_schema().await?;

        Ok(database)
    }

    /// A connection with `busy_timeout` and `synchronous` applied.
    pub async fn connect(&self) -> Result<Connection> {
        if let Some(conn) = &self.shared {
            return Ok(conn.clone());
        }

        let conn = self.db.connect()?;
        if self.local {
            self.apply_connection_pragmas(&conn).await;
        }
        Ok(conn)
    }

    /// Held around multi-statement writes when every caller shares one connection.
    pub(crate) async fn lock_writes(&self) -> Option<MutexGuard<'_, ()>> {
        match self.shared {
            Some(_) => Some(self.write_lock.lock().await),
            None => None,
        }
    }

    async fn apply_connection_pragmas(&self, conn: &Connection) {
        let busy_timeout_sql = format!("PRAGMA busy_timeout = {}", self.busy_timeout_ms);
        if let Err(error) = conn.execute_batch(&busy_timeout_sql).await {
            tracing::warn!(
                busy_timeout_ms = self.busy_timeout_ms,
                error = %error,
                "Failed to set SQLite busy_timeout"
            );
        }

        let synchronous_sql = format!("PRAGMA synchronous = {}", self.synchronous);
        if let Err(error) = conn.execute_batch(&synchronous_sql).await {
            tracing::warn!(
                mode = %self.synchronous,
                error = %error,
                "Failed to set SQLite synchronous pragma"
            );
        }
    }

    async fn configure_database(&self) -> Result<()> {
        if !self.local {
            return Ok(());
        }
        let conn = self.connect().await?;

        let journal_sql = format!("PRAGMA journal_mode = {}", self.journal_mode);
        if let Err(error) = conn.execute_batch(&journal_sql).await {
            tracing::warn!(
                mode = %self.journal_mode,
                error = %error,
                "Failed to set SQLite journal_mode"
            );
        }

        Ok(())
    }

    async fn init_schema(&self) -> Result<()> {
        let conn = self.connect().await?;
        schema::init_schema(&conn).await?;
        Ok(())
    }

    pub async fn sync(&self) -> Result<()> {
        if let Ok(sync) = self.db.sync().await {
            tracing::info!("Database synced: {:?}", sync);
        }
        Ok(())
    }

    /// Round-trips a trivial query.
    pub async fn ping(&self) -> Result<()> {
        let conn = self.connect().await?;
        conn.query("SELECT 1", ()).await?.next().await?;
        Ok(())
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            db: Arc::clone(&self.db),
            shared: self.shared.clone(),
            write_lock: Arc::clone(&self.write_lock),
            local: self.local,
            busy_timeout_ms: self.busy_timeout_ms,
            journal_mode: self.journal_mode.clone(),
            synchronous: self.synchronous.clone(),
        }
    }
}

fn normalize_journal_mode(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "DELETE" => "DELETE",
        "TRUNCATE" => "TRUNCATE",
        "PERSIST" => "PERSIST",
        "MEMORY" => "MEMORY",
        "WAL" => "WAL",
        "OFF" => "OFF",
        _ => "WAL",
    }
}

fn normalize_synchronous(value: &str) -> &'static str {
    match value.trim().to_uppercase().as_str() {
        "OFF" => "OFF",
        "NORMAL" => "NORMAL",
        "FULL" => "FULL",
        "EXTRA" => "EXTRA",
        _ => "NORMAL",
    }
}
