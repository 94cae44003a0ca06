use chrono::{DateTime, Utc};
use libsql::{params, Connection, Value};

use crate::db::record::{parse_timestamp, StoredRecord};
use crate::error::{AppError, Result};
use crate::models::{CachedRecord, LookupKey, ResourceKind};

/// Generic table access for every [`StoredRecord`] type.
pub struct RecordRepository;

impl RecordRepository {
    fn key_value(key: &LookupKey) -> Value {
        match key {
            LookupKey::SearchQuery(query) => Value::from(query.clone()),
            LookupKey::LocationId(id) => Value::from(*id),
        }
    }

    /// `id, created_at, [location_id,] COLUMNS...` and the offset of the first data column.
    fn select_columns<R: StoredRecord>() -> (String, i32) {
        let mut columns = vec!["id", "created_at"];
        if R::KIND.is_dependent() {
            columns.push("location_id");
        }
        let offset = columns.len() as i32;
        columns.extend_from_slice(R::COLUMNS);
        (columns.join(", "), offset)
    }

    pub async fn find_by_key<R: StoredRecord>(
        conn: &Connection,
        key: &LookupKey,
    ) -> Result<Vec<CachedRecord<R>>> {
        let (columns, offset) = Self::select_columns::<R>();
        let sql = format!(
            "SELECT {columns} FROM {table} WHERE {key_column} = ?1 ORDER BY id ASC",
            table = R::KIND.table(),
            key_column = R::KIND.key_column(),
        );

        let mut rows = conn
            .query(&sql, libsql::params_from_iter(vec![Self::key_value(key)]))
            .await?;

        let mut results = Vec::new();
        while let Some(row) = rows.next().await? {
            results.push(Self::row_to_cached::<R>(&row, offset)?);
        }

        Ok(results)
    }

    pub async fn insert<R: StoredRecord>(
        conn: &Connection,
        key: &LookupKey,
        record: &R,
        created_at: DateTime<Utc>,
    ) -> Result<i64> {
        let mut columns: Vec<&str> = R::COLUMNS.to_vec();
        let mut values = record.to_values();
        if R::KIND.is_dependent() {
            columns.push("location_id");
            values.push(Self::key_value(key));
        }
        columns.push("created_at");
        values.push(Value::from(created_at.to_rfc3339()));

        let placeholders = (1..=values.len())
            .map(|i| format!("?{i}"))
            .collect::<Vec<_>>()
            .join(", ");

        // A location row is unique per search text; a racing insert refreshes it.
        let conflict = if R::KIND.is_dependent() {
            String::new()
        } else {
            let updates = R::COLUMNS
                .iter()
                .chain(std::iter::once(&"created_at"))
                .filter(|column| **column != R::KIND.key_column())
                .map(|column| format!("{column} = excluded.{column}"))
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                " ON CONFLICT({}) DO UPDATE SET {updates}",
                R::KIND.key_column()
            )
        };

        let sql = format!(
            "INSERT INTO {table} ({columns}) VALUES ({placeholders}){conflict} RETURNING id",
            table = R::KIND.table(),
            columns = columns.join(", "),
        );

        let mut rows = conn.query(&sql, libsql::params_from_iter(values)).await?;
        let row = rows.next().await?.ok_or_else(|| {
            AppError::Internal(format!("Insert into {} returned no id", R::KIND))
        })?;

        Ok(row.get(0)?)
    }

    /// Inserts every record in one transaction; on any failure nothing is kept.
    pub async fn insert_batch<R: StoredRecord + Clone>(
        conn: &Connection,
        key: &LookupKey,
        records: &[R],
    ) -> Result<Vec<CachedRecord<R>>> {
        if records.is_empty() {
            return Ok(Vec::new());
        }

        let created_at = Utc::now();
        let tx = conn.transaction().await?;
        let mut stored = Vec::with_capacity(records.len());
        for record in records {
            match Self::insert(&tx, key, record, created_at).await {
                Ok(id) => stored.push(CachedRecord {
                    id: Some(id),
                    location_id: key.location_id(),
                    created_at,
                    record: record.clone(),
                }),
                Err(e) => {
                    if let Err(rollback) = tx.rollback().await {
                        tracing::warn!(kind = %R::KIND, error = %rollback, "Rollback failed");
                    }
                    return Err(e);
                }
            }
        }
        tx.commit().await?;

        Ok(stored)
    }

    pub async fn location_exists(conn: &Connection, id: i64) -> Result<bool> {
        let mut rows = conn
            .query("SELECT 1 FROM locations WHERE id = ?1", params![id])
            .await?;
        Ok(rows.next().await?.is_some())
    }

    pub async fn delete_created_before(
        conn: &Connection,
        kind: ResourceKind,
        before: DateTime<Utc>,
    ) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE created_at < ?1", kind.table());
        let affected = conn.execute(&sql, params![before.to_rfc3339()]).await?;
        Ok(affected)
    }

    fn row_to_cached<R: StoredRecord>(row: &libsql::Row, offset: i32) -> Result<CachedRecord<R>> {
        Ok(CachedRecord {
            id: Some(row.get(0)?),
            created_at: parse_timestamp(&row.get::<String>(1)?)?,
            location_id: if R::KIND.is_dependent() {
                Some(row.get(2)?)
            } else {
                None
            },
            record: R::from_row(row, offset)?,
        })
    }
}
