use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::Row;

use crate::repository::{KeyValueRepository, StorageError, StoredValue};

use super::SqliteRepository;

fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

fn conn<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Connection(e.to_string())
}

fn split(value: StoredValue) -> (Option<i64>, Option<DateTime<Utc>>) {
    match value {
        StoredValue::Integer(v) => (Some(v), None),
        StoredValue::Timestamp(t) => (None, Some(t)),
    }
}

fn map_value_row(key: &str, row: &sqlx::sqlite::SqliteRow) -> Result<StoredValue, StorageError> {
    let int_value: Option<i64> = row.try_get("int_value").map_err(ser)?;
    let timestamp_value: Option<DateTime<Utc>> = row.try_get("timestamp_value").map_err(ser)?;
    match (int_value, timestamp_value) {
        (Some(v), None) => Ok(StoredValue::Integer(v)),
        (None, Some(t)) => Ok(StoredValue::Timestamp(t)),
        _ => Err(StorageError::Serialization(format!(
            "key {key} has no single value"
        ))),
    }
}

#[async_trait]
impl KeyValueRepository for SqliteRepository {
    async fn get_value(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let row = sqlx::query(
            r"
                SELECT int_value, timestamp_value
                FROM kv_store
                WHERE key = ?1
            ",
        )
        .bind(key)
        .fetch_optional(&self.pool)
        .await
        .map_err(conn)?;

        row.map(|row| map_value_row(key, &row)).transpose()
    }

    async fn put_values(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError> {
        let updated_at = Utc::now();
        let mut tx = self.pool.begin().await.map_err(conn)?;

        for (key, value) in entries {
            let (int_value, timestamp_value) = split(*value);
            sqlx::query(
                r"
                    INSERT INTO kv_store (key, int_value, timestamp_value, updated_at)
                    VALUES (?1, ?2, ?3, ?4)
                    ON CONFLICT(key) DO UPDATE SET
                        int_value = excluded.int_value,
                        timestamp_value = excluded.timestamp_value,
                        updated_at = excluded.updated_at
                ",
            )
            .bind(*key)
            .bind(int_value)
            .bind(timestamp_value)
            .bind(updated_at)
            .execute(&mut *tx)
            .await
            .map_err(conn)?;
        }

        tx.commit().await.map_err(conn)?;
        Ok(())
    }

    async fn remove_values(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut tx = self.pool.begin().await.map_err(conn)?;
        for key in keys {
            sqlx::query("DELETE FROM kv_store WHERE key = ?1")
                .bind(*key)
                .execute(&mut *tx)
                .await
                .map_err(conn)?;
        }
        tx.commit().await.map_err(conn)?;
        Ok(())
    }
}
