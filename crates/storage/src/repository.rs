use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A scalar persisted under a string key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoredValue {
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl StoredValue {
    #[must_use]
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            StoredValue::Integer(v) => Some(*v),
            StoredValue::Timestamp(_) => None,
        }
    }

    #[must_use]
    pub fn as_timestamp(&self) -> Option<DateTime<Utc>> {
        match self {
            StoredValue::Timestamp(t) => Some(*t),
            StoredValue::Integer(_) => None,
        }
    }
}

/// Flat key-value persistence for scalar settings and counters.
#[async_trait]
pub trait KeyValueRepository: Send + Sync {
    /// Read one key. Missing keys are `Ok(None)`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the backend cannot be read or the stored
    /// value is malformed.
    async fn get_value(&self, key: &str) -> Result<Option<StoredValue>, StorageError>;

    /// Write all entries atomically, replacing existing values.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the write fails; no entry is applied then.
    async fn put_values(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError>;

    /// Remove the given keys. Absent keys are ignored.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the delete fails.
    async fn remove_values(&self, keys: &[&str]) -> Result<(), StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    values: Arc<Mutex<HashMap<String, StoredValue>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self {
            values: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.lock().map(|guard| guard.len()).unwrap_or(0)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl KeyValueRepository for InMemoryRepository {
    async fn get_value(&self, key: &str) -> Result<Option<StoredValue>, StorageError> {
        let guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        Ok(guard.get(key).copied())
    }

    async fn put_values(&self, entries: &[(&str, StoredValue)]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for (key, value) in entries {
            guard.insert((*key).to_owned(), *value);
        }
        Ok(())
    }

    async fn remove_values(&self, keys: &[&str]) -> Result<(), StorageError> {
        let mut guard = self
            .values
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        for key in keys {
            guard.remove(*key);
        }
        Ok(())
    }
}

/// Repositories behind trait objects for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub values: Arc<dyn KeyValueRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let values: Arc<dyn KeyValueRepository> = Arc::new(InMemoryRepository::new());
        Self { values }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quiz_core::time::fixed_now;

    #[tokio::test]
    async fn missing_key_reads_as_none() {
        let repo = InMemoryRepository::new();
        assert_eq!(repo.get_value("gamesCount").await.unwrap(), None);
    }

    #[tokio::test]
    async fn put_then_get_and_remove() {
        let repo = InMemoryRepository::new();
        repo.put_values(&[
            ("gamesCount", StoredValue::Integer(3)),
            ("bestDate", StoredValue::Timestamp(fixed_now())),
        ])
        .await
        .unwrap();

        let count = repo.get_value("gamesCount").await.unwrap().unwrap();
        assert_eq!(count.as_integer(), Some(3));
        assert_eq!(count.as_timestamp(), None);
        let date = repo.get_value("bestDate").await.unwrap().unwrap();
        assert_eq!(date.as_timestamp(), Some(fixed_now()));

        repo.remove_values(&["gamesCount", "unknown"]).await.unwrap();
        assert_eq!(repo.get_value("gamesCount").await.unwrap(), None);
        assert_eq!(repo.len(), 1);
    }

    #[tokio::test]
    async fn storage_in_memory_shares_one_backend() {
        let storage = Storage::in_memory();
        let clone = storage.clone();
        storage
            .values
            .put_values(&[("totalCorrect", StoredValue::Integer(7))])
            .await
            .unwrap();
        let read = clone.values.get_value("totalCorrect").await.unwrap();
        assert_eq!(read, Some(StoredValue::Integer(7)));
    }
}
