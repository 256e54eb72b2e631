//! Core Store implementation
//!
//! One JSONL file per collection under the base directory. Mutations load
//! the collection, apply the change, and atomically rewrite the file via a
//! temp file + rename, so a crash mid-write never corrupts existing data.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::{debug, info};

use crate::Record;

/// Errors that can occur during store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error in collection '{collection}': {source}")]
    Json {
        collection: &'static str,
        #[source]
        source: serde_json::Error,
    },

    #[error("Record not found: {0}")]
    NotFound(String),
}

/// The record store
///
/// Cheap to construct; all state lives on disk.
pub struct Store {
    base_path: PathBuf,
}

impl Store {
    /// Open or create a store at the given path
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let base_path = path.as_ref().to_path_buf();
        fs::create_dir_all(&base_path)?;
        debug!(?base_path, "Opened store");
        Ok(Self { base_path })
    }

    /// Insert or replace a record by id
    pub fn upsert<T>(&self, record: &T) -> Result<(), StoreError>
    where
        T: Record + Serialize + DeserializeOwned + Clone,
    {
        let mut records = self.load::<T>()?;
        records.retain(|r| r.id() != record.id());
        records.push(record.clone());
        self.rewrite(&records)?;
        debug!(id = record.id(), collection = T::collection_name(), "Upserted record");
        Ok(())
    }

    /// Get a record by id
    pub fn get<T>(&self, id: &str) -> Result<T, StoreError>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        self.load::<T>()?
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    /// Delete a record by id
    pub fn delete<T>(&self, id: &str) -> Result<(), StoreError>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut records = self.load::<T>()?;
        let before = records.len();
        records.retain(|r| r.id() != id);
        if records.len() == before {
            return Err(StoreError::NotFound(id.to_string()));
        }
        self.rewrite(&records)?;
        info!(id, collection = T::collection_name(), "Deleted record");
        Ok(())
    }

    /// List all records, ordered by creation time descending (newest first)
    pub fn list<T>(&self) -> Result<Vec<T>, StoreError>
    where
        T: Record + Serialize + DeserializeOwned,
    {
        let mut records = self.load::<T>()?;
        records.sort_by_key(|r| std::cmp::Reverse(r.created_at()));
        Ok(records)
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.base_path.join(format!("{}.jsonl", collection))
    }

    fn load<T>(&self) -> Result<Vec<T>, StoreError>
    where
        T: Record + DeserializeOwned,
    {
        let path = self.collection_path(T::collection_name());
        if !path.exists() {
            return Ok(Vec::new());
        }

        let file = fs::File::open(&path)?;
        let reader = BufReader::new(file);

        let mut records = Vec::new();
        for line in reader.lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let record: T = serde_json::from_str(&line).map_err(|source| StoreError::Json {
                collection: T::collection_name(),
                source,
            })?;
            records.push(record);
        }
        Ok(records)
    }

    fn rewrite<T>(&self, records: &[T]) -> Result<(), StoreError>
    where
        T: Record + Serialize,
    {
        let path = self.collection_path(T::collection_name());
        let tmp_path = path.with_extension("jsonl.tmp");

        let mut file = fs::File::create(&tmp_path)?;
        for record in records {
            let line = serde_json::to_string(record).map_err(|source| StoreError::Json {
                collection: T::collection_name(),
                source,
            })?;
            writeln!(file, "{}", line)?;
        }
        file.sync_all()?;
        fs::rename(&tmp_path, &path)?;
        Ok(())
    }
}
