//! JSON-file backed store
//!
//! The whole key space lives in one JSON object. Writes go through a
//! sibling temp file and a rename so a crash never leaves a torn file.

use super::{StorageArea, StoreChange, SyncStore};
use crate::error::{StoreError, StoreResult};
use crate::events::{EventSource, Publisher};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::path::{Path, PathBuf};
use tokio::sync::{broadcast, Mutex};

/// [`SyncStore`] persisted as a JSON object on disk
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    area: StorageArea,
    write_lock: Mutex<()>,
    changes: Publisher<StoreChange>,
}

impl JsonFileStore {
    /// Open (lazily) a store at `path`; a missing file reads as empty
    #[must_use]
    pub fn new(path: impl Into<PathBuf>, area: StorageArea) -> Self {
        Self {
            path: path.into(),
            area,
            write_lock: Mutex::new(()),
            changes: Publisher::new(),
        }
    }

    /// Backing file path
    #[inline]
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_map(&self) -> StoreResult<Map<String, Value>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(raw) if raw.trim().is_empty() => Ok(Map::new()),
            Ok(raw) => Ok(serde_json::from_str(&raw)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(Map::new()),
            Err(e) => Err(StoreError::io_error(&self.path, e)),
        }
    }

    async fn write_map(&self, map: &Map<String, Value>) -> StoreResult<()> {
        let raw = serde_json::to_string_pretty(map)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| StoreError::io_error(&tmp, e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| StoreError::io_error(&self.path, e))
    }

    fn decode(key: &str, value: Value) -> StoreResult<Vec<String>> {
        serde_json::from_value(value).map_err(|_| StoreError::InvalidValue {
            key: key.to_string(),
        })
    }
}

impl EventSource<StoreChange> for JsonFileStore {
    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.changes.subscribe()
    }
}

#[async_trait]
impl SyncStore for JsonFileStore {
    fn area(&self) -> StorageArea {
        self.area
    }

    async fn get(&self, key: &str, default: Vec<String>) -> StoreResult<Vec<String>> {
        match self.read_map().await?.remove(key) {
            Some(value) => Self::decode(key, value),
            None => Ok(default),
        }
    }

    async fn set(&self, key: &str, value: Vec<String>) -> StoreResult<()> {
        let _guard = self.write_lock.lock().await;

        let mut map = self.read_map().await?;
        let old = map
            .insert(key.to_string(), serde_json::to_value(&value)?)
            .and_then(|v| Self::decode(key, v).ok());
        self.write_map(&map).await?;

        tracing::debug!(
            "wrote {} value(s) under '{}' to {}",
            value.len(),
            key,
            self.path.display()
        );
        self.changes
            .publish(StoreChange::single(self.area, key, old, Some(value)));
        Ok(())
    }
}
