//! Synchronized key-value store
//!
//! The core consumes exactly three operations: read a key with a default,
//! replace a key's value, and subscribe to change notifications. Values are
//! ordered lists of strings.

mod file;
mod memory;

pub use file::JsonFileStore;
pub use memory::MemoryStore;

use crate::error::StoreResult;
use crate::events::EventSource;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Storage area a store (and its notifications) belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageArea {
    /// Synchronized across the user's contexts
    #[default]
    Sync,
    /// Local to one context
    Local,
}

impl fmt::Display for StorageArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync => f.write_str("sync"),
            Self::Local => f.write_str("local"),
        }
    }
}

/// Old and new value of one changed key
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ValueChange {
    /// Value before the write, `None` if the key was absent
    pub old_value: Option<Vec<String>>,
    /// Value after the write, `None` if the key was removed
    pub new_value: Option<Vec<String>>,
}

/// Change notification: area plus every key the write touched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreChange {
    /// Area the write happened in
    pub area: StorageArea,
    /// Changed keys
    pub changes: BTreeMap<String, ValueChange>,
}

impl StoreChange {
    /// Notification for a single key
    #[must_use]
    pub fn single(
        area: StorageArea,
        key: impl Into<String>,
        old_value: Option<Vec<String>>,
        new_value: Option<Vec<String>>,
    ) -> Self {
        let mut changes = BTreeMap::new();
        changes.insert(
            key.into(),
            ValueChange {
                old_value,
                new_value,
            },
        );
        Self { area, changes }
    }

    /// Change for `key` if this notification carries one
    #[inline]
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ValueChange> {
        self.changes.get(key)
    }

    /// Changed key names
    pub fn changed_keys(&self) -> impl Iterator<Item = &str> {
        self.changes.keys().map(String::as_str)
    }
}

/// Persisted, synchronized key-value store
#[async_trait]
pub trait SyncStore: EventSource<StoreChange> + Send + Sync + fmt::Debug {
    /// Area this store writes to
    fn area(&self) -> StorageArea;

    /// Read `key`, returning `default` if it is absent
    async fn get(&self, key: &str, default: Vec<String>) -> StoreResult<Vec<String>>;

    /// Replace the value under `key` and notify subscribers
    async fn set(&self, key: &str, value: Vec<String>) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_change_lookup() {
        let change = StoreChange::single(
            StorageArea::Sync,
            "registeredEmails",
            None,
            Some(vec!["a@b.co".to_string()]),
        );
        assert_eq!(change.changed_keys().collect::<Vec<_>>(), vec!["registeredEmails"]);
        assert!(change.get("registeredEmails").unwrap().old_value.is_none());
        assert!(change.get("other").is_none());
    }

    #[test]
    fn area_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&StorageArea::Sync).unwrap(), "\"sync\"");
        assert_eq!(StorageArea::Local.to_string(), "local");
    }
}
