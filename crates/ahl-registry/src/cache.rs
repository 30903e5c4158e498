//! In-memory mirror of the persisted registry
//!
//! The mirror is only ever replaced wholesale: on startup load, on an
//! external change notification, and after a successful local merge.
//! Readers take an `Arc` snapshot and never observe a half-updated set.

use crate::address::AddressSet;
use crate::error::RegistryResult;
use ahl_host::{StorageArea, StoreChange, SyncStore};
use parking_lot::RwLock;
use std::sync::Arc;

/// Read-mostly copy of the registered address set
#[derive(Debug, Default)]
pub struct RegistryCache {
    current: RwLock<Arc<AddressSet>>,
}

impl RegistryCache {
    /// Create an empty mirror
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Populate the mirror with one read of `key`
    ///
    /// Returns the number of addresses loaded.
    ///
    /// # Errors
    /// Propagates store read failures; the mirror is left untouched.
    pub async fn load(&self, store: &dyn SyncStore, key: &str) -> RegistryResult<usize> {
        let raw = store.get(key, Vec::new()).await?;
        let set = AddressSet::from_raw(&raw);
        let count = set.len();
        self.replace(set);
        tracing::info!("Loaded {} registered address(es) from '{}'", count, key);
        Ok(count)
    }

    /// Apply an external change notification
    ///
    /// Only changes to `key` in `area` are acted on. Returns `true` when the
    /// mirror was replaced.
    pub fn apply_change(&self, change: &StoreChange, area: StorageArea, key: &str) -> bool {
        if change.area != area {
            return false;
        }
        let Some(value) = change.get(key) else {
            return false;
        };

        let set = value
            .new_value
            .as_deref()
            .map(AddressSet::from_raw)
            .unwrap_or_default();
        tracing::info!("Registry changed externally: {} address(es)", set.len());
        self.replace(set);
        true
    }

    /// Replace the mirror wholesale
    pub fn replace(&self, set: AddressSet) {
        *self.current.write() = Arc::new(set);
    }

    /// Current mirror
    #[inline]
    #[must_use]
    pub fn snapshot(&self) -> Arc<AddressSet> {
        Arc::clone(&self.current.read())
    }

    /// Number of mirrored addresses
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.current.read().len()
    }

    /// Whether the mirror is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.current.read().is_empty()
    }
}
