//! In-memory store with write accounting and fault injection

use super::{StorageArea, StoreChange, SyncStore};
use crate::error::{StoreError, StoreResult};
use crate::events::{EventSource, Publisher};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

#[derive(Debug, Default)]
struct Faults {
    fail_gets: usize,
    fail_sets: usize,
}

#[derive(Debug)]
struct Inner {
    area: StorageArea,
    values: Mutex<HashMap<String, Vec<String>>>,
    faults: Mutex<Faults>,
    reads: AtomicUsize,
    writes: AtomicUsize,
    changes: Publisher<StoreChange>,
}

/// In-memory [`SyncStore`]
///
/// Clones share state, so a clone handed to another "context" observes and
/// produces the same notifications as the original.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    inner: Arc<Inner>,
}

impl MemoryStore {
    /// Create an empty store in `area`
    #[must_use]
    pub fn new(area: StorageArea) -> Self {
        Self {
            inner: Arc::new(Inner {
                area,
                values: Mutex::new(HashMap::new()),
                faults: Mutex::new(Faults::default()),
                reads: AtomicUsize::new(0),
                writes: AtomicUsize::new(0),
                changes: Publisher::new(),
            }),
        }
    }

    /// Create a store pre-seeded with `key = value`, without notifying
    #[must_use]
    pub fn with_value(area: StorageArea, key: &str, value: Vec<String>) -> Self {
        let store = Self::new(area);
        store.inner.values.lock().insert(key.to_string(), value);
        store
    }

    /// Current value under `key`, bypassing accounting
    #[must_use]
    pub fn peek(&self, key: &str) -> Option<Vec<String>> {
        self.inner.values.lock().get(key).cloned()
    }

    /// Successful writes so far
    #[inline]
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    /// Successful reads so far
    #[inline]
    #[must_use]
    pub fn read_count(&self) -> usize {
        self.inner.reads.load(Ordering::SeqCst)
    }

    /// Make the next `n` reads fail
    pub fn fail_next_gets(&self, n: usize) {
        self.inner.faults.lock().fail_gets = n;
    }

    /// Make the next `n` writes fail
    pub fn fail_next_sets(&self, n: usize) {
        self.inner.faults.lock().fail_sets = n;
    }

    fn take_fault(counter: &mut usize) -> bool {
        if *counter > 0 {
            *counter -= 1;
            true
        } else {
            false
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StorageArea::Sync)
    }
}

impl EventSource<StoreChange> for MemoryStore {
    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.changes.subscribe()
    }
}

#[async_trait]
impl SyncStore for MemoryStore {
    fn area(&self) -> StorageArea {
        self.inner.area
    }

    async fn get(&self, key: &str, default: Vec<String>) -> StoreResult<Vec<String>> {
        if Self::take_fault(&mut self.inner.faults.lock().fail_gets) {
            return Err(StoreError::ReadRejected(format!("injected fault reading '{key}'")));
        }
        self.inner.reads.fetch_add(1, Ordering::SeqCst);
        Ok(self.peek(key).unwrap_or(default))
    }

    async fn set(&self, key: &str, value: Vec<String>) -> StoreResult<()> {
        if Self::take_fault(&mut self.inner.faults.lock().fail_sets) {
            return Err(StoreError::WriteRejected(format!("injected fault writing '{key}'")));
        }
        let old = self
            .inner
            .values
            .lock()
            .insert(key.to_string(), value.clone());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        self.inner
            .changes
            .publish(StoreChange::single(self.inner.area, key, old, Some(value)));
        Ok(())
    }
}
