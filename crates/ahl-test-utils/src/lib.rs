//! Testing utilities for the AHL workspace
//!
//! Shared document fixtures, store setup and lookups.

#![allow(missing_docs)]

use ahl_host::{
    DocumentSpec, Dom, ElementId, ElementSpec, EventSource, MemoryStore, SharedDocument,
    StorageArea, StoreChange, StoreResult, SyncStore,
};
use ahl_registry::REGISTRY_KEY;
use async_trait::async_trait;
use std::time::Duration;
use tokio::sync::broadcast;

pub const ALICE_TITLE: &str = "Alice Smith <alice@example.com>";
pub const BOB_TITLE: &str = "Bob Jones <bob@example.com>";
pub const CAROL: &str = "carol@example.org";

pub fn list(items: &[&str]) -> Vec<String> {
    items.iter().map(ToString::to_string).collect()
}

pub fn address_span(address: &str) -> ElementSpec {
    ElementSpec::new("span").with_attr("email", address)
}

/// Inbox with one registered and one unregistered sender
pub fn alice_bob_spec() -> DocumentSpec {
    DocumentSpec {
        fragment: "inbox".to_string(),
        body: vec![ElementSpec::new("div")
            .with_attr("role", "main")
            .with_child(ElementSpec::new("span").with_attr("title", ALICE_TITLE))
            .with_child(ElementSpec::new("span").with_attr("title", BOB_TITLE))],
    }
}

/// Sent thread mentioning a recipient that is not yet registered
pub fn sent_view_spec() -> DocumentSpec {
    DocumentSpec {
        fragment: "sent/thread1".to_string(),
        body: vec![ElementSpec::new("div")
            .with_attr("role", "main")
            .with_child(ElementSpec::new("span").with_attr("data-hovercard-id", CAROL))],
    }
}

pub fn shared_document(spec: &DocumentSpec) -> SharedDocument {
    SharedDocument::new(spec.to_document().unwrap())
}

pub fn registered_store(addresses: &[&str]) -> MemoryStore {
    MemoryStore::with_value(StorageArea::Sync, REGISTRY_KEY, list(addresses))
}

/// First element under `<body>` whose `name` attribute equals `value`
pub fn find_by_attr<D: Dom + ?Sized>(dom: &D, name: &str, value: &str) -> Option<ElementId> {
    dom.descendants(dom.body())
        .into_iter()
        .find(|&id| dom.attribute(id, name) == Some(value))
}

/// Advance paused time
pub async fn advance_ms(ms: u64) {
    tokio::time::sleep(Duration::from_millis(ms)).await;
}

/// [`MemoryStore`] whose writes take `delay` before they land
#[derive(Debug, Clone)]
pub struct SlowStore {
    inner: MemoryStore,
    delay: Duration,
}

impl SlowStore {
    pub fn new(inner: MemoryStore, delay_ms: u64) -> Self {
        Self {
            inner,
            delay: Duration::from_millis(delay_ms),
        }
    }
}

impl EventSource<StoreChange> for SlowStore {
    fn subscribe(&self) -> broadcast::Receiver<StoreChange> {
        self.inner.subscribe()
    }
}

#[async_trait]
impl SyncStore for SlowStore {
    fn area(&self) -> StorageArea {
        self.inner.area()
    }

    async fn get(&self, key: &str, default: Vec<String>) -> StoreResult<Vec<String>> {
        self.inner.get(key, default).await
    }

    async fn set(&self, key: &str, value: Vec<String>) -> StoreResult<()> {
        tokio::time::sleep(self.delay).await;
        self.inner.set(key, value).await
    }
}
