//! Publish/subscribe surface for host notifications
//!
//! Mutation observation, navigation and store-change subscription are the
//! same shape: a source that fans notifications out to subscribers. Each is
//! exposed through [`EventSource`] over a tokio broadcast channel.

use tokio::sync::broadcast;

/// Default capacity of each broadcast channel
pub const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Source of host notifications of type `E`
pub trait EventSource<E: Clone + Send + 'static> {
    /// Register a new receiver; it sees every event published after this call
    fn subscribe(&self) -> broadcast::Receiver<E>;
}

/// A child-list change somewhere under the document body
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomMutation {
    /// Number of nodes added by the change
    pub added: usize,
    /// Number of nodes removed by the change
    pub removed: usize,
}

impl DomMutation {
    /// Mutation that added `count` nodes
    #[inline]
    #[must_use]
    pub fn added(count: usize) -> Self {
        Self {
            added: count,
            removed: 0,
        }
    }

    /// Mutation that removed `count` nodes
    #[inline]
    #[must_use]
    pub fn removed(count: usize) -> Self {
        Self {
            added: 0,
            removed: count,
        }
    }
}

/// The location fragment changed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Navigation {
    /// Fragment before the change, without the leading `#`
    pub from: String,
    /// Fragment after the change, without the leading `#`
    pub to: String,
}

/// Publisher half shared by the host implementations
#[derive(Debug, Clone)]
pub(crate) struct Publisher<E> {
    sender: broadcast::Sender<E>,
}

impl<E: Clone + Send + 'static> Publisher<E> {
    pub(crate) fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self { sender }
    }

    /// Publish to current subscribers; no subscribers is not an error
    pub(crate) fn publish(&self, event: E) {
        let _ = self.sender.send(event);
    }

    pub(crate) fn subscribe(&self) -> broadcast::Receiver<E> {
        self.sender.subscribe()
    }
}
