//! AHL Host Surfaces
//!
//! Everything the highlighting core observes or writes to, modelled as
//! plain Rust collaborators:
//!
//! - **Document**: an element tree with attributes, classes and a location
//!   fragment, read and marked through the [`Dom`] trait
//! - **Events**: child-list mutations, navigation and store changes, all
//!   exposed through one [`EventSource`] abstraction
//! - **Store**: the synchronized key-value store ([`SyncStore`]) holding the
//!   registered address list
//!
//! # Architecture
//!
//! ```text
//! SharedDocument ──DomMutation / Navigation──▶ subscribers
//!        │
//!        └── Dom (scan_root, descendants, attribute, add_class, ...)
//!
//! SyncStore ──StoreChange──▶ subscribers
//!     ├── MemoryStore
//!     └── JsonFileStore
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod dom;
pub mod error;
pub mod events;
pub mod store;

pub use dom::{
    inject_style, Document, DocumentSpec, Dom, Element, ElementId, ElementSpec, MarkerStyle,
    SharedDocument,
};
pub use error::{HostError, StoreError, StoreResult};
pub use events::{DomMutation, EventSource, Navigation};
pub use store::{JsonFileStore, MemoryStore, StorageArea, StoreChange, SyncStore, ValueChange};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
