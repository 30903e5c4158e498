//! AHL Core - address highlighter engine
//!
//! Ties the host document, the registry and the scan components together:
//!
//! - Observes child-list mutations, navigations and registry changes
//! - Debounces them into highlight and harvest passes
//! - Merges harvested addresses back into the persisted registry
//!
//! # Example
//!
//! ```rust,ignore
//! use ahl_core::{EngineConfig, HighlightEngine};
//! use ahl_host::{Document, MemoryStore, SharedDocument};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let document = SharedDocument::new(Document::new());
//! let engine = HighlightEngine::new(
//!     EngineConfig::new(),
//!     document.clone(),
//!     Arc::new(MemoryStore::default()),
//! )?;
//! engine.start().await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod config;
pub mod engine;
pub mod error;
pub mod report;
pub mod scheduler;

pub use config::{EngineConfig, ScheduleDelays, TaskDelays};
pub use engine::{EngineStats, HighlightEngine};
pub use error::{EngineError, EngineResult};
pub use report::{MarkedElement, ScanReport};
pub use scheduler::{ChangeScheduler, Debouncer, TaskKind, TaskRunner};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
