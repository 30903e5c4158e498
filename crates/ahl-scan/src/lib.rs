//! AHL Scan
//!
//! Synchronous, single-pass work over a document snapshot:
//!
//! - [`AttributeScanner`]: finds elements carrying identity attributes and
//!   reads their candidate values in priority order
//! - [`MatchEngine`]: decides whether an element references a registered
//!   address and drives one highlight pass
//! - [`MarkerApplier`]: the only writer of the visual marker
//! - [`HarvestExtractor`]: pulls address-shaped substrings out of candidate
//!   values while the [`ViewContext`] allows it
//!
//! # Highlight pass
//!
//! ```text
//! registry empty? ──yes──▶ no-op
//!      │no
//! scan_root ─▶ matchable elements ─▶ marked? ─yes─▶ skip
//!                                       │no
//!                         candidates ⊇ registered address? ─yes─▶ mark
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod error;
pub mod harvest;
pub mod marker;
pub mod matcher;
pub mod scanner;

pub use error::ScanError;
pub use harvest::{HarvestExtractor, ViewContext, ADDRESS_PATTERN, SENT_VIEW_PREFIX};
pub use marker::MarkerApplier;
pub use matcher::{MatchEngine, PassStats};
pub use scanner::{AttributeScanner, ScanConfig};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
