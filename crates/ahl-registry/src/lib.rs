//! AHL Registry
//!
//! The registered address set and everything that reads or grows it:
//!
//! - [`RegisteredAddress`] / [`AddressSet`]: normalized, case-insensitively
//!   unique addresses
//! - [`RegistryCache`]: in-memory mirror of the persisted set, replaced
//!   wholesale on load, on external change and on local merge
//! - [`MergeWriter`]: additive-only merge of harvested addresses
//! - [`parse_address_list`] / [`save_address_list`]: the editing surface's
//!   replace-all path
//!
//! # Data flow
//!
//! ```text
//! SyncStore ──load / StoreChange──▶ RegistryCache ──snapshot──▶ matching
//!     ▲                                   ▲
//!     └──────── set(existing ∪ new) ── MergeWriter ◀── harvested AddressSet
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

pub mod address;
pub mod cache;
pub mod error;
pub mod merge;
pub mod options;

pub use address::{AddressSet, RegisteredAddress};
pub use cache::RegistryCache;
pub use error::{RegistryError, RegistryResult};
pub use merge::{MergeOutcome, MergeWriter};
pub use options::{parse_address_list, save_address_list};

/// Store key holding the registered address list
pub const REGISTRY_KEY: &str = "registeredEmails";

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
