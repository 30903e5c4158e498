//! Additive merge of harvested addresses into the persisted registry
//!
//! A merge reads the store fresh, adds whatever is new, and writes the
//! full set back only if something was added. It never removes entries.

use crate::address::{AddressSet, RegisteredAddress};
use crate::cache::RegistryCache;
use crate::error::RegistryResult;
use ahl_host::SyncStore;

/// Result of one merge
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    /// Addresses that were not yet registered, in harvest order
    pub added: Vec<RegisteredAddress>,
}

impl MergeOutcome {
    /// Whether a write happened
    #[inline]
    #[must_use]
    pub fn changed(&self) -> bool {
        !self.added.is_empty()
    }
}

/// Deduplicating writer for harvested addresses
#[derive(Debug, Clone)]
pub struct MergeWriter {
    key: String,
}

impl MergeWriter {
    /// Writer for the list stored under `key`
    #[inline]
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    /// Merge `harvested` into the stored set
    ///
    /// # Workflow
    /// 1. Empty harvest: nothing is read or written
    /// 2. Read the stored list and normalize it
    /// 3. Add each harvested address not already present
    /// 4. If anything was added, write `existing ∪ new` once and replace
    ///    the mirror with the written set
    ///
    /// # Errors
    /// Store read or write failures. On a failed write the mirror is left
    /// untouched.
    pub async fn merge(
        &self,
        store: &dyn SyncStore,
        cache: &RegistryCache,
        harvested: &AddressSet,
    ) -> RegistryResult<MergeOutcome> {
        if harvested.is_empty() {
            return Ok(MergeOutcome::default());
        }

        let raw = store.get(&self.key, Vec::new()).await?;
        let mut merged = AddressSet::from_raw(&raw);

        let mut outcome = MergeOutcome::default();
        for address in harvested {
            if merged.insert(address.clone()) {
                tracing::info!("Collected new address: {}", address);
                outcome.added.push(address.clone());
            }
        }

        if !outcome.changed() {
            tracing::debug!("Harvest of {} address(es) added nothing", harvested.len());
            return Ok(outcome);
        }

        store.set(&self.key, merged.to_vec()).await?;
        cache.replace(merged);
        Ok(outcome)
    }
}
