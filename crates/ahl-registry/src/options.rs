//! Editing surface: free-text address lists and the replace-all save
//!
//! This is the only write path that can shrink the registry.

use crate::error::RegistryResult;
use ahl_host::SyncStore;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

static SEPARATORS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[,、\s]+").expect("separator pattern is valid"));

/// Split free text on commas, the full-width comma and whitespace
///
/// Entries are trimmed, empties dropped, and later case-insensitive repeats
/// of an earlier entry removed. Spelling of the first occurrence is kept.
#[must_use]
pub fn parse_address_list(raw: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    SEPARATORS
        .split(raw)
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .filter(|entry| seen.insert(entry.to_lowercase()))
        .map(ToString::to_string)
        .collect()
}

/// Replace the stored list under `key` with the entries parsed from `raw`
///
/// Returns the list that was written.
pub async fn save_address_list(
    store: &dyn SyncStore,
    key: &str,
    raw: &str,
) -> RegistryResult<Vec<String>> {
    let entries = parse_address_list(raw);
    store.set(key, entries.clone()).await?;
    tracing::info!("Saved {} address(es) to '{}'", entries.len(), key);
    Ok(entries)
}
