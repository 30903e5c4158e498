//! Normalized addresses and the insertion-ordered set that holds them

use crate::error::RegistryError;
use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A trimmed, lower-cased, non-empty address
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RegisteredAddress(String);

impl RegisteredAddress {
    /// Normalize `raw`; `None` if nothing is left after trimming
    #[must_use]
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_lowercase()))
        }
    }

    /// Normalized text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for RegisteredAddress {
    type Err = RegistryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or(RegistryError::EmptyAddress)
    }
}

impl TryFrom<String> for RegisteredAddress {
    type Error = RegistryError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<RegisteredAddress> for String {
    fn from(value: RegisteredAddress) -> Self {
        value.0
    }
}

impl AsRef<str> for RegisteredAddress {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RegisteredAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Set of registered addresses
///
/// Uniqueness is by normalized form; iteration follows insertion order so a
/// merged write keeps the stored order and appends new entries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddressSet {
    inner: IndexSet<RegisteredAddress>,
}

impl AddressSet {
    /// Empty set
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Normalize raw stored values, dropping empties and case-insensitive duplicates
    pub fn from_raw<I, S>(raw: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        raw.into_iter()
            .filter_map(|s| RegisteredAddress::parse(s.as_ref()))
            .collect()
    }

    /// Insert; returns `true` if the address was not present
    #[inline]
    pub fn insert(&mut self, address: RegisteredAddress) -> bool {
        self.inner.insert(address)
    }

    /// Case-insensitive membership test on a raw value
    #[must_use]
    pub fn contains_raw(&self, raw: &str) -> bool {
        RegisteredAddress::parse(raw).is_some_and(|a| self.contains(&a))
    }

    /// Membership test
    #[inline]
    #[must_use]
    pub fn contains(&self, address: &RegisteredAddress) -> bool {
        self.inner.contains(address)
    }

    /// Number of addresses
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    /// Whether the set is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Addresses in insertion order
    #[inline]
    pub fn iter(&self) -> impl Iterator<Item = &RegisteredAddress> {
        self.inner.iter()
    }

    /// Stored representation (ordered list of strings)
    #[must_use]
    pub fn to_vec(&self) -> Vec<String> {
        self.inner.iter().map(|a| a.0.clone()).collect()
    }
}

impl FromIterator<RegisteredAddress> for AddressSet {
    fn from_iter<T: IntoIterator<Item = RegisteredAddress>>(iter: T) -> Self {
        Self {
            inner: iter.into_iter().collect(),
        }
    }
}

impl Extend<RegisteredAddress> for AddressSet {
    fn extend<T: IntoIterator<Item = RegisteredAddress>>(&mut self, iter: T) {
        self.inner.extend(iter);
    }
}

impl<'a> IntoIterator for &'a AddressSet {
    type Item = &'a RegisteredAddress;
    type IntoIter = indexmap::set::Iter<'a, RegisteredAddress>;

    fn into_iter(self) -> Self::IntoIter {
        self.inner.iter()
    }
}
