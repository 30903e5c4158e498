//! Passive harvesting of address-shaped substrings
//!
//! Harvesting only runs while the location fragment says the user is in the
//! sent-mail view. It reads every scanned element, marked or not, and
//! collects each non-overlapping address-shaped match.

use crate::error::ScanError;
use crate::scanner::AttributeScanner;
use ahl_host::Dom;
use ahl_registry::{AddressSet, RegisteredAddress};
use once_cell::sync::Lazy;
use regex::Regex;

/// Case-insensitive `local-part@domain.tld` shape
pub const ADDRESS_PATTERN: &str = r"(?i)[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}";

/// Fragment prefix of the sent-mail view
pub const SENT_VIEW_PREFIX: &str = "sent";

static ADDRESS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(ADDRESS_PATTERN).expect("address pattern is valid"));

/// Navigation-derived harvesting gate, recomputed on every use
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewContext {
    harvesting_eligible: bool,
}

impl ViewContext {
    /// Derive the context from a fragment (leading `#` optional)
    #[must_use]
    pub fn from_fragment(fragment: &str, prefix: &str) -> Self {
        let fragment = fragment.strip_prefix('#').unwrap_or(fragment);
        Self {
            harvesting_eligible: fragment.starts_with(prefix),
        }
    }

    /// Derive the context from a document's current location
    pub fn of<D: Dom + ?Sized>(dom: &D, prefix: &str) -> Self {
        Self::from_fragment(dom.location_fragment(), prefix)
    }

    /// Whether harvesting may run
    #[inline]
    #[must_use]
    pub fn is_harvesting_eligible(self) -> bool {
        self.harvesting_eligible
    }
}

/// Regex-driven address extractor
#[derive(Debug, Clone)]
pub struct HarvestExtractor {
    pattern: Regex,
    view_prefix: String,
}

impl HarvestExtractor {
    /// Extractor with a custom pattern and view prefix
    ///
    /// # Errors
    /// `ScanError::InvalidPattern` if `pattern` does not compile.
    pub fn new(pattern: &str, view_prefix: impl Into<String>) -> Result<Self, ScanError> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            view_prefix: view_prefix.into(),
        })
    }

    /// Every non-overlapping address-shaped match in `value`, lower-cased
    #[must_use]
    pub fn extract(&self, value: &str) -> Vec<String> {
        self.pattern
            .find_iter(value.trim())
            .map(|m| m.as_str().to_lowercase())
            .collect()
    }

    /// Harvest the document if the view allows it
    ///
    /// Returns the empty set outside the sent view or when nothing matches.
    pub fn harvest<D: Dom + ?Sized>(&self, dom: &D, scanner: &AttributeScanner) -> AddressSet {
        if !ViewContext::of(dom, &self.view_prefix).is_harvesting_eligible() {
            return AddressSet::new();
        }

        let root = scanner.scan_root(dom);
        let mut found = AddressSet::new();
        for (_, candidates) in scanner.scan(dom, root) {
            for value in candidates {
                found.extend(
                    self.extract(value)
                        .iter()
                        .filter_map(|m| RegisteredAddress::parse(m)),
                );
            }
        }

        tracing::debug!("Harvested {} distinct address(es)", found.len());
        found
    }
}

impl Default for HarvestExtractor {
    fn default() -> Self {
        Self {
            pattern: ADDRESS_RE.clone(),
            view_prefix: SENT_VIEW_PREFIX.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahl_host::{Document, DocumentSpec, ElementSpec};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn doc(fragment: &str, body: Vec<ElementSpec>) -> Document {
        DocumentSpec {
            fragment: fragment.to_string(),
            body,
        }
        .to_document()
        .unwrap()
    }

    #[test]
    fn extracts_display_name_form() {
        let extractor = HarvestExtractor::default();
        assert_eq!(
            extractor.extract("John Doe <john.doe+test@example.co.uk>"),
            vec!["john.doe+test@example.co.uk"]
        );
        assert!(extractor.extract("no address here").is_empty());
    }

    #[test]
    fn extracts_every_occurrence_lowercased() {
        let extractor = HarvestExtractor::default();
        assert_eq!(
            extractor.extract("To: A@X.io, b_c%d@sub.Example-Mail.org; bad@host"),
            vec!["a@x.io", "b_c%d@sub.example-mail.org"]
        );
    }

    #[test]
    fn view_context_needs_sent_prefix() {
        let eligible = |fragment| {
            ViewContext::from_fragment(fragment, SENT_VIEW_PREFIX).is_harvesting_eligible()
        };
        assert!(eligible("#sent"));
        assert!(eligible("sent/thread1"));
        assert!(!eligible("inbox/sent"));
        assert!(!eligible(""));
    }

    #[test]
    fn default_extractor_agrees_with_explicit_pattern() {
        let explicit = HarvestExtractor::new(ADDRESS_PATTERN, SENT_VIEW_PREFIX).unwrap();
        let value = "Cc: X@Y.io, z.w@q-r.example.com";
        assert_eq!(HarvestExtractor::default().extract(value), explicit.extract(value));
        assert_eq!(
            HarvestExtractor::default().extract(value),
            vec!["x@y.io", "z.w@q-r.example.com"]
        );
    }

    #[test]
    fn harvest_reads_marked_and_unmarked_elements() {
        let d = doc(
            "sent/thread1",
            vec![
                ElementSpec::new("span").with_attr("data-hovercard-id", "carol@example.org"),
                ElementSpec::new("span")
                    .with_attr("title", "Dave <Dave@Example.org>")
                    .with_class("gmail-address-highlight"),
                ElementSpec::new("div").with_attr("aria-label", "carol@example.org"),
            ],
        );
        let found = HarvestExtractor::default().harvest(&d, &AttributeScanner::default());

        assert_eq!(found.to_vec(), vec!["carol@example.org", "dave@example.org"]);
    }

    #[test]
    fn harvest_is_empty_outside_sent_view() {
        let d = doc(
            "inbox",
            vec![ElementSpec::new("span").with_attr("email", "carol@example.org")],
        );
        assert!(HarvestExtractor::default()
            .harvest(&d, &AttributeScanner::default())
            .is_empty());
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        assert!(matches!(
            HarvestExtractor::new("[", SENT_VIEW_PREFIX),
            Err(ScanError::InvalidPattern(_))
        ));
    }

    proptest! {
        #[test]
        fn non_sent_views_never_harvest(fragment in "[a-z/#]{0,12}", title in "[a-z@. <>]{0,30}") {
            prop_assume!(!fragment.trim_start_matches('#').starts_with("sent"));
            let d = doc(&fragment, vec![ElementSpec::new("span").with_attr("title", title)]);
            let found = HarvestExtractor::default().harvest(&d, &AttributeScanner::default());
            prop_assert!(found.is_empty());
        }
    }
}
