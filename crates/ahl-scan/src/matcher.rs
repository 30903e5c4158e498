//! Registered-address matching and the highlight pass
//!
//! A candidate matches when some registered address occurs *inside* it
//! (case-insensitively). The direction is fixed: a short registered address
//! also matches inside a longer, unrelated value, e.g. `al@x.com` inside
//! `real@x.com`.

use crate::marker::MarkerApplier;
use crate::scanner::AttributeScanner;
use ahl_host::{Dom, ElementId};
use ahl_registry::AddressSet;

/// Counters for one highlight pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassStats {
    /// Matchable elements looked at
    pub inspected: usize,
    /// Elements skipped because they were already marked
    pub already_marked: usize,
    /// Elements newly marked by this pass
    pub marked: usize,
}

/// Decides which elements reference a registered address
#[derive(Debug, Clone, Default)]
pub struct MatchEngine {
    scanner: AttributeScanner,
    marker: MarkerApplier,
}

impl MatchEngine {
    /// Create an engine over a scanner and a marker
    #[inline]
    #[must_use]
    pub fn new(scanner: AttributeScanner, marker: MarkerApplier) -> Self {
        Self { scanner, marker }
    }

    /// The scanner used by passes
    #[inline]
    #[must_use]
    pub fn scanner(&self) -> &AttributeScanner {
        &self.scanner
    }

    /// The marker used by passes
    #[inline]
    #[must_use]
    pub fn marker(&self) -> &MarkerApplier {
        &self.marker
    }

    /// Whether any registered address is a substring of any candidate
    #[must_use]
    pub fn is_match(candidates: &[&str], registry: &AddressSet) -> bool {
        if candidates.is_empty() {
            return false;
        }
        let lowered: Vec<String> = candidates.iter().map(|c| c.to_lowercase()).collect();
        registry
            .iter()
            .any(|reg| lowered.iter().any(|c| c.contains(reg.as_str())))
    }

    /// Match decision for one element; marked elements never match again
    pub fn should_mark<D: Dom + ?Sized>(
        &self,
        dom: &D,
        id: ElementId,
        registry: &AddressSet,
    ) -> bool {
        if self.marker.is_marked(dom, id) {
            return false;
        }
        Self::is_match(&self.scanner.candidates(dom, id), registry)
    }

    /// Scan the document and mark every unmarked matching element
    ///
    /// An empty registry short-circuits before any element is inspected.
    pub fn run_pass<D: Dom + ?Sized>(&self, dom: &mut D, registry: &AddressSet) -> PassStats {
        let mut stats = PassStats::default();
        if registry.is_empty() {
            return stats;
        }

        let root = self.scanner.scan_root(dom);
        let mut hits = Vec::new();
        for id in self.scanner.matchable(dom, root) {
            stats.inspected += 1;
            if self.should_mark(dom, id, registry) {
                hits.push(id);
            } else if self.marker.is_marked(dom, id) {
                stats.already_marked += 1;
            }
        }

        for id in hits {
            if self.marker.apply(dom, id) {
                stats.marked += 1;
            }
        }

        tracing::debug!(
            "Highlight pass: {} inspected, {} already marked, {} newly marked",
            stats.inspected,
            stats.already_marked,
            stats.marked
        );
        stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahl_host::{Document, DocumentSpec, ElementSpec};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn doc(body: Vec<ElementSpec>) -> Document {
        DocumentSpec {
            fragment: String::new(),
            body,
        }
        .to_document()
        .unwrap()
    }

    fn marked(engine: &MatchEngine, d: &Document) -> Vec<ElementId> {
        d.descendants(d.body())
            .into_iter()
            .filter(|id| engine.marker().is_marked(d, *id))
            .collect()
    }

    #[test]
    fn marks_only_registered_addresses() {
        let mut d = doc(vec![
            ElementSpec::new("span").with_attr("title", "Alice Smith <alice@example.com>"),
            ElementSpec::new("span").with_attr("title", "Bob Jones <bob@example.com>"),
        ]);
        let alice = d.descendants(d.body())[0];
        let engine = MatchEngine::default();
        let registry = AddressSet::from_raw(["alice@example.com"]);

        let stats = engine.run_pass(&mut d, &registry);

        assert_eq!(stats.marked, 1);
        assert_eq!(marked(&engine, &d), vec![alice]);
    }

    #[test]
    fn empty_registry_inspects_nothing() {
        let mut d = doc(vec![ElementSpec::new("span").with_attr("email", "a@x.io")]);
        let engine = MatchEngine::default();

        let stats = engine.run_pass(&mut d, &AddressSet::new());

        assert_eq!(stats, PassStats::default());
        assert!(marked(&engine, &d).is_empty());
    }

    #[test]
    fn second_pass_is_a_no_op() {
        let mut d = doc(vec![
            ElementSpec::new("div").with_attr("email", "A@X.io"),
            ElementSpec::new("span").with_attr("aria-label", "b@x.io"),
        ]);
        let engine = MatchEngine::default();
        let registry = AddressSet::from_raw(["a@x.io"]);

        let first = engine.run_pass(&mut d, &registry);
        let after_first = marked(&engine, &d);
        let second = engine.run_pass(&mut d, &registry);

        assert_eq!(first.marked, 1);
        assert_eq!(second.marked, 0);
        assert_eq!(second.already_marked, 1);
        assert_eq!(marked(&engine, &d), after_first);
    }

    #[test]
    fn marked_elements_are_skipped() {
        let d = doc(vec![ElementSpec::new("span")
            .with_attr("title", "a@x.io")
            .with_class("gmail-address-highlight")]);
        let id = d.descendants(d.body())[0];
        let engine = MatchEngine::default();
        assert!(!engine.should_mark(&d, id, &AddressSet::from_raw(["a@x.io"])));
    }

    #[test]
    fn containment_direction_is_fixed() {
        let registry = AddressSet::from_raw(["alice@example.com"]);
        assert!(!MatchEngine::is_match(&["alice"], &registry));
        assert!(MatchEngine::is_match(&["Mail ALICE@example.com now"], &registry));
    }

    #[test]
    fn shorter_registered_address_matches_inside_longer_value() {
        let registry = AddressSet::from_raw(["al@x.com"]);
        assert!(MatchEngine::is_match(&["real@x.com"], &registry));
    }

    #[test]
    fn no_candidates_never_match() {
        assert!(!MatchEngine::is_match(&[], &AddressSet::from_raw(["a@x.io"])));
    }

    proptest! {
        #[test]
        fn is_match_agrees_with_reference(
            registry in proptest::collection::vec("[a-cA-C@.]{1,4}", 1..5),
            candidates in proptest::collection::vec("[a-cA-C@. ]{0,12}", 0..5),
        ) {
            let set = AddressSet::from_raw(&registry);
            let refs: Vec<&str> = candidates.iter().map(String::as_str).collect();
            let expected = set.iter().any(|r| {
                candidates.iter().any(|a| a.to_lowercase().contains(r.as_str()))
            });
            prop_assert_eq!(MatchEngine::is_match(&refs, &set), expected);
        }
    }
}
