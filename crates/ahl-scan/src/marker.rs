//! Visual marker application
//!
//! Marking is monotonic: nothing in this crate removes the class once it
//! is attached.

use ahl_host::{Dom, ElementId, MarkerStyle};

/// Attaches and checks the marker class
#[derive(Debug, Clone)]
pub struct MarkerApplier {
    class: String,
}

impl MarkerApplier {
    /// Applier for `class`
    #[inline]
    #[must_use]
    pub fn new(class: impl Into<String>) -> Self {
        Self {
            class: class.into(),
        }
    }

    /// Applier for the class of a marker style
    #[inline]
    #[must_use]
    pub fn from_style(style: &MarkerStyle) -> Self {
        Self::new(style.class.clone())
    }

    /// Marker class name
    #[inline]
    #[must_use]
    pub fn class(&self) -> &str {
        &self.class
    }

    /// Whether `id` already carries the marker
    #[inline]
    pub fn is_marked<D: Dom + ?Sized>(&self, dom: &D, id: ElementId) -> bool {
        dom.has_class(id, &self.class)
    }

    /// Attach the marker; `false` if it was already there
    #[inline]
    pub fn apply<D: Dom + ?Sized>(&self, dom: &mut D, id: ElementId) -> bool {
        dom.add_class(id, &self.class)
    }
}

impl Default for MarkerApplier {
    fn default() -> Self {
        Self::from_style(&MarkerStyle::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ahl_host::Document;

    #[test]
    fn apply_is_idempotent() {
        let mut doc = Document::new();
        let id = doc.create_element("span");
        let marker = MarkerApplier::default();

        assert!(!marker.is_marked(&doc, id));
        assert!(marker.apply(&mut doc, id));
        assert!(!marker.apply(&mut doc, id));
        assert!(marker.is_marked(&doc, id));
        assert_eq!(marker.class(), "gmail-address-highlight");
    }
}
