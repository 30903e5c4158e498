//! Document model
//!
//! The core never touches [`Document`] internals; it reads and marks
//! elements through the [`Dom`] trait so any tree exposing the same
//! primitives can be scanned.

mod document;
mod fixture;
mod style;

pub use document::{Document, Element, SharedDocument};
pub use fixture::{DocumentSpec, ElementSpec};
pub use style::{inject_style, MarkerStyle};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Arena index of an element within one [`Document`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ElementId(pub(crate) usize);

impl ElementId {
    /// Raw arena index
    #[inline]
    #[must_use]
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Read and marker surface of a document tree
pub trait Dom {
    /// The body element (fallback scan root)
    fn body(&self) -> ElementId;

    /// Attached descendants of `root` in document order, excluding `root`
    fn descendants(&self, root: ElementId) -> Vec<ElementId>;

    /// Lower-case tag name of an element
    fn tag(&self, id: ElementId) -> Option<&str>;

    /// Attribute value, if present
    fn attribute(&self, id: ElementId, name: &str) -> Option<&str>;

    /// Whether the element carries `class`
    fn has_class(&self, id: ElementId, class: &str) -> bool;

    /// Attach `class`; returns `true` if it was not present before
    fn add_class(&mut self, id: ElementId, class: &str) -> bool;

    /// Location fragment without the leading `#`
    fn location_fragment(&self) -> &str;

    /// Whether a style sheet with `style_id` is installed
    fn has_style(&self, style_id: &str) -> bool;

    /// Install a style sheet under `style_id`
    fn insert_style(&mut self, style_id: &str, css: &str);
}
