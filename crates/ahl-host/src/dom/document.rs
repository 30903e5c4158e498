//! Arena-backed document tree and its shared, observable handle

use super::{Dom, ElementId, ElementSpec};
use crate::error::HostError;
use crate::events::{DomMutation, EventSource, Navigation, Publisher};
use indexmap::{IndexMap, IndexSet};
use parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::sync::Arc;
use tokio::sync::broadcast;

/// One element of the tree
#[derive(Debug, Clone)]
pub struct Element {
    tag: String,
    attributes: IndexMap<String, String>,
    classes: IndexSet<String>,
    children: Vec<ElementId>,
    parent: Option<ElementId>,
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            tag: tag.to_ascii_lowercase(),
            attributes: IndexMap::new(),
            classes: IndexSet::new(),
            children: Vec::new(),
            parent: None,
        }
    }

    /// Lower-case tag name
    #[inline]
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Child element ids
    #[inline]
    #[must_use]
    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    /// Parent element id, `None` for the body and detached elements
    #[inline]
    #[must_use]
    pub fn parent(&self) -> Option<ElementId> {
        self.parent
    }
}

/// A document: element arena, body, installed style sheets, location fragment
#[derive(Debug, Clone)]
pub struct Document {
    elements: Vec<Element>,
    body: ElementId,
    styles: IndexMap<String, String>,
    fragment: String,
}

impl Document {
    /// Create an empty document with a `<body>` and no fragment
    #[must_use]
    pub fn new() -> Self {
        Self {
            elements: vec![Element::new("body")],
            body: ElementId(0),
            styles: IndexMap::new(),
            fragment: String::new(),
        }
    }

    /// Create a detached element
    pub fn create_element(&mut self, tag: &str) -> ElementId {
        self.elements.push(Element::new(tag));
        ElementId(self.elements.len() - 1)
    }

    /// Look up an element
    #[inline]
    #[must_use]
    pub fn element(&self, id: ElementId) -> Option<&Element> {
        self.elements.get(id.0)
    }

    fn element_mut(&mut self, id: ElementId) -> Result<&mut Element, HostError> {
        self.elements
            .get_mut(id.0)
            .ok_or(HostError::UnknownElement(id.0))
    }

    /// Set (or overwrite) an attribute
    ///
    /// Attribute edits are not child-list changes and publish nothing.
    pub fn set_attribute(
        &mut self,
        id: ElementId,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), HostError> {
        self.element_mut(id)?
            .attributes
            .insert(name.to_string(), value.into());
        Ok(())
    }

    /// Append `child` under `parent`, detaching it from any previous parent
    ///
    /// # Errors
    /// - `HostError::UnknownElement` for ids outside this document
    /// - `HostError::InvalidInsertion` if `child` is `parent` or one of its ancestors
    pub fn append_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        self.element_mut(parent)?;
        self.element_mut(child)?;
        if child == self.body || self.ancestors(parent).any(|a| a == child) || parent == child {
            return Err(HostError::InvalidInsertion {
                parent: parent.0,
                child: child.0,
            });
        }

        if let Some(old) = self.elements[child.0].parent {
            self.elements[old.0].children.retain(|c| *c != child);
        }
        self.elements[child.0].parent = Some(parent);
        self.elements[parent.0].children.push(child);
        Ok(())
    }

    /// Detach `child` from `parent`
    ///
    /// Returns `false` if `child` was not a child of `parent`.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<bool, HostError> {
        let siblings = &mut self.element_mut(parent)?.children;
        let before = siblings.len();
        siblings.retain(|c| *c != child);
        if siblings.len() == before {
            return Ok(false);
        }
        self.element_mut(child)?.parent = None;
        Ok(true)
    }

    /// Build `spec` as a detached subtree and return its root
    pub fn build(&mut self, spec: &ElementSpec) -> Result<ElementId, HostError> {
        let id = self.create_element(&spec.tag);
        for (name, value) in &spec.attributes {
            self.set_attribute(id, name, value.clone())?;
        }
        for class in &spec.classes {
            self.add_class(id, class);
        }
        for child in &spec.children {
            let child_id = self.build(child)?;
            self.append_child(id, child_id)?;
        }
        Ok(id)
    }

    /// Replace the location fragment, returning the previous one
    pub fn set_fragment(&mut self, fragment: &str) -> String {
        let next = fragment.strip_prefix('#').unwrap_or(fragment).to_string();
        std::mem::replace(&mut self.fragment, next)
    }

    /// Number of elements in `root`'s subtree, including `root`
    #[must_use]
    pub fn subtree_len(&self, root: ElementId) -> usize {
        1 + self.descendants(root).len()
    }

    fn ancestors(&self, id: ElementId) -> impl Iterator<Item = ElementId> + '_ {
        std::iter::successors(self.element(id).and_then(Element::parent), |p| {
            self.element(*p).and_then(Element::parent)
        })
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

impl Dom for Document {
    fn body(&self) -> ElementId {
        self.body
    }

    fn descendants(&self, root: ElementId) -> Vec<ElementId> {
        let mut out = Vec::new();
        let Some(start) = self.element(root) else {
            return out;
        };
        let mut stack: Vec<ElementId> = start.children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(el) = self.element(id) {
                stack.extend(el.children.iter().rev().copied());
            }
        }
        out
    }

    fn tag(&self, id: ElementId) -> Option<&str> {
        self.element(id).map(Element::tag)
    }

    fn attribute(&self, id: ElementId, name: &str) -> Option<&str> {
        self.element(id)
            .and_then(|el| el.attributes.get(name))
            .map(String::as_str)
    }

    fn has_class(&self, id: ElementId, class: &str) -> bool {
        self.element(id).is_some_and(|el| el.classes.contains(class))
    }

    fn add_class(&mut self, id: ElementId, class: &str) -> bool {
        match self.elements.get_mut(id.0) {
            Some(el) => el.classes.insert(class.to_string()),
            None => false,
        }
    }

    fn location_fragment(&self) -> &str {
        &self.fragment
    }

    fn has_style(&self, style_id: &str) -> bool {
        self.styles.contains_key(style_id)
    }

    fn insert_style(&mut self, style_id: &str, css: &str) {
        self.styles.insert(style_id.to_string(), css.to_string());
    }
}

#[derive(Debug)]
struct SharedInner {
    document: RwLock<Document>,
    mutations: Publisher<DomMutation>,
    navigations: Publisher<Navigation>,
}

/// Shared, observable handle to a live [`Document`]
///
/// Child-list edits made through this handle publish [`DomMutation`];
/// [`navigate`](Self::navigate) publishes [`Navigation`]. Edits made
/// directly through [`write`](Self::write) are unobserved, like attribute
/// changes on a host that only watches child lists.
#[derive(Debug, Clone)]
pub struct SharedDocument {
    inner: Arc<SharedInner>,
}

impl SharedDocument {
    /// Wrap a document
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            inner: Arc::new(SharedInner {
                document: RwLock::new(document),
                mutations: Publisher::new(),
                navigations: Publisher::new(),
            }),
        }
    }

    /// Read guard over the document
    #[inline]
    pub fn read(&self) -> RwLockReadGuard<'_, Document> {
        self.inner.document.read()
    }

    /// Write guard over the document (unobserved edits)
    #[inline]
    pub fn write(&self) -> RwLockWriteGuard<'_, Document> {
        self.inner.document.write()
    }

    /// Append an existing element and publish the mutation
    pub fn append_child(&self, parent: ElementId, child: ElementId) -> Result<(), HostError> {
        let added = {
            let mut doc = self.write();
            doc.append_child(parent, child)?;
            doc.subtree_len(child)
        };
        self.inner.mutations.publish(DomMutation::added(added));
        Ok(())
    }

    /// Build `spec` under `parent` and publish the mutation
    pub fn append_spec(
        &self,
        parent: ElementId,
        spec: &ElementSpec,
    ) -> Result<ElementId, HostError> {
        let (id, added) = {
            let mut doc = self.write();
            let id = doc.build(spec)?;
            doc.append_child(parent, id)?;
            (id, doc.subtree_len(id))
        };
        self.inner.mutations.publish(DomMutation::added(added));
        Ok(id)
    }

    /// Detach a child and publish the mutation if anything changed
    pub fn remove_child(&self, parent: ElementId, child: ElementId) -> Result<bool, HostError> {
        let removed = {
            let mut doc = self.write();
            if !doc.remove_child(parent, child)? {
                return Ok(false);
            }
            doc.subtree_len(child)
        };
        self.inner.mutations.publish(DomMutation::removed(removed));
        Ok(true)
    }

    /// Change the location fragment and publish the navigation
    pub fn navigate(&self, fragment: &str) {
        let (from, to) = {
            let mut doc = self.write();
            let from = doc.set_fragment(fragment);
            (from, doc.location_fragment().to_string())
        };
        tracing::debug!("navigated from #{} to #{}", from, to);
        self.inner.navigations.publish(Navigation { from, to });
    }
}

impl EventSource<DomMutation> for SharedDocument {
    fn subscribe(&self) -> broadcast::Receiver<DomMutation> {
        self.inner.mutations.subscribe()
    }
}

impl EventSource<Navigation> for SharedDocument {
    fn subscribe(&self) -> broadcast::Receiver<Navigation> {
        self.inner.navigations.subscribe()
    }
}
