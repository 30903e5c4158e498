//! Identity-attribute scanner

use crate::error::ScanError;
use ahl_host::{Dom, ElementId};
use serde::{Deserialize, Serialize};

/// Which elements and attributes are scanned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Element tags that can carry identity attributes
    pub tags: Vec<String>,
    /// Attribute names, in priority order
    pub attributes: Vec<String>,
    /// `role` value of the preferred scan root
    pub main_role: String,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            tags: vec!["span".to_string(), "div".to_string()],
            attributes: vec![
                "email".to_string(),
                "data-hovercard-id".to_string(),
                "title".to_string(),
                "aria-label".to_string(),
            ],
            main_role: "main".to_string(),
        }
    }
}

/// Finds elements with identity attributes and reads their candidates
#[derive(Debug, Clone)]
pub struct AttributeScanner {
    config: ScanConfig,
}

impl AttributeScanner {
    /// Create a scanner
    ///
    /// # Errors
    /// - `ScanError::NoTags` / `ScanError::NoAttributes` for an empty list
    pub fn new(config: ScanConfig) -> Result<Self, ScanError> {
        if config.tags.is_empty() {
            return Err(ScanError::NoTags);
        }
        if config.attributes.is_empty() {
            return Err(ScanError::NoAttributes);
        }
        Ok(Self { config })
    }

    /// The main content region (`div` with the configured role), else the body
    pub fn scan_root<D: Dom + ?Sized>(&self, dom: &D) -> ElementId {
        let body = dom.body();
        dom.descendants(body)
            .into_iter()
            .find(|id| {
                dom.tag(*id) == Some("div")
                    && dom.attribute(*id, "role") == Some(self.config.main_role.as_str())
            })
            .unwrap_or(body)
    }

    fn is_scanned_tag<D: Dom + ?Sized>(&self, dom: &D, id: ElementId) -> bool {
        dom.tag(id)
            .is_some_and(|tag| self.config.tags.iter().any(|t| t.eq_ignore_ascii_case(tag)))
    }

    /// Non-empty identity attribute values of `id`, in priority order
    pub fn candidates<'d, D: Dom + ?Sized>(&self, dom: &'d D, id: ElementId) -> Vec<&'d str> {
        self.config
            .attributes
            .iter()
            .filter_map(|name| dom.attribute(id, name))
            .filter(|value| !value.is_empty())
            .collect()
    }

    /// Elements under `root` with a scanned tag and at least one candidate
    pub fn matchable<D: Dom + ?Sized>(&self, dom: &D, root: ElementId) -> Vec<ElementId> {
        dom.descendants(root)
            .into_iter()
            .filter(|id| self.is_scanned_tag(dom, *id))
            .filter(|id| {
                self.config
                    .attributes
                    .iter()
                    .any(|name| dom.attribute(*id, name).is_some_and(|v| !v.is_empty()))
            })
            .collect()
    }

    /// Matchable elements paired with their candidates
    pub fn scan<'d, D: Dom + ?Sized>(
        &self,
        dom: &'d D,
        root: ElementId,
    ) -> Vec<(ElementId, Vec<&'d str>)> {
        self.matchable(dom, root)
            .into_iter()
            .map(|id| (id, self.candidates(dom, id)))
            .collect()
    }
}

impl Default for AttributeScanner {
    fn default() -> Self {
        Self {
            config: ScanConfig::default(),
        }
    }
}
