//! Serializable document fixtures (JSON or YAML)

use super::{Dom, Document};
use crate::error::HostError;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Serialized element subtree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementSpec {
    /// Tag name
    pub tag: String,
    /// Attributes in declaration order
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub attributes: IndexMap<String, String>,
    /// Classes already present on the element
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,
    /// Child elements
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<ElementSpec>,
}

impl ElementSpec {
    /// Element with no attributes or children
    #[inline]
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Self::default()
        }
    }

    /// With attribute
    #[inline]
    #[must_use]
    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// With class
    #[inline]
    #[must_use]
    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    /// With child
    #[inline]
    #[must_use]
    pub fn with_child(mut self, child: ElementSpec) -> Self {
        self.children.push(child);
        self
    }
}

/// Serialized document: location fragment plus the body's children
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSpec {
    /// Location fragment, with or without the leading `#`
    #[serde(default)]
    pub fragment: String,
    /// Children of `<body>`
    #[serde(default)]
    pub body: Vec<ElementSpec>,
}

impl DocumentSpec {
    /// Parse a JSON fixture
    pub fn from_json_str(raw: &str, origin: &Path) -> Result<Self, HostError> {
        serde_json::from_str(raw).map_err(|source| HostError::Json {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Parse a YAML fixture
    pub fn from_yaml_str(raw: &str, origin: &Path) -> Result<Self, HostError> {
        serde_yaml::from_str(raw).map_err(|source| HostError::Yaml {
            path: origin.to_path_buf(),
            source,
        })
    }

    /// Load a fixture, choosing the format by file extension
    ///
    /// # Errors
    /// - `HostError::UnsupportedFormat` for anything but `.json`, `.yaml`, `.yml`
    /// - `HostError::Io` if the file cannot be read
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, HostError> {
        let path = path.as_ref();
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if !matches!(ext.as_str(), "json" | "yaml" | "yml") {
            return Err(HostError::UnsupportedFormat(ext));
        }

        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| HostError::io_error(path, e))?;

        if ext == "json" {
            Self::from_json_str(&raw, path)
        } else {
            Self::from_yaml_str(&raw, path)
        }
    }

    /// Materialize the fixture as a document
    pub fn to_document(&self) -> Result<Document, HostError> {
        let mut doc = Document::new();
        doc.set_fragment(&self.fragment);
        let body = doc.body();
        for spec in &self.body {
            let id = doc.build(spec)?;
            doc.append_child(body, id)?;
        }
        Ok(doc)
    }
}
