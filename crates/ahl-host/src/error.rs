//! Error types for the host surfaces
//!
//! - Fixture loading (file → document tree)
//! - Persisted store I/O (read, write, serialization)

use std::path::PathBuf;

/// Errors while building a document from a fixture
#[derive(Debug, thiserror::Error)]
pub enum HostError {
    /// IO error while reading a fixture
    #[error("io error reading {path}: {source}")]
    Io {
        /// Fixture path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Fixture is not valid JSON
    #[error("invalid json fixture {path}: {source}")]
    Json {
        /// Fixture path
        path: PathBuf,
        /// Parser error with line and column
        #[source]
        source: serde_json::Error,
    },

    /// Fixture is not valid YAML
    #[error("invalid yaml fixture {path}: {source}")]
    Yaml {
        /// Fixture path
        path: PathBuf,
        /// Parser error with location
        #[source]
        source: serde_yaml::Error,
    },

    /// Fixture extension is not recognised
    #[error("unsupported fixture format: '{0}'")]
    UnsupportedFormat(String),

    /// Element id does not belong to this document
    #[error("unknown element: {0}")]
    UnknownElement(usize),

    /// Insertion would make an element its own ancestor
    #[error("cannot insert element {child} under {parent}")]
    InvalidInsertion {
        /// Index of the intended parent
        parent: usize,
        /// Index of the element being inserted
        child: usize,
    },
}

impl HostError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised by the persisted key-value store
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// IO error against the backing file
    #[error("store io error at {path}: {source}")]
    Io {
        /// Backing file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Stored value could not be (de)serialized
    #[error("store serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Value under key has an unexpected shape
    #[error("value under '{key}' is not a list of strings")]
    InvalidValue {
        /// Storage key holding the bad value
        key: String,
    },

    /// Write rejected by the substrate (quota, policy, injected fault)
    #[error("store write rejected: {0}")]
    WriteRejected(String),

    /// Read rejected by the substrate
    #[error("store read rejected: {0}")]
    ReadRejected(String),
}

impl StoreError {
    /// Create IO error for path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for store operations
pub type StoreResult<T> = Result<T, StoreError>;
