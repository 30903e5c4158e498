//! Error types for the engine
//!
//! Task bodies return [`EngineError`]; the scheduler logs and drops them.
//! Only construction and lifecycle misuse reach the caller.

use ahl_registry::RegistryError;
use ahl_scan::ScanError;
use std::path::PathBuf;

/// Main engine error type
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// Configuration file could not be read
    #[error("io error reading config {path}: {source}")]
    ConfigIo {
        /// Config file path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: std::io::Error,
    },

    /// Configuration is not valid TOML or has the wrong shape
    #[error("invalid config: {0}")]
    ConfigParse(#[from] toml::de::Error),

    /// Scan components rejected the configuration
    #[error("scan configuration error: {0}")]
    Scan(#[from] ScanError),

    /// Registry or persisted store failure
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// `start` called on a running engine
    #[error("engine already started")]
    AlreadyStarted,
}

impl EngineError {
    /// Create config IO error for path
    pub fn config_io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ConfigIo {
            path: path.into(),
            source,
        }
    }

    /// Whether the failure came from the persisted store
    #[inline]
    #[must_use]
    pub fn is_store_failure(&self) -> bool {
        matches!(self, Self::Registry(RegistryError::Store(_)))
    }
}

/// Result type alias for engine operations
pub type EngineResult<T> = Result<T, EngineError>;
