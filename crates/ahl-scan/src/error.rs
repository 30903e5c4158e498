//! Error types for scanner and extractor construction

/// Configuration errors for the scan components
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    /// No element tags to scan
    #[error("scan configuration lists no element tags")]
    NoTags,

    /// No attributes to read
    #[error("scan configuration lists no attributes")]
    NoAttributes,

    /// Harvest pattern does not compile
    #[error("invalid harvest pattern: {0}")]
    InvalidPattern(#[from] regex::Error),
}
