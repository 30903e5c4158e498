//! Error types for registry operations

use ahl_host::StoreError;

/// Registry errors
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    /// Address is empty after trimming
    #[error("empty address")]
    EmptyAddress,

    /// Persisted store failed
    #[error("store error: {0}")]
    Store(#[from] StoreError),
}

/// Result type alias for registry operations
pub type RegistryResult<T> = Result<T, RegistryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts() {
        let err: RegistryError = StoreError::WriteRejected("quota".to_string()).into();
        assert!(matches!(err, RegistryError::Store(_)));
        assert!(err.to_string().contains("quota"));
    }
}
