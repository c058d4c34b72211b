//! Error types for tallybook storage.

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur in storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Reading or writing the snapshot file failed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization failed.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The snapshot was written by an incompatible version.
    #[error("unsupported snapshot version: {found}")]
    UnsupportedVersion {
        /// Version found in the file.
        found: u32,
    },
}
