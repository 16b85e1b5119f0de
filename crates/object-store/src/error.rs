//! Error types for the encrypted blob store.

/// Errors that can occur when working with the encrypted store.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The caller's cancellation token fired before the operation started
    #[error("operation cancelled")]
    Cancelled,

    /// Nonce or ciphertext failed validation
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Locator is empty, absolute, or would resolve outside the storage root
    #[error("locator rejected, path escapes storage root: {0}")]
    PathTraversal(String),

    /// No blob exists at the locator
    #[error("encrypted blob not found: {0}")]
    NotFound(String),

    /// Blob on disk is too short to hold a nonce and an authentication tag
    #[error("encrypted blob is corrupt: {0}")]
    Corrupt(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for encrypted store operations.
pub type Result<T> = std::result::Result<T, StoreError>;
