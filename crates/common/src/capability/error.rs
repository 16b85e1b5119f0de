#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    /// Issuance was asked to sign something it should not
    #[error("invalid capability input: {0}")]
    InvalidInput(String),
    #[error("malformed credential: {0}")]
    Malformed(String),
    #[error("unsupported signing algorithm: {0}")]
    UnsupportedAlgorithm(String),
    #[error("credential signature is invalid")]
    InvalidSignature,
    #[error("credential has expired")]
    Expired,
    #[error("failed to encode credential: {0}")]
    Encoding(#[from] serde_json::Error),
}
