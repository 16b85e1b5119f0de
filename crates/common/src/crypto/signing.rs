use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of a generated signing secret in bytes
pub const SIGNING_SECRET_SIZE: usize = 32;

#[derive(Debug, thiserror::Error)]
pub enum SigningSecretError {
    #[error("signing secret must not be empty")]
    Empty,
    #[error("signing secret is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("failed to read from the OS entropy source: {0}")]
    Entropy(String),
}

/// Key material for the HMAC that signs capability credentials
///
/// Constructed once at startup and treated as immutable afterwards.
#[derive(Clone, PartialEq, Eq, Zeroize, ZeroizeOnDrop)]
pub struct SigningSecret(Vec<u8>);

impl fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SigningSecret(..)")
    }
}

impl SigningSecret {
    pub fn generate() -> Result<Self, SigningSecretError> {
        let mut buff = vec![0u8; SIGNING_SECRET_SIZE];
        getrandom::getrandom(&mut buff).map_err(|e| SigningSecretError::Entropy(e.to_string()))?;
        Ok(Self(buff))
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, SigningSecretError> {
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(SigningSecretError::Empty);
        }
        Ok(Self(bytes))
    }

    /// Parse the base64 form written by [`SigningSecret::to_base64`].
    /// Surrounding whitespace is ignored.
    pub fn from_base64(encoded: &str) -> Result<Self, SigningSecretError> {
        let bytes = STANDARD.decode(encoded.trim())?;
        Self::from_bytes(bytes)
    }

    pub fn to_base64(&self) -> String {
        STANDARD.encode(&self.0)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.0
    }
}
