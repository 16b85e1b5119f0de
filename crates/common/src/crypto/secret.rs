//! Content encryption using AES-256-GCM
//!
//! Each stored object has its own unique `Secret`. The ciphertext carries the
//! 16-byte GCM tag at its end; the 12-byte nonce is handed back separately so
//! the store can persist it alongside the ciphertext.

use std::fmt;
use std::ops::Deref;

use aes_gcm::aead::{Aead, KeyInit};
use aes_gcm::{Aes256Gcm, Key};
use zeroize::{Zeroize, ZeroizeOnDrop};

/// Size of AES-GCM nonce in bytes
pub const NONCE_SIZE: usize = 12;
/// Size of AES-256 key in bytes (256 bits)
pub const SECRET_SIZE: usize = 32;

/// Errors that can occur during encryption/decryption
#[derive(Debug, thiserror::Error)]
pub enum SecretError {
    #[error("invalid secret size, expected {expected}, got {actual}")]
    InvalidKeyLength { expected: usize, actual: usize },
    #[error("failed to read from the OS entropy source: {0}")]
    Entropy(String),
    #[error("encrypt error")]
    Encrypt,
    /// Wrong key, tampered data, and malformed nonces all land here
    #[error("decryption failed")]
    Decrypt,
}

/// A 96-bit AES-GCM nonce
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Nonce([u8; NONCE_SIZE]);

impl Nonce {
    pub fn generate() -> Result<Self, SecretError> {
        let mut buff = [0u8; NONCE_SIZE];
        getrandom::getrandom(&mut buff).map_err(|e| SecretError::Entropy(e.to_string()))?;
        Ok(Self(buff))
    }

    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }
}

impl Deref for Nonce {
    type Target = [u8; NONCE_SIZE];
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl From<[u8; NONCE_SIZE]> for Nonce {
    fn from(bytes: [u8; NONCE_SIZE]) -> Self {
        Nonce(bytes)
    }
}

/// A 256-bit symmetric key for a single stored object
///
/// The key material is wiped from memory when the value is dropped.
///
/// # Examples
///
/// ```
/// use common::crypto::Secret;
///
/// let secret = Secret::generate().unwrap();
/// let (nonce, ciphertext) = secret.encrypt(b"sensitive data").unwrap();
/// let recovered = secret.decrypt(nonce.bytes(), &ciphertext).unwrap();
/// assert_eq!(recovered, b"sensitive data");
/// ```
#[derive(PartialEq, Eq, Clone, Zeroize, ZeroizeOnDrop)]
pub struct Secret([u8; SECRET_SIZE]);

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Secret(..)")
    }
}

impl From<[u8; SECRET_SIZE]> for Secret {
    fn from(bytes: [u8; SECRET_SIZE]) -> Self {
        Secret(bytes)
    }
}

impl Secret {
    /// Generate a new random secret from the OS entropy source
    pub fn generate() -> Result<Self, SecretError> {
        let mut buff = [0u8; SECRET_SIZE];
        getrandom::getrandom(&mut buff).map_err(|e| SecretError::Entropy(e.to_string()))?;
        Ok(Self(buff))
    }

    /// Create a secret from a byte slice
    ///
    /// # Errors
    ///
    /// Returns an error if the slice length is not exactly `SECRET_SIZE` bytes.
    pub fn from_slice(data: &[u8]) -> Result<Self, SecretError> {
        if data.len() != SECRET_SIZE {
            return Err(SecretError::InvalidKeyLength {
                expected: SECRET_SIZE,
                actual: data.len(),
            });
        }
        let mut buff = [0u8; SECRET_SIZE];
        buff.copy_from_slice(data);
        Ok(buff.into())
    }

    /// Get a reference to the secret key bytes
    pub fn bytes(&self) -> &[u8] {
        self.0.as_ref()
    }

    fn cipher(&self) -> Aes256Gcm {
        Aes256Gcm::new(Key::<Aes256Gcm>::from_slice(self.bytes()))
    }

    /// Encrypt `data` under a freshly generated nonce
    ///
    /// Returns the nonce and `ciphertext || tag`.
    pub fn encrypt(&self, data: &[u8]) -> Result<(Nonce, Vec<u8>), SecretError> {
        let nonce = Nonce::generate()?;
        let ciphertext = self
            .cipher()
            .encrypt(aes_gcm::Nonce::from_slice(nonce.bytes()), data)
            .map_err(|_| SecretError::Encrypt)?;
        Ok((nonce, ciphertext))
    }

    /// Decrypt `ciphertext || tag` with the given nonce
    ///
    /// Never returns partial plaintext. Every failure is reported as the same
    /// opaque [`SecretError::Decrypt`].
    pub fn decrypt(&self, nonce: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, SecretError> {
        if nonce.len() != NONCE_SIZE {
            return Err(SecretError::Decrypt);
        }
        self.cipher()
            .decrypt(aes_gcm::Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| SecretError::Decrypt)
    }
}
