//! Cryptographic primitives for file custody
//!
//! - **Content encryption**: every stored object gets its own AES-256-GCM
//!   [`Secret`], generated at upload time and never persisted server-side.
//!   The secret travels to the client inside the capability credential.
//! - **Credential signing**: a single long-lived [`SigningSecret`] keys the
//!   HMAC that authenticates capability credentials.
//!
//! Nonces are random per encryption. Because an object key encrypts exactly
//! one plaintext, nonce reuse under the same key cannot happen; reusing a
//! [`Secret`] for many messages would need a nonce counter instead.

mod secret;
mod signing;

pub use secret::{Nonce, Secret, SecretError, NONCE_SIZE, SECRET_SIZE};
pub use signing::{SigningSecret, SigningSecretError, SIGNING_SECRET_SIZE};
