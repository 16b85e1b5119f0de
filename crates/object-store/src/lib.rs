//! Encrypted blob storage
//!
//! This crate persists already-encrypted blobs on the local filesystem. It knows
//! nothing about keys or plaintext: callers hand it a nonce and a ciphertext and
//! get back a [`Locator`] they can later use to read or delete the blob.
//!
//! # Layout
//!
//! Blobs are partitioned by the UTC date they were written:
//!
//! ```text
//! <root>/encrypted/YYYY/MM/DD/<uuid><.ext>.enc
//! ```
//!
//! Each file holds `nonce (12 bytes) || ciphertext`.
//!
//! # Example
//!
//! ```rust,no_run
//! use object_store::EncryptedStore;
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), object_store::StoreError> {
//! let store = EncryptedStore::new("/tmp/custody/uploads").await?;
//! let cancel = CancellationToken::new();
//!
//! let locator = store
//!     .save_encrypted("report.pdf", &[0u8; 12], b"ciphertext-and-tag", &cancel)
//!     .await?;
//! let blob = store.load_encrypted(&locator, &cancel).await?;
//! store.delete(&locator, &cancel).await?;
//! # Ok(())
//! # }
//! ```

mod error;
mod locator;
mod storage;

pub use error::{Result, StoreError};
pub use locator::Locator;
pub use storage::{EncryptedBlob, EncryptedStore, NONCE_SIZE, TAG_SIZE};
