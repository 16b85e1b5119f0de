//! Filesystem backend for encrypted blobs.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Utc};
use tokio::io::AsyncWriteExt;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{Result, StoreError};
use crate::locator::Locator;

/// Size of the AES-GCM nonce stored in front of every blob
pub const NONCE_SIZE: usize = 12;
/// Size of the AES-GCM authentication tag at the end of every ciphertext
pub const TAG_SIZE: usize = 16;

const ENCRYPTED_DIR: &str = "encrypted";
const BLOB_SUFFIX: &str = ".enc";
const DEFAULT_EXTENSION: &str = ".bin";
const MAX_EXTENSION_LEN: usize = 16;

#[cfg(unix)]
const DIR_MODE: u32 = 0o750;
#[cfg(unix)]
const FILE_MODE: u32 = 0o640;

/// A nonce and ciphertext read back from the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedBlob {
    pub nonce: Vec<u8>,
    pub ciphertext: Vec<u8>,
}

/// Stores encrypted blobs below a fixed root directory.
///
/// Every operation takes a [`CancellationToken`]; a token that has already
/// fired fails the call with [`StoreError::Cancelled`] before any filesystem
/// access happens. Symlinks below the root are followed only while their
/// target stays inside the root.
#[derive(Debug, Clone)]
pub struct EncryptedStore {
    root: PathBuf,
    canonical_root: PathBuf,
}

impl EncryptedStore {
    /// Open a store rooted at `root`, creating the directory if needed.
    pub async fn new(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        create_dirs(&root).await?;
        let canonical_root = tokio::fs::canonicalize(&root).await?;
        tracing::debug!(root = %root.display(), "opened encrypted store");
        Ok(Self {
            root,
            canonical_root,
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Persist `nonce || ciphertext` under a freshly generated locator.
    ///
    /// The locator keeps the lowercased extension of `name_hint` when it is a
    /// short alphanumeric string and falls back to `.bin` otherwise. Files are
    /// created exclusively, so an existing blob is never overwritten.
    pub async fn save_encrypted(
        &self,
        name_hint: &str,
        nonce: &[u8],
        ciphertext: &[u8],
        cancel: &CancellationToken,
    ) -> Result<Locator> {
        check_cancelled(cancel)?;

        if nonce.is_empty() {
            return Err(StoreError::InvalidInput("nonce is empty".to_string()));
        }
        if nonce.len() != NONCE_SIZE {
            return Err(StoreError::InvalidInput(format!(
                "nonce must be {} bytes, got {}",
                NONCE_SIZE,
                nonce.len()
            )));
        }
        if ciphertext.is_empty() {
            return Err(StoreError::InvalidInput("ciphertext is empty".to_string()));
        }

        let locator = generate_locator(name_hint);
        let path = locator.resolve(&self.root)?;
        if let Some(parent) = path.parent() {
            create_dirs(parent).await?;
            self.confine(&locator, parent).await?;
        }

        if let Err(e) = write_new_file(&path, nonce, ciphertext).await {
            if e.kind() != std::io::ErrorKind::AlreadyExists {
                if let Err(cleanup) = tokio::fs::remove_file(&path).await {
                    if cleanup.kind() != std::io::ErrorKind::NotFound {
                        tracing::warn!(
                            locator = %locator,
                            error = %cleanup,
                            "failed to remove partially written blob"
                        );
                    }
                }
            }
            return Err(e.into());
        }

        tracing::debug!(
            locator = %locator,
            size = nonce.len() + ciphertext.len(),
            "stored encrypted blob"
        );
        Ok(locator)
    }

    /// Read a blob back, splitting it into nonce and ciphertext.
    pub async fn load_encrypted(
        &self,
        locator: &Locator,
        cancel: &CancellationToken,
    ) -> Result<EncryptedBlob> {
        check_cancelled(cancel)?;
        let path = locator.resolve(&self.root)?;
        let path = self.confine(locator, &path).await?;

        let mut data = match tokio::fs::read(&path).await {
            Ok(data) => data,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(locator.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if data.len() < NONCE_SIZE + TAG_SIZE {
            return Err(StoreError::Corrupt(format!(
                "{} holds {} bytes, need at least {}",
                locator,
                data.len(),
                NONCE_SIZE + TAG_SIZE
            )));
        }

        let ciphertext = data.split_off(NONCE_SIZE);
        Ok(EncryptedBlob {
            nonce: data,
            ciphertext,
        })
    }

    /// Remove a blob. A blob that is already gone counts as deleted.
    pub async fn delete(&self, locator: &Locator, cancel: &CancellationToken) -> Result<()> {
        check_cancelled(cancel)?;
        let path = locator.resolve(&self.root)?;
        match self.confine(locator, &path).await {
            Ok(_) => {}
            Err(StoreError::NotFound(_)) => return Ok(()),
            Err(e) => return Err(e),
        }

        // Removes a final symlink itself, never its target
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(locator = %locator, "deleted encrypted blob");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Check whether a blob exists at the locator.
    pub async fn exists(&self, locator: &Locator) -> Result<bool> {
        let path = locator.resolve(&self.root)?;
        match self.confine(locator, &path).await {
            Ok(_) => Ok(true),
            Err(StoreError::NotFound(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }

    /// Follow symlinks in `path` and require the result to stay below the root.
    async fn confine(&self, locator: &Locator, path: &Path) -> Result<PathBuf> {
        let real = match tokio::fs::canonicalize(path).await {
            Ok(real) => real,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(StoreError::NotFound(locator.to_string()));
            }
            Err(e) => return Err(e.into()),
        };

        if !real.starts_with(&self.canonical_root) {
            tracing::warn!(locator = %locator, "locator resolves outside the storage root");
            return Err(StoreError::PathTraversal(locator.to_string()));
        }
        Ok(real)
    }
}

fn check_cancelled(cancel: &CancellationToken) -> Result<()> {
    if cancel.is_cancelled() {
        return Err(StoreError::Cancelled);
    }
    Ok(())
}

fn generate_locator(name_hint: &str) -> Locator {
    let today = Utc::now().date_naive();
    Locator::new(format!(
        "{}/{:04}/{:02}/{:02}/{}{}{}",
        ENCRYPTED_DIR,
        today.year(),
        today.month(),
        today.day(),
        Uuid::new_v4(),
        extension_for(name_hint),
        BLOB_SUFFIX
    ))
}

fn extension_for(name_hint: &str) -> String {
    Path::new(name_hint)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| {
            !ext.is_empty()
                && ext.len() <= MAX_EXTENSION_LEN
                && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .map(|ext| format!(".{}", ext.to_ascii_lowercase()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

async fn create_dirs(path: &Path) -> std::io::Result<()> {
    let mut builder = tokio::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    builder.mode(DIR_MODE);
    builder.create(path).await
}

async fn write_new_file(path: &Path, nonce: &[u8], ciphertext: &[u8]) -> std::io::Result<()> {
    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create_new(true);
    #[cfg(unix)]
    options.mode(FILE_MODE);

    let mut file = options.open(path).await?;
    file.write_all(nonce).await?;
    file.write_all(ciphertext).await?;
    file.sync_all().await?;
    Ok(())
}
