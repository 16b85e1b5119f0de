//! Lightweight harness for custody integration tests
//!
//! Builds a [`Custody`] over a throwaway storage directory so tests can
//! exercise the full upload/retrieve/delete flow in-process.
//!
//! # Example
//!
//! ```rust,ignore
//! use common::testkit::TestCustody;
//!
//! #[tokio::test]
//! async fn test_roundtrip() -> anyhow::Result<()> {
//!     let env = TestCustody::new().await?;
//!     let receipt = env.upload("hello.txt", b"hello", None).await?;
//!     let object = env
//!         .custody
//!         .retrieve(receipt.object_id, &receipt.credential, &env.cancel)
//!         .await?;
//!     assert_eq!(object.content, b"hello");
//!     Ok(())
//! }
//! ```

use std::time::Duration;

use object_store::EncryptedStore;
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;

use crate::capability::CapabilityAuthority;
use crate::crypto::SigningSecret;
use crate::custody::{
    Custody, CustodyError, MemoryRepository, ObjectRepository, UploadReceipt, UploadRequest,
};

/// Default credential lifetime used by the harness
pub const TEST_TTL: Duration = Duration::from_secs(900);

pub struct TestCustody<R: ObjectRepository = MemoryRepository> {
    pub custody: Custody<R>,
    pub cancel: CancellationToken,
    /// Keeps the storage directory alive for the lifetime of the harness
    pub temp_dir: TempDir,
}

impl TestCustody<MemoryRepository> {
    pub async fn new() -> anyhow::Result<Self> {
        Self::with_repository(MemoryRepository::new()).await
    }
}

impl<R: ObjectRepository> TestCustody<R> {
    pub async fn with_repository(repository: R) -> anyhow::Result<Self> {
        let temp_dir = TempDir::new()?;
        let store = EncryptedStore::new(temp_dir.path().join("uploads")).await?;
        let authority = test_authority(TEST_TTL)?;

        Ok(Self {
            custody: Custody::new(repository, store, authority),
            cancel: CancellationToken::new(),
            temp_dir,
        })
    }

    /// Upload `content` as `name` with a `text/plain` content type
    pub async fn upload(
        &self,
        name: &str,
        content: &[u8],
        owner_id: Option<&str>,
    ) -> Result<UploadReceipt, CustodyError> {
        self.custody
            .upload(
                UploadRequest {
                    display_name: name.to_string(),
                    content: content.to_vec(),
                    content_type: "text/plain".to_string(),
                    owner_id: owner_id.map(str::to_string),
                },
                &self.cancel,
            )
            .await
    }

    /// Number of blob files currently on disk below the store root
    pub fn blob_count(&self) -> usize {
        count_files(self.custody.store().root())
    }
}

/// An authority keyed with a fixed test secret
pub fn test_authority(ttl: Duration) -> anyhow::Result<CapabilityAuthority> {
    let secret = SigningSecret::from_bytes(b"custody-testkit-signing-secret".to_vec())?;
    Ok(CapabilityAuthority::new(secret, ttl)?)
}

fn count_files(dir: &std::path::Path) -> usize {
    let Ok(entries) = std::fs::read_dir(dir) else {
        return 0;
    };
    entries
        .filter_map(Result::ok)
        .map(|entry| {
            let path = entry.path();
            if path.is_dir() {
                count_files(&path)
            } else {
                1
            }
        })
        .sum()
}
