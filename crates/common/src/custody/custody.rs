use object_store::{EncryptedStore, Locator, StoreError};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::capability::{Capability, CapabilityAuthority};
use crate::crypto::Secret;

use super::error::CustodyError;
use super::repository::ObjectRepository;
use super::types::{
    NewObjectRecord, ObjectMetadata, ObjectRecord, RetrievedObject, UploadReceipt, UploadRequest,
    AUTHENTICATION_ALG, ENCRYPTION_ALG,
};

/// Sequences the cipher, the encrypted store, the credential authority and
/// a metadata repository for every custody operation.
///
/// Cheap to clone; clones share the same repository, store and authority.
#[derive(Debug, Clone)]
pub struct Custody<R: ObjectRepository> {
    repository: R,
    store: EncryptedStore,
    authority: CapabilityAuthority,
}

impl<R: ObjectRepository> Custody<R> {
    pub fn new(repository: R, store: EncryptedStore, authority: CapabilityAuthority) -> Self {
        Self {
            repository,
            store,
            authority,
        }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn store(&self) -> &EncryptedStore {
        &self.store
    }

    pub fn authority(&self) -> &CapabilityAuthority {
        &self.authority
    }

    /// Encrypt and store a new object, returning a credential for it.
    ///
    /// The blob is written before the record. If recording fails the blob is
    /// removed again; if issuing the credential fails both are rolled back,
    /// so a failed upload leaves nothing retrievable behind.
    pub async fn upload(
        &self,
        request: UploadRequest,
        cancel: &CancellationToken,
    ) -> Result<UploadReceipt, CustodyError> {
        let display_name = request.display_name.trim();
        if display_name.is_empty() {
            return Err(CustodyError::Validation(
                "display name must not be empty".to_string(),
            ));
        }
        let content_type = request.content_type.trim();
        if content_type.is_empty() {
            return Err(CustodyError::Validation(
                "content type must not be empty".to_string(),
            ));
        }
        if matches!(request.owner_id.as_deref(), Some(owner) if owner.is_empty()) {
            return Err(CustodyError::Validation(
                "owner id must not be empty when given".to_string(),
            ));
        }

        let key = Secret::generate()?;
        let (nonce, ciphertext) = key.encrypt(&request.content)?;

        let locator = self
            .store
            .save_encrypted(display_name, nonce.bytes(), &ciphertext, cancel)
            .await
            .map_err(CustodyError::Storage)?;

        let new_record = NewObjectRecord {
            original_name: display_name.to_string(),
            locator: locator.clone(),
            owner_id: request.owner_id.clone(),
            content_type: content_type.to_string(),
            size_bytes: request.content.len() as u64,
            encryption_alg: ENCRYPTION_ALG.to_string(),
            authentication_alg: AUTHENTICATION_ALG.to_string(),
        };

        let record = match self.repository.create(new_record).await {
            Ok(record) => record,
            Err(e) => {
                tracing::error!(locator = %locator, error = %e, "failed to record uploaded object");
                self.discard_blob(&locator).await;
                return Err(CustodyError::Repository(e.to_string()));
            }
        };

        let credential = match self.authority.issue(
            &record.id.to_string(),
            &key,
            record.owner_id.as_deref(),
        ) {
            Ok(credential) => credential,
            Err(e) => {
                tracing::error!(object_id = %record.id, error = %e, "failed to issue credential");
                self.discard_blob(&locator).await;
                if let Err(rollback) = self.repository.soft_delete(record.id).await {
                    tracing::error!(
                        object_id = %record.id,
                        error = %rollback,
                        "failed to roll back object record"
                    );
                }
                return Err(CustodyError::Issuance(e));
            }
        };

        tracing::info!(
            object_id = %record.id,
            size_bytes = record.size_bytes,
            content_type = %record.content_type,
            "object uploaded"
        );

        Ok(UploadReceipt {
            object_id: record.id,
            credential,
            expires_in: self.authority.ttl_secs(),
            content_type: record.content_type,
            size_bytes: record.size_bytes,
        })
    }

    /// Decrypt and return an object's content.
    pub async fn retrieve(
        &self,
        object_id: Uuid,
        credential: &str,
        cancel: &CancellationToken,
    ) -> Result<RetrievedObject, CustodyError> {
        let capability = self.authorize(object_id, credential)?;
        let record = self.live_record(object_id).await?;

        // A concurrent delete can remove the blob after the record was read
        let blob = match self.store.load_encrypted(&record.locator, cancel).await {
            Ok(blob) => blob,
            Err(StoreError::NotFound(_)) => return Err(CustodyError::NotFound(object_id)),
            Err(e) => return Err(CustodyError::Storage(e)),
        };

        let content = capability
            .secret
            .decrypt(&blob.nonce, &blob.ciphertext)
            .map_err(|_| {
                tracing::warn!(object_id = %object_id, "decryption failed for stored object");
                CustodyError::DecryptionFailed
            })?;

        tracing::debug!(object_id = %object_id, size = content.len(), "object retrieved");

        Ok(RetrievedObject {
            content,
            content_type: record.content_type,
            display_name: record.original_name,
        })
    }

    /// Descriptive fields of an object. Touches no stored content.
    pub async fn metadata(
        &self,
        object_id: Uuid,
        credential: &str,
    ) -> Result<ObjectMetadata, CustodyError> {
        self.authorize(object_id, credential)?;
        let record = self.live_record(object_id).await?;
        Ok(ObjectMetadata::from(record))
    }

    /// Remove an object's blob and soft-delete its record.
    ///
    /// A blob that cannot be removed is logged and left behind; the record is
    /// still tombstoned so the object stops being retrievable.
    pub async fn delete(
        &self,
        object_id: Uuid,
        credential: &str,
        cancel: &CancellationToken,
    ) -> Result<(), CustodyError> {
        self.authorize(object_id, credential)?;
        let record = self.live_record(object_id).await?;

        if let Err(e) = self.store.delete(&record.locator, cancel).await {
            tracing::warn!(
                object_id = %object_id,
                locator = %record.locator,
                error = %e,
                "failed to delete stored blob, continuing with record deletion"
            );
        }

        let deleted = self
            .repository
            .soft_delete(object_id)
            .await
            .map_err(|e| CustodyError::Repository(e.to_string()))?;
        if !deleted {
            return Err(CustodyError::NotFound(object_id));
        }

        tracing::info!(object_id = %object_id, "object deleted");
        Ok(())
    }

    /// Live objects recorded for `owner_id`, newest first.
    pub async fn list_by_owner(&self, owner_id: &str) -> Result<Vec<ObjectMetadata>, CustodyError> {
        if owner_id.is_empty() {
            return Err(CustodyError::Validation(
                "owner id must not be empty".to_string(),
            ));
        }

        let records = self
            .repository
            .find_by_owner(owner_id)
            .await
            .map_err(|e| CustodyError::Repository(e.to_string()))?;
        Ok(records.iter().map(ObjectMetadata::from).collect())
    }

    /// Verify a credential and bind it to `object_id`. Runs before any
    /// repository or storage access.
    fn authorize(&self, object_id: Uuid, credential: &str) -> Result<Capability, CustodyError> {
        let capability = self.authority.verify(credential)?;
        if capability.file_id != object_id.to_string() {
            tracing::warn!(
                requested = %object_id,
                granted = %capability.file_id,
                "credential presented for the wrong object"
            );
            return Err(CustodyError::ObjectMismatch);
        }
        Ok(capability)
    }

    async fn live_record(&self, object_id: Uuid) -> Result<ObjectRecord, CustodyError> {
        self.repository
            .find(object_id)
            .await
            .map_err(|e| CustodyError::Repository(e.to_string()))?
            .ok_or(CustodyError::NotFound(object_id))
    }

    /// Best-effort removal of a blob whose upload is being abandoned.
    async fn discard_blob(&self, locator: &Locator) {
        // The caller's token may already be cancelled; cleanup must still run
        let cleanup = CancellationToken::new();
        if let Err(e) = self.store.delete(locator, &cleanup).await {
            tracing::error!(
                locator = %locator,
                error = %e,
                "failed to remove blob of abandoned upload"
            );
        }
    }
}
