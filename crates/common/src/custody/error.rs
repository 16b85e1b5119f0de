use object_store::StoreError;
use uuid::Uuid;

use crate::capability::CapabilityError;
use crate::crypto::SecretError;

#[derive(Debug, thiserror::Error)]
pub enum CustodyError {
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("credential rejected: {0}")]
    CredentialInvalid(CapabilityError),
    #[error("credential has expired")]
    CredentialExpired,
    /// The credential is genuine but was issued for a different object
    #[error("credential does not grant access to this object")]
    ObjectMismatch,
    #[error("object not found: {0}")]
    NotFound(Uuid),
    #[error("decryption failed")]
    DecryptionFailed,
    #[error("storage error: {0}")]
    Storage(StoreError),
    #[error("cipher error: {0}")]
    Cipher(#[from] SecretError),
    #[error("repository error: {0}")]
    Repository(String),
    #[error("failed to issue credential: {0}")]
    Issuance(CapabilityError),
}

impl CustodyError {
    /// Whether the failure is about the presented credential rather than the object
    pub fn is_authorization(&self) -> bool {
        matches!(
            self,
            CustodyError::CredentialInvalid(_)
                | CustodyError::CredentialExpired
                | CustodyError::ObjectMismatch
        )
    }
}

impl From<CapabilityError> for CustodyError {
    fn from(err: CapabilityError) -> Self {
        match err {
            CapabilityError::Expired => CustodyError::CredentialExpired,
            other => CustodyError::CredentialInvalid(other),
        }
    }
}
