use object_store::Locator;
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Recorded on every object so stored rows describe how their blob was sealed
pub const ENCRYPTION_ALG: &str = "AES-256";
pub const AUTHENTICATION_ALG: &str = "GCM";

/// Fields the orchestrator supplies when recording a new object.
/// The repository assigns the id and timestamps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewObjectRecord {
    pub original_name: String,
    pub locator: Locator,
    pub owner_id: Option<String>,
    pub content_type: String,
    pub size_bytes: u64,
    pub encryption_alg: String,
    pub authentication_alg: String,
}

/// A persisted object record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectRecord {
    pub id: Uuid,
    pub original_name: String,
    pub locator: Locator,
    pub owner_id: Option<String>,
    pub content_type: String,
    pub size_bytes: u64,
    pub encryption_alg: String,
    pub authentication_alg: String,
    pub created_at: OffsetDateTime,
    pub updated_at: OffsetDateTime,
    /// Set once the object is soft-deleted
    pub deleted_at: Option<OffsetDateTime>,
}

impl ObjectRecord {
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// The descriptive view of a record handed to callers. Never carries the
/// locator, the key, or any content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObjectMetadata {
    pub id: Uuid,
    pub original_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner_id: Option<String>,
    pub content_type: String,
    pub size_bytes: u64,
    pub encryption_alg: String,
    pub authentication_alg: String,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

impl From<&ObjectRecord> for ObjectMetadata {
    fn from(record: &ObjectRecord) -> Self {
        Self {
            id: record.id,
            original_name: record.original_name.clone(),
            owner_id: record.owner_id.clone(),
            content_type: record.content_type.clone(),
            size_bytes: record.size_bytes,
            encryption_alg: record.encryption_alg.clone(),
            authentication_alg: record.authentication_alg.clone(),
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

impl From<ObjectRecord> for ObjectMetadata {
    fn from(record: ObjectRecord) -> Self {
        Self::from(&record)
    }
}

#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub display_name: String,
    pub content: Vec<u8>,
    pub content_type: String,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadReceipt {
    pub object_id: Uuid,
    pub credential: String,
    /// Credential lifetime in seconds
    pub expires_in: u64,
    pub content_type: String,
    pub size_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetrievedObject {
    pub content: Vec<u8>,
    pub content_type: String,
    pub display_name: String,
}
