use std::fmt::{Debug, Display};

use async_trait::async_trait;
use uuid::Uuid;

use super::types::{NewObjectRecord, ObjectRecord};

/// Durable home for object records.
///
/// Implementations must treat soft-deleted records as absent for every read.
#[async_trait]
pub trait ObjectRepository: Send + Sync + Debug + Clone + 'static {
    type Error: Display + Debug + Send + Sync;

    /// Persist a new record, assigning its id and timestamps
    ///
    /// Should fail if another record already uses the same locator.
    async fn create(&self, record: NewObjectRecord) -> Result<ObjectRecord, Self::Error>;

    /// Look up a live record by id
    ///
    /// # Returns
    /// * `Ok(None)` - no record exists, or it has been soft-deleted
    async fn find(&self, id: Uuid) -> Result<Option<ObjectRecord>, Self::Error>;

    /// Live records belonging to `owner_id`, newest first
    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ObjectRecord>, Self::Error>;

    /// Mark a record deleted
    ///
    /// # Returns
    /// * `Ok(false)` - there was no live record to delete
    async fn soft_delete(&self, id: Uuid) -> Result<bool, Self::Error>;
}
