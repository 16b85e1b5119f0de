use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use time::OffsetDateTime;
use uuid::Uuid;

use super::repository::ObjectRepository;
use super::types::{NewObjectRecord, ObjectRecord};

#[derive(Debug, thiserror::Error)]
pub enum MemoryRepositoryError {
    #[error("locator already recorded: {0}")]
    DuplicateLocator(String),
}

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<Uuid, (u64, ObjectRecord)>,
    next_seq: u64,
}

/// An [`ObjectRepository`] kept entirely in memory.
///
/// Records are lost when the last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct MemoryRepository {
    inner: Arc<RwLock<Inner>>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every record ever created, soft-deleted ones included
    pub fn all_records(&self) -> Vec<ObjectRecord> {
        self.inner
            .read()
            .records
            .values()
            .map(|(_, record)| record.clone())
            .collect()
    }
}

#[async_trait]
impl ObjectRepository for MemoryRepository {
    type Error = MemoryRepositoryError;

    async fn create(&self, record: NewObjectRecord) -> Result<ObjectRecord, Self::Error> {
        let mut inner = self.inner.write();
        if inner
            .records
            .values()
            .any(|(_, existing)| existing.locator == record.locator)
        {
            return Err(MemoryRepositoryError::DuplicateLocator(
                record.locator.into_inner(),
            ));
        }

        let now = OffsetDateTime::now_utc();
        let stored = ObjectRecord {
            id: Uuid::new_v4(),
            original_name: record.original_name,
            locator: record.locator,
            owner_id: record.owner_id,
            content_type: record.content_type,
            size_bytes: record.size_bytes,
            encryption_alg: record.encryption_alg,
            authentication_alg: record.authentication_alg,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };

        let seq = inner.next_seq;
        inner.next_seq += 1;
        inner.records.insert(stored.id, (seq, stored.clone()));
        Ok(stored)
    }

    async fn find(&self, id: Uuid) -> Result<Option<ObjectRecord>, Self::Error> {
        Ok(self
            .inner
            .read()
            .records
            .get(&id)
            .map(|(_, record)| record)
            .filter(|record| !record.is_deleted())
            .cloned())
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ObjectRecord>, Self::Error> {
        let inner = self.inner.read();
        let mut matches: Vec<&(u64, ObjectRecord)> = inner
            .records
            .values()
            .filter(|(_, record)| {
                !record.is_deleted() && record.owner_id.as_deref() == Some(owner_id)
            })
            .collect();
        matches.sort_by(|(a_seq, a), (b_seq, b)| {
            b.created_at.cmp(&a.created_at).then(b_seq.cmp(a_seq))
        });
        Ok(matches.into_iter().map(|(_, record)| record.clone()).collect())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, Self::Error> {
        let mut inner = self.inner.write();
        match inner.records.get_mut(&id) {
            Some((_, record)) if !record.is_deleted() => {
                let now = OffsetDateTime::now_utc();
                record.deleted_at = Some(now);
                record.updated_at = now;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
