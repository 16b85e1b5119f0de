//! Shared test utilities for custody integration tests
#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use common::custody::{
    MemoryRepository, MemoryRepositoryError, NewObjectRecord, ObjectRecord, ObjectRepository,
};
use common::testkit::TestCustody;
use uuid::Uuid;

/// Set up a custody harness backed by a fresh in-memory repository
pub async fn setup_test_env() -> TestCustody {
    TestCustody::new().await.unwrap()
}

/// Wraps a [`MemoryRepository`], counting every call made through it
#[derive(Debug, Clone, Default)]
pub struct CountingRepository {
    pub inner: MemoryRepository,
    calls: Arc<AtomicUsize>,
}

impl CountingRepository {
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl ObjectRepository for CountingRepository {
    type Error = MemoryRepositoryError;

    async fn create(&self, record: NewObjectRecord) -> Result<ObjectRecord, Self::Error> {
        self.hit();
        self.inner.create(record).await
    }

    async fn find(&self, id: Uuid) -> Result<Option<ObjectRecord>, Self::Error> {
        self.hit();
        self.inner.find(id).await
    }

    async fn find_by_owner(&self, owner_id: &str) -> Result<Vec<ObjectRecord>, Self::Error> {
        self.hit();
        self.inner.find_by_owner(owner_id).await
    }

    async fn soft_delete(&self, id: Uuid) -> Result<bool, Self::Error> {
        self.hit();
        self.inner.soft_delete(id).await
    }
}

#[derive(Debug, thiserror::Error)]
#[error("repository unavailable")]
pub struct Unavailable;

/// A repository whose writes always fail
#[derive(Debug, Clone, Default)]
pub struct FailingRepository;

#[async_trait]
impl ObjectRepository for FailingRepository {
    type Error = Unavailable;

    async fn create(&self, _record: NewObjectRecord) -> Result<ObjectRecord, Self::Error> {
        Err(Unavailable)
    }

    async fn find(&self, _id: Uuid) -> Result<Option<ObjectRecord>, Self::Error> {
        Ok(None)
    }

    async fn find_by_owner(&self, _owner_id: &str) -> Result<Vec<ObjectRecord>, Self::Error> {
        Ok(Vec::new())
    }

    async fn soft_delete(&self, _id: Uuid) -> Result<bool, Self::Error> {
        Err(Unavailable)
    }
}
