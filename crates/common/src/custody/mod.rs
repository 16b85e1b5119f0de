//! File custody orchestration
//!
//! [`Custody`] is generic over an [`ObjectRepository`] so the same use-case
//! layer runs on top of SQLite in the daemon and on [`MemoryRepository`] in
//! tests and embedded setups.

#[allow(clippy::module_inception)]
mod custody;
mod error;
mod memory;
mod repository;
mod types;

pub use custody::Custody;
pub use error::CustodyError;
pub use memory::{MemoryRepository, MemoryRepositoryError};
pub use repository::ObjectRepository;
pub use types::{
    NewObjectRecord, ObjectMetadata, ObjectRecord, RetrievedObject, UploadReceipt, UploadRequest,
    AUTHENTICATION_ALG, ENCRYPTION_ALG,
};
