//! `/api/v0/files`: upload, download, inspect, delete and list objects in custody.
//!
//! Every per-object route takes the capability token issued at upload as a
//! bearer credential. Errors share one JSON envelope, see [`FilesError`].

use axum::routing::{get, post};
use axum::Router;

mod bearer;
pub mod delete;
pub mod download;
mod error;
pub mod list;
pub mod metadata;
pub mod upload;
mod validate;

pub use delete::{DeleteRequest, DeleteResponse};
pub use download::DownloadRequest;
pub use error::FilesError;
pub use list::{FileSummary, ListRequest, ListResponse};
pub use metadata::{MetadataRequest, MetadataResponse};
pub use upload::{UploadRequest, UploadResponse};

use crate::ServiceState;

const FILES_PATH: &str = "/api/v0/files";

pub fn router(state: ServiceState) -> Router<ServiceState> {
    Router::new()
        .route("/", post(upload::handler).get(list::handler))
        .route("/:file_id", get(download::handler).delete(delete::handler))
        .route("/:file_id/metadata", get(metadata::handler))
        .with_state(state)
}
