use axum::extract::{Query, State};
use axum::Json;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::custody::ObjectMetadata;

use super::error::FilesError;
use super::{validate, FILES_PATH};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct ListRequest {
    /// Owner whose files to list
    #[arg(long)]
    pub owner_id: String,
}

#[derive(Debug, Deserialize)]
pub struct ListQuery {
    #[serde(alias = "user_id")]
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileSummary {
    pub file_id: Uuid,
    pub original_name: String,
    pub content_type: String,
    pub size_bytes: u64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<ObjectMetadata> for FileSummary {
    fn from(metadata: ObjectMetadata) -> Self {
        Self {
            file_id: metadata.id,
            original_name: metadata.original_name,
            content_type: metadata.content_type,
            size_bytes: metadata.size_bytes,
            created_at: metadata.created_at,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ListResponse {
    pub status: String,
    pub files: Vec<FileSummary>,
    pub count: usize,
}

/// Live files of one owner, newest first. Listing reveals descriptive fields
/// only, so it takes no credential.
pub async fn handler(
    State(state): State<ServiceState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse>, FilesError> {
    let owner_id = validate::owner_id(query.owner_id.as_deref())?.ok_or_else(|| {
        FilesError::InvalidRequest("owner_id query parameter required".to_string())
    })?;

    let files: Vec<FileSummary> = state
        .custody()
        .list_by_owner(&owner_id)
        .await?
        .into_iter()
        .map(FileSummary::from)
        .collect();

    Ok(Json(ListResponse {
        status: "success".to_string(),
        count: files.len(),
        files,
    }))
}

impl ApiRequest for ListRequest {
    type Response = ListResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(FILES_PATH)?;
        Ok(client
            .get(full_url)
            .query(&[("owner_id", self.owner_id.as_str())]))
    }
}
