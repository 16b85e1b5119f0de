use axum::extract::{Path, State};
use axum::Json;
use http::HeaderMap;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use common::custody::ObjectMetadata;

use super::error::FilesError;
use super::{bearer, validate, FILES_PATH};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct MetadataRequest {
    /// ID of the file
    #[arg(long)]
    pub file_id: Uuid,

    /// Token issued when the file was uploaded
    #[arg(long, env = "CUSTODY_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataResponse {
    pub file_id: Uuid,
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

impl From<ObjectMetadata> for MetadataResponse {
    fn from(metadata: ObjectMetadata) -> Self {
        Self {
            file_id: metadata.id,
            original_name: metadata.original_name,
            owner_id: metadata.owner_id,
            content_type: metadata.content_type,
            size_bytes: metadata.size_bytes,
            encryption_alg: metadata.encryption_alg,
            authentication_alg: metadata.authentication_alg,
            created_at: metadata.created_at,
            updated_at: metadata.updated_at,
        }
    }
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<MetadataResponse>, FilesError> {
    let file_id = validate::file_id(&file_id)?;
    let token = bearer::bearer_token(&headers)?;

    let metadata = state.custody().metadata(file_id, token).await?;
    Ok(Json(metadata.into()))
}

impl ApiRequest for MetadataRequest {
    type Response = MetadataResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("{}/{}/metadata", FILES_PATH, self.file_id))?;
        Ok(client.get(full_url).bearer_auth(self.token))
    }
}
