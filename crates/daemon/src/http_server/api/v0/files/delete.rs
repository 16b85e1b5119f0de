use axum::extract::{Path, State};
use axum::Json;
use http::HeaderMap;
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::error::FilesError;
use super::{bearer, validate, FILES_PATH};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

#[derive(Debug, Clone, Serialize, Deserialize, clap::Args)]
pub struct DeleteRequest {
    /// ID of the file to delete
    #[arg(long)]
    pub file_id: Uuid,

    /// Token issued when the file was uploaded
    #[arg(long, env = "CUSTODY_TOKEN", hide_env_values = true)]
    pub token: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub status: String,
    pub message: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Json<DeleteResponse>, FilesError> {
    let file_id = validate::file_id(&file_id)?;
    let token = bearer::bearer_token(&headers)?;

    state
        .custody()
        .delete(file_id, token, &state.request_token())
        .await?;

    Ok(Json(DeleteResponse {
        status: "success".to_string(),
        message: "file deleted".to_string(),
    }))
}

impl ApiRequest for DeleteRequest {
    type Response = DeleteResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("{}/{}", FILES_PATH, self.file_id))?;
        Ok(client.delete(full_url).bearer_auth(self.token))
    }
}
