use axum::extract::{Multipart, State};
use axum::response::IntoResponse;
use axum::Json;
use http::StatusCode;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Url};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use common::custody::UploadRequest as CustodyUpload;

use super::error::FilesError;
use super::{validate, FILES_PATH};
use crate::http_server::api::client::{ApiError, ApiRequest};
use crate::ServiceState;

/// A file to hand over to custody
#[derive(Debug, Clone)]
pub struct UploadRequest {
    pub file_name: String,
    pub content: Vec<u8>,
    /// Sent as the part's content type; the server guesses from the name if unset
    pub content_type: Option<String>,
    pub owner_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    pub status: String,
    pub file_id: Uuid,
    pub token: String,
    /// Seconds until `token` expires
    pub expires_in: u64,
    pub content_type: String,
    pub size_bytes: u64,
}

struct FilePart {
    name: Option<String>,
    declared_type: Option<String>,
    content: Vec<u8>,
}

pub async fn handler(
    State(state): State<ServiceState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, FilesError> {
    let mut file: Option<FilePart> = None;
    let mut owner_id: Option<String> = None;

    while let Some(field) = multipart.next_field().await? {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            "file" => {
                let name = field.file_name().map(str::to_string);
                let declared_type = field.content_type().map(str::to_string);
                let content = field.bytes().await?.to_vec();
                file = Some(FilePart {
                    name,
                    declared_type,
                    content,
                });
            }
            // `user_id` is accepted for older clients
            "owner_id" | "user_id" => {
                owner_id = Some(field.text().await?);
            }
            _ => {
                tracing::debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let file =
        file.ok_or_else(|| FilesError::InvalidRequest("file field is required".to_string()))?;

    let policy = state.upload_policy();
    if !policy.allows_size(file.content.len()) {
        return Err(FilesError::TooLarge(policy.max_bytes));
    }

    let owner_id = validate::owner_id(owner_id.as_deref())?;
    let display_name = validate::display_name(file.name.as_deref())?;
    let content_type = validate::content_type(file.declared_type.as_deref(), &display_name);
    if !policy.allows_content_type(&content_type) {
        return Err(FilesError::UnsupportedContentType(content_type));
    }

    let receipt = state
        .custody()
        .upload(
            CustodyUpload {
                display_name,
                content: file.content,
                content_type,
                owner_id,
            },
            &state.request_token(),
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(UploadResponse {
            status: "success".to_string(),
            file_id: receipt.object_id,
            token: receipt.credential,
            expires_in: receipt.expires_in,
            content_type: receipt.content_type,
            size_bytes: receipt.size_bytes,
        }),
    ))
}

impl ApiRequest for UploadRequest {
    type Response = UploadResponse;

    fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(FILES_PATH)?;

        let mut part = Part::bytes(self.content).file_name(self.file_name);
        if let Some(content_type) = &self.content_type {
            part = part.mime_str(content_type)?;
        }

        let mut form = Form::new().part("file", part);
        if let Some(owner_id) = self.owner_id {
            form = form.text("owner_id", owner_id);
        }

        Ok(client.post(full_url).multipart(form))
    }
}
