use axum::extract::multipart::MultipartError;
use axum::response::{IntoResponse, Response};
use axum::Json;
use http::StatusCode;

use common::custody::CustodyError;

/// Everything a files handler can fail with.
///
/// Rendered as `{"status": "error", "message": ...}`. Internal failures are
/// logged in full and reported to the client with a generic message.
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    #[error("{0}")]
    InvalidRequest(String),
    #[error("invalid file id")]
    InvalidFileId,
    #[error("{0}")]
    Unauthorized(&'static str),
    #[error("unsupported content type: {0}")]
    UnsupportedContentType(String),
    #[error("file exceeds limit of {0} bytes")]
    TooLarge(usize),
    #[error("invalid multipart form: {0}")]
    Multipart(#[from] MultipartError),
    #[error(transparent)]
    Custody(#[from] CustodyError),
}

impl FilesError {
    fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            FilesError::InvalidRequest(_) | FilesError::InvalidFileId => {
                (StatusCode::BAD_REQUEST, self.to_string())
            }
            FilesError::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, msg.to_string()),
            FilesError::UnsupportedContentType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, self.to_string())
            }
            FilesError::TooLarge(_) => (StatusCode::PAYLOAD_TOO_LARGE, self.to_string()),
            FilesError::Multipart(e) => (e.status(), "invalid multipart form".to_string()),
            FilesError::Custody(e) => match e {
                CustodyError::Validation(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
                CustodyError::CredentialExpired => {
                    (StatusCode::FORBIDDEN, "token expired".to_string())
                }
                CustodyError::CredentialInvalid(_) => {
                    (StatusCode::FORBIDDEN, "invalid token".to_string())
                }
                CustodyError::ObjectMismatch => (
                    StatusCode::FORBIDDEN,
                    "token does not grant access to this file".to_string(),
                ),
                CustodyError::NotFound(_) => (StatusCode::NOT_FOUND, "file not found".to_string()),
                _ => (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                ),
            },
        }
    }
}

impl IntoResponse for FilesError {
    fn into_response(self) -> Response {
        let (status, message) = self.status_and_message();

        if status.is_server_error() {
            tracing::error!(error = ?self, "files request failed");
        } else {
            tracing::debug!(status = %status, error = %self, "files request rejected");
        }

        let body = serde_json::json!({"status": "error", "message": message});
        (status, Json(body)).into_response()
    }
}
