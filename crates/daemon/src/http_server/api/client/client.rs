use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_DISPOSITION, CONTENT_TYPE};
use reqwest::{Client, Response};
use url::Url;

use super::error::ApiError;
use super::ApiRequest;
use crate::http_server::api::v0::files::DownloadRequest;

#[derive(Debug, Clone)]
pub struct ApiClient {
    pub remote: Url,
    client: Client,
}

/// Raw content returned by a file download
#[derive(Debug, Clone)]
pub struct FileDownload {
    pub content: Vec<u8>,
    pub content_type: Option<String>,
    pub filename: Option<String>,
}

impl ApiClient {
    pub fn new(remote: &Url) -> Result<Self, ApiError> {
        let mut default_headers = HeaderMap::new();
        default_headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        let client = Client::builder().default_headers(default_headers).build()?;

        Ok(Self {
            remote: remote.clone(),
            client,
        })
    }

    pub async fn call<T: ApiRequest>(&self, request: T) -> Result<T::Response, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = check_status(request_builder.send().await?).await?;
        Ok(response.json::<T::Response>().await?)
    }

    /// Fetch and decrypt a file; the body is returned as-is
    pub async fn download(&self, request: DownloadRequest) -> Result<FileDownload, ApiError> {
        let request_builder = request.build_request(&self.remote, &self.client)?;
        let response = check_status(request_builder.send().await?).await?;

        let headers = response.headers();
        let content_type = headers
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let filename = headers
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);
        let content = response.bytes().await?.to_vec();

        Ok(FileDownload {
            content,
            content_type,
            filename,
        })
    }

    /// Get the base URL for API requests
    pub fn base_url(&self) -> &Url {
        &self.remote
    }

    /// Get the underlying HTTP client for custom requests
    pub fn http_client(&self) -> &Client {
        &self.client
    }
}

async fn check_status(response: Response) -> Result<Response, ApiError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await?;
    Err(ApiError::HttpStatus(status, error_message(&body)))
}

/// Pull `message` out of the JSON error envelope, falling back to the raw body
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message")?.as_str().map(str::to_string))
        .unwrap_or_else(|| body.to_string())
}

fn disposition_filename(disposition: &str) -> Option<String> {
    disposition.split(';').find_map(|part| {
        let value = part.trim().strip_prefix("filename=")?;
        Some(value.trim_matches('"').to_string())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_message_from_envelope() {
        assert_eq!(
            error_message(r#"{"status":"error","message":"file not found"}"#),
            "file not found"
        );
        assert_eq!(error_message("plain failure"), "plain failure");
    }

    #[test]
    fn test_disposition_filename() {
        assert_eq!(
            disposition_filename(r#"inline; filename="report.pdf""#).as_deref(),
            Some("report.pdf")
        );
        assert_eq!(disposition_filename("inline"), None);
    }
}
