use axum::body::Body;
use axum::extract::{Path, State};
use axum::response::{IntoResponse, Response};
use http::header::{CACHE_CONTROL, CONTENT_DISPOSITION, CONTENT_TYPE};
use http::{HeaderMap, HeaderValue, StatusCode};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::{Client, RequestBuilder, Url};
use uuid::Uuid;

use super::error::FilesError;
use super::{bearer, validate, FILES_PATH};
use crate::http_server::api::client::ApiError;
use crate::ServiceState;

/// RFC 5987 `attr-char`: everything else in `filename*` is percent-encoded
const ATTR_CHAR: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'!')
    .remove(b'#')
    .remove(b'$')
    .remove(b'&')
    .remove(b'+')
    .remove(b'-')
    .remove(b'.')
    .remove(b'^')
    .remove(b'_')
    .remove(b'`')
    .remove(b'|')
    .remove(b'~');

/// Fetch the decrypted content of one file
#[derive(Debug, Clone)]
pub struct DownloadRequest {
    pub file_id: Uuid,
    pub token: String,
}

pub async fn handler(
    State(state): State<ServiceState>,
    Path(file_id): Path<String>,
    headers: HeaderMap,
) -> Result<Response, FilesError> {
    let file_id = validate::file_id(&file_id)?;
    let token = bearer::bearer_token(&headers)?;

    let object = state
        .custody()
        .retrieve(file_id, token, &state.request_token())
        .await?;

    let content_type = HeaderValue::from_str(&object.content_type)
        .unwrap_or_else(|_| HeaderValue::from_static("application/octet-stream"));
    let disposition = content_disposition(&object.display_name);

    Ok((
        StatusCode::OK,
        [
            (CONTENT_TYPE, content_type),
            (CACHE_CONTROL, HeaderValue::from_static("no-store")),
            (CONTENT_DISPOSITION, disposition),
        ],
        Body::from(object.content),
    )
        .into_response())
}

impl DownloadRequest {
    pub fn build_request(self, base_url: &Url, client: &Client) -> Result<RequestBuilder, ApiError> {
        let full_url = base_url.join(&format!("{}/{}", FILES_PATH, self.file_id))?;
        Ok(client.get(full_url).bearer_auth(self.token))
    }
}

/// `inline` disposition for `display_name`. Names outside ASCII get an ASCII
/// `filename` fallback plus a UTF-8 `filename*` parameter.
fn content_disposition(display_name: &str) -> HeaderValue {
    let sanitized = validate::sanitize_filename(display_name);
    if sanitized.is_ascii() {
        if let Ok(value) = HeaderValue::from_str(&format!("inline; filename=\"{}\"", sanitized)) {
            return value;
        }
    }

    let fallback: String = sanitized
        .chars()
        .map(|c| if c.is_ascii() { c } else { '_' })
        .collect();
    let encoded = utf8_percent_encode(&sanitized, ATTR_CHAR);
    HeaderValue::from_str(&format!(
        "inline; filename=\"{}\"; filename*=UTF-8''{}",
        fallback, encoded
    ))
    .unwrap_or_else(|_| HeaderValue::from_static("inline; filename=\"file\""))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ascii_name_has_plain_filename() {
        assert_eq!(
            content_disposition("report.pdf"),
            "inline; filename=\"report.pdf\""
        );
    }

    #[test]
    fn test_non_ascii_name_keeps_utf8_filename() {
        assert_eq!(
            content_disposition("résumé.pdf"),
            "inline; filename=\"r_sum_.pdf\"; filename*=UTF-8''r%C3%A9sum%C3%A9.pdf"
        );
        assert_eq!(
            content_disposition("отчёт 2024.txt"),
            "inline; filename=\"_____ 2024.txt\"; filename*=UTF-8''%D0%BE%D1%82%D1%87%D1%91%D1%82%202024.txt"
        );
    }

    #[test]
    fn test_unsafe_characters_are_stripped_first() {
        assert_eq!(
            content_disposition("../\"é\".txt"),
            "inline; filename=\"_.txt\"; filename*=UTF-8''%C3%A9.txt"
        );
    }
}
