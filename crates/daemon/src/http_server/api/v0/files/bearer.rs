use http::header::AUTHORIZATION;
use http::HeaderMap;

use super::error::FilesError;

/// Extract the credential from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, FilesError> {
    let value = headers
        .get(AUTHORIZATION)
        .ok_or(FilesError::Unauthorized("authorization header required"))?
        .to_str()
        .map_err(|_| FilesError::Unauthorized("invalid authorization header"))?;

    let (scheme, token) = value
        .split_once(' ')
        .ok_or(FilesError::Unauthorized("invalid authorization header"))?;
    let token = token.trim();
    if !scheme.eq_ignore_ascii_case("bearer") || token.is_empty() {
        return Err(FilesError::Unauthorized("invalid authorization header"));
    }

    Ok(token)
}
