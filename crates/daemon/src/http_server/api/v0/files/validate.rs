use std::sync::LazyLock;

use regex::Regex;
use uuid::Uuid;

use super::error::FilesError;

pub const MAX_OWNER_ID_LENGTH: usize = 64;
pub const MAX_FILENAME_LENGTH: usize = 255;

static OWNER_ID_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_-]+$").unwrap());

pub fn file_id(raw: &str) -> Result<Uuid, FilesError> {
    Uuid::parse_str(raw.trim()).map_err(|_| FilesError::InvalidFileId)
}

/// Validate an optional owner id. Blank input means no owner.
pub fn owner_id(raw: Option<&str>) -> Result<Option<String>, FilesError> {
    let owner = match raw.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(owner) => owner,
    };

    if owner.len() > MAX_OWNER_ID_LENGTH {
        return Err(FilesError::InvalidRequest(format!(
            "owner id exceeds {} characters",
            MAX_OWNER_ID_LENGTH
        )));
    }
    if !OWNER_ID_PATTERN.is_match(owner) {
        return Err(FilesError::InvalidRequest(
            "owner id may only contain letters, digits, '-' and '_'".to_string(),
        ));
    }

    Ok(Some(owner.to_string()))
}

pub fn display_name(raw: Option<&str>) -> Result<String, FilesError> {
    let name = raw.map(str::trim).filter(|name| !name.is_empty()).unwrap_or("upload");
    if name.chars().count() > MAX_FILENAME_LENGTH {
        return Err(FilesError::InvalidRequest(format!(
            "filename exceeds {} characters",
            MAX_FILENAME_LENGTH
        )));
    }
    Ok(name.to_string())
}

/// Make a stored display name safe to echo inside a quoted header parameter.
pub fn sanitize_filename(name: &str) -> String {
    let cleaned: String = name
        .replace("..", "")
        .chars()
        .filter(|c| !matches!(c, '"' | '/' | '\\') && !c.is_control())
        .collect();

    if cleaned.is_empty() {
        "file".to_string()
    } else {
        cleaned
    }
}

/// The declared part type without parameters, or a guess from the file name
/// when the client sent nothing more specific than octet-stream.
pub fn content_type(declared: Option<&str>, file_name: &str) -> String {
    let essence = declared
        .and_then(|ct| ct.split(';').next())
        .map(|ct| ct.trim().to_ascii_lowercase())
        .filter(|ct| !ct.is_empty() && ct != "application/octet-stream");

    essence.unwrap_or_else(|| {
        mime_guess::from_path(file_name)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    })
}
