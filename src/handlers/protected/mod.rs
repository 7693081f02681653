// handlers/protected/mod.rs - Protected handlers (bearer token required)
//
// Every route here sits behind `jwt_auth_middleware`.

pub mod catalog;
pub mod organizations;
pub mod projects;

use crate::error::ApiError;

const MAX_ID_LEN: usize = 128;

/// Path identifiers are opaque strings; reject only blank, oversized or
/// control-character ids.
pub(crate) fn validate_id<'a>(raw: &'a str, message: &str) -> Result<&'a str, ApiError> {
    let id = raw.trim();
    if id.is_empty() || id.len() > MAX_ID_LEN || id.chars().any(char::is_control) {
        return Err(ApiError::bad_request(message));
    }
    Ok(id)
}
