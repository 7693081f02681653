// handlers/public/token.rs - POST /api/auth/get-token handler

use axum::{extract::State, http::HeaderMap, response::Json};
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::auth::{client_secret_matches, generate_token};
use crate::error::ApiError;
use crate::server::AppState;

/// Header carrying the shared client secret.
pub const CLIENT_SECRET_HEADER: &str = "x-client-secret";

/// POST /api/auth/get-token - exchange the client secret for a bearer token.
///
/// Output:
/// ```json
/// { "success": true, "token": "eyJ...", "expiresIn": "7d", "type": "Bearer" }
/// ```
pub async fn get_token(State(state): State<AppState>, headers: HeaderMap) -> Result<Json<Value>, ApiError> {
    let presented = headers.get(CLIENT_SECRET_HEADER).and_then(|v| v.to_str().ok());

    if !client_secret_matches(presented, &state.config.security) {
        warn!(provided = presented.is_some(), "Rejected token request with bad client secret");
        return Err(ApiError::forbidden("Invalid client secret"));
    }

    let issued = generate_token(&state.config.security)
        .map_err(|e| ApiError::from(e).with_detail_if(state.expose_details()))?;

    info!("Issued client token, expires in {}", issued.expires_in);
    Ok(Json(json!({
        "success": true,
        "token": issued.token,
        "expiresIn": issued.expires_in,
        "type": "Bearer",
    })))
}
