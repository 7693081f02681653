use axum::{
    extract::{Request, State},
    http::HeaderMap,
    middleware::Next,
    response::Response,
};

use crate::auth::verify_token;
use crate::error::ApiError;
use crate::server::AppState;

/// Bearer token middleware: 401 when no token is presented, 403 when it does not verify.
pub async fn jwt_auth_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let token = extract_bearer_token(&headers).ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    verify_token(token, &state.config.security)?;

    Ok(next.run(request).await)
}

/// Token from `Authorization: Bearer <token>`; `None` when missing or blank.
fn extract_bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(axum::http::header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.trim().split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("bearer") {
        return None;
    }
    let token = token.trim();
    (!token.is_empty()).then_some(token)
}
