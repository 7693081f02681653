// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::auth::TokenError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    InternalServerError {
        message: String,
        detail: Option<String>,
    },

    // 502 Bad Gateway (backing store failures)
    BadGateway {
        message: String,
        detail: Option<String>,
    },
}

impl ApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Forbidden(_) => StatusCode::FORBIDDEN,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::InternalServerError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }

    /// Client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::InternalServerError { message, .. } => message,
            ApiError::BadGateway { message, .. } => message,
        }
    }

    /// Error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::InternalServerError { .. } => "INTERNAL_SERVER_ERROR",
            ApiError::BadGateway { .. } => "BAD_GATEWAY",
        }
    }

    pub fn to_json(&self) -> Value {
        let mut body = json!({
            "success": false,
            "message": self.message(),
            "error": self.error_code(),
        });

        if let ApiError::InternalServerError { detail: Some(detail), .. }
        | ApiError::BadGateway { detail: Some(detail), .. } = self
        {
            body["detail"] = Value::String(detail.clone());
        }

        body
    }

    /// Keep the diagnostic detail only when the deployment allows it.
    pub fn with_detail_if(self, expose: bool) -> Self {
        if expose {
            return self;
        }
        match self {
            ApiError::InternalServerError { message, .. } => {
                ApiError::InternalServerError { message, detail: None }
            }
            ApiError::BadGateway { message, .. } => ApiError::BadGateway { message, detail: None },
            other => other,
        }
    }
}

impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError {
            message: message.into(),
            detail: None,
        }
    }

    pub fn bad_gateway(message: impl Into<String>, detail: impl Into<String>) -> Self {
        ApiError::BadGateway {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

impl From<TokenError> for ApiError {
    fn from(err: TokenError) -> Self {
        match err {
            TokenError::Invalid(msg) => {
                tracing::warn!("Token verification error: {}", msg);
                ApiError::forbidden("Invalid or expired token")
            }
            TokenError::Generation(msg) => {
                tracing::error!("Token generation error: {}", msg);
                ApiError::InternalServerError {
                    message: "Failed to issue token".to_string(),
                    detail: Some(msg),
                }
            }
        }
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status_code(), Json(self.to_json())).into_response()
    }
}
