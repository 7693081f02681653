use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;
use serde_json::{json, Map, Value};

/// Wrapper for API responses that adds the `{success: true, data}` envelope
#[derive(Debug)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    /// Envelope fields beside `data`, e.g. `total`
    pub extra: Map<String, Value>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a successful API response
    pub fn success(data: T) -> Self {
        Self {
            data,
            extra: Map::new(),
        }
    }

    /// Add an envelope field next to `data`
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.extra.insert(key.to_string(), value.into());
        self
    }
}

impl<T: Serialize> ApiResponse<Vec<T>> {
    /// List envelope: `total`, plus `message` when the list is empty
    pub fn list(data: Vec<T>, empty_message: &str) -> Self {
        let total = data.len();
        let response = Self::success(data).with("total", total);
        if total == 0 {
            response.with("message", empty_message)
        } else {
            response
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        let data_value = match serde_json::to_value(&self.data) {
            Ok(value) => value,
            Err(e) => {
                tracing::error!("Failed to serialize response data: {}", e);
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({
                        "success": false,
                        "message": "Failed to serialize response data",
                        "error": "INTERNAL_SERVER_ERROR"
                    })),
                )
                    .into_response();
            }
        };

        let mut envelope = Map::new();
        envelope.insert("success".into(), Value::Bool(true));
        envelope.insert("data".into(), data_value);
        envelope.extend(self.extra);

        (StatusCode::OK, Json(Value::Object(envelope))).into_response()
    }
}

pub type ApiResult<T> = Result<ApiResponse<T>, crate::error::ApiError>;
