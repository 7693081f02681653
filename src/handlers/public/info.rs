// handlers/public/info.rs - service description, health and 404 fallback

use axum::{
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Json, Response},
};
use chrono::Utc;
use serde_json::{json, Value};

use crate::server::AppState;

const SERVICE_NAME: &str = "KU Club Backend API";
const VERSION: &str = env!("CARGO_PKG_VERSION");

/// GET / - service banner
pub async fn root(State(state): State<AppState>) -> Json<Value> {
    Json(json!({
        "success": true,
        "message": SERVICE_NAME,
        "version": VERSION,
        "environment": state.config.environment.as_str(),
        "dataSource": state.repository.source_name(),
        "documentation": "/api",
    }))
}

/// GET /api - endpoint directory
pub async fn api_info() -> Json<Value> {
    Json(json!({
        "success": true,
        "message": SERVICE_NAME,
        "version": VERSION,
        "endpoints": {
            "auth": {
                "getToken": "POST /api/auth/get-token",
            },
            "projects": {
                "list": "GET /api/projects",
                "show": "GET /api/projects/:id",
                "byOrganization": "GET /api/projects/organization/:orgId",
            },
            "organizations": {
                "list": "GET /api/organizations",
                "show": "GET /api/organizations/:id",
                "recordView": "PUT /api/organizations/:id/views",
            },
            "catalog": {
                "campuses": "GET /api/campuses",
                "organizationTypes": "GET /api/organization-types",
            },
        },
        "authentication": "Authorization: Bearer <token>",
    }))
}

/// GET /health - liveness plus a probe of the backing store.
///
/// Answers 503 when the store is unreachable; the failure policy does not
/// apply here.
pub async fn health(State(state): State<AppState>) -> Response {
    let source = state.repository.source_name();
    let timestamp = Utc::now().to_rfc3339();

    match state.repository.health_check().await {
        Ok(()) => Json(json!({
            "success": true,
            "status": "healthy",
            "dataSource": source,
            "timestamp": timestamp,
        }))
        .into_response(),
        Err(e) => {
            tracing::error!("Health check failed for {} source: {}", source, e);
            let mut body = json!({
                "success": false,
                "status": "unhealthy",
                "dataSource": source,
                "timestamp": timestamp,
                "error": "SERVICE_UNAVAILABLE",
            });
            if state.expose_details() {
                body["detail"] = Value::String(e.to_string());
            }
            (StatusCode::SERVICE_UNAVAILABLE, Json(body)).into_response()
        }
    }
}

/// Fallback for unmatched routes.
pub async fn not_found(method: Method, uri: Uri) -> Response {
    let path = uri.path();
    tracing::debug!("No route for {} {}", method, path);

    let body = if path == "/api" || path.starts_with("/api/") {
        json!({
            "success": false,
            "message": format!("API endpoint not found: {} {}", method, path),
            "error": "NOT_FOUND",
            "availableEndpoints": "/api",
        })
    } else {
        json!({
            "success": false,
            "message": "Route not found",
            "error": "NOT_FOUND",
        })
    };

    (StatusCode::NOT_FOUND, Json(body)).into_response()
}
