// handlers/protected/organizations.rs - /api/organizations handlers

use axum::extract::{Path, State};
use serde::Serialize;
use tracing::info;

use super::validate_id;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Organization;
use crate::normalize::normalize_organization;
use crate::server::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewCount {
    pub id: String,
    pub current_views: i64,
}

/// GET /api/organizations
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Organization>> {
    let raw = state
        .repository
        .list_organizations()
        .await
        .map_err(state.source_error("Failed to fetch organizations"))?;

    let organizations: Vec<Organization> = raw.iter().map(normalize_organization).collect();
    Ok(ApiResponse::list(organizations, "No organizations found"))
}

/// GET /api/organizations/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Organization> {
    let id = validate_id(&id, "Valid organization ID is required")?;

    let raw = state
        .repository
        .get_organization(id)
        .await
        .map_err(state.source_error("Failed to fetch organization"))?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;

    Ok(ApiResponse::success(normalize_organization(&raw)))
}

/// PUT /api/organizations/:id/views - count one page view
pub async fn record_view(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ViewCount> {
    let id = validate_id(&id, "Valid organization ID is required")?;

    let current_views = state
        .repository
        .increment_organization_views(id)
        .await
        .map_err(state.source_error("Failed to update organization views"))?
        .ok_or_else(|| ApiError::not_found("Organization not found"))?;

    info!(organization = id, views = current_views, "Recorded organization view");
    Ok(ApiResponse::success(ViewCount {
        id: id.to_string(),
        current_views,
    }))
}
