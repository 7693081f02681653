// handlers/protected/projects.rs - /api/projects handlers

use axum::extract::{Path, State};

use super::validate_id;
use crate::error::ApiError;
use crate::middleware::{ApiResponse, ApiResult};
use crate::models::Project;
use crate::normalize::normalize_project;
use crate::server::AppState;

/// GET /api/projects - every project, normalized
pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Project>> {
    let raw = state
        .repository
        .list_projects()
        .await
        .map_err(state.source_error("Failed to fetch projects"))?;

    let projects: Vec<Project> = raw.iter().map(normalize_project).collect();
    Ok(ApiResponse::list(projects, "No projects found"))
}

/// GET /api/projects/:id
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Project> {
    let id = validate_id(&id, "Valid project ID is required")?;

    let raw = state
        .repository
        .get_project(id)
        .await
        .map_err(state.source_error("Failed to fetch project"))?
        .ok_or_else(|| ApiError::not_found("Project not found"))?;

    Ok(ApiResponse::success(normalize_project(&raw)))
}

/// GET /api/projects/organization/:org_id - projects owned by one organization
pub async fn by_organization(
    State(state): State<AppState>,
    Path(org_id): Path<String>,
) -> ApiResult<Vec<Project>> {
    let org_id = validate_id(&org_id, "Valid organization ID is required")?;

    let raw = state
        .repository
        .list_projects_by_organization(org_id)
        .await
        .map_err(state.source_error("Failed to fetch projects for organization"))?;

    let projects: Vec<Project> = raw.iter().map(normalize_project).collect();
    Ok(ApiResponse::list(projects, "No projects found for this organization").with("organizationId", org_id))
}
