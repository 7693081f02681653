// handlers/protected/catalog.rs - campus and organization type listings

use axum::{
    extract::State,
    response::{IntoResponse, Response},
};

use crate::config::CatalogMode;
use crate::error::ApiError;
use crate::middleware::ApiResponse;
use crate::models::{KNOWN_CAMPUSES, KNOWN_ORGANIZATION_TYPES};
use crate::server::AppState;

/// GET /api/campuses
///
/// Builtin mode answers with the fixed list of campus names; backend mode
/// answers with `{id, name}` records from the data source.
pub async fn campuses(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.config.source.catalog {
        CatalogMode::Builtin => Ok(ApiResponse::list(KNOWN_CAMPUSES.to_vec(), "No campuses found").into_response()),
        CatalogMode::Backend => {
            let campuses = state
                .repository
                .list_campuses()
                .await
                .map_err(state.source_error("Failed to fetch campuses"))?;
            Ok(ApiResponse::list(campuses, "No campuses found").into_response())
        }
    }
}

/// GET /api/organization-types
pub async fn organization_types(State(state): State<AppState>) -> Result<Response, ApiError> {
    match state.config.source.catalog {
        CatalogMode::Builtin => Ok(
            ApiResponse::list(KNOWN_ORGANIZATION_TYPES.to_vec(), "No organization types found").into_response(),
        ),
        CatalogMode::Backend => {
            let types = state
                .repository
                .list_organization_types()
                .await
                .map_err(state.source_error("Failed to fetch organization types"))?;
            Ok(ApiResponse::list(types, "No organization types found").into_response())
        }
    }
}
