use std::any::Any;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    http::{header, HeaderName, HeaderValue, Method},
    middleware,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

use crate::config::AppConfig;
use crate::database::{Repository, SourceError};
use crate::error::ApiError;
use crate::handlers::{protected, public};
use crate::middleware::jwt_auth_middleware;

/// Shared per-process state: the startup configuration and the data facade.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub repository: Repository,
}

impl AppState {
    pub fn new(config: AppConfig, repository: Repository) -> Self {
        Self {
            config: Arc::new(config),
            repository,
        }
    }

    /// Turn a backing store failure into a 502, logging the cause and
    /// keeping the detail only where the deployment allows it.
    pub fn source_error(&self, message: &'static str) -> impl Fn(SourceError) -> ApiError + '_ {
        move |err| {
            tracing::error!("{}: {}", message, err);
            ApiError::bad_gateway(message, err.to_string()).with_detail_if(self.config.api.expose_error_details)
        }
    }

    pub fn expose_details(&self) -> bool {
        self.config.api.expose_error_details
    }
}

pub fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(public::root))
        .route("/api", get(public::api_info))
        .route("/health", get(public::health))
        .route("/api/auth/get-token", post(public::get_token))
        // Protected (bearer token)
        .merge(protected_routes(state.clone()))
        .fallback(public::not_found)
        // Global middleware
        .layer(DefaultBodyLimit::max(state.config.api.max_request_size_bytes))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

fn protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/api/projects", get(protected::projects::list))
        .route("/api/projects/organization/:org_id", get(protected::projects::by_organization))
        .route("/api/projects/:id", get(protected::projects::show))
        .route("/api/organizations", get(protected::organizations::list))
        .route("/api/organizations/:id", get(protected::organizations::show))
        .route("/api/organizations/:id/views", put(protected::organizations::record_view))
        .route("/api/campuses", get(protected::catalog::campuses))
        .route("/api/organization-types", get(protected::catalog::organization_types))
        // unmatched /api paths fall through to the 404 fallback, not the auth check
        .route_layer(middleware::from_fn_with_state(state, jwt_auth_middleware))
}

fn cors_layer(config: &AppConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_credentials(true)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-client-secret"),
        ])
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = err
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| err.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!("Handler panicked: {}", detail);

    ApiError::internal_server_error("Internal server error").into_response()
}
