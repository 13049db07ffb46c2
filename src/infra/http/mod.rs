mod health;
mod keys;
mod middleware;
mod state;
mod tenant;

pub use middleware::RequestContext;
pub use state::DashboardState;
pub use tenant::{TenantResolver, resolve_tenant};

use axum::{
    Router,
    http::StatusCode,
    middleware as axum_middleware,
    response::{IntoResponse, Response},
    routing::get,
};
use sqlx::Error as SqlxError;

use crate::application::error::{ErrorReport, HttpError};
use crate::application::repos::RepoError;
use crate::infra::assets;
use crate::presentation::views::render_not_found_response;

use middleware::{log_responses, set_request_context};

pub const KEY_SETTINGS_ROUTE: &str = "/apis/{api_id}/keys/{key_auth_id}/{key_id}/settings";

pub fn build_router(state: DashboardState) -> Router {
    let tenant_routes = Router::new()
        .route(KEY_SETTINGS_ROUTE, get(keys::key_settings_page))
        .route_layer(axum_middleware::from_fn_with_state(
            state.tenant_resolver.clone(),
            resolve_tenant,
        ));

    Router::new()
        .merge(tenant_routes)
        .route("/_health/db", get(health::db_health))
        .route("/static/admin/{*path}", get(assets::serve_admin))
        .fallback(fallback)
        .with_state(state)
        .layer(axum_middleware::from_fn(log_responses))
        .layer(axum_middleware::from_fn(set_request_context))
}

async fn fallback() -> Response {
    render_not_found_response()
}

fn db_health_response(result: Result<(), SqlxError>) -> Response {
    match result {
        Ok(()) => StatusCode::NO_CONTENT.into_response(),
        Err(err) => {
            let mut response = StatusCode::SERVICE_UNAVAILABLE.into_response();
            ErrorReport::from_error(
                "infra::http::db_health",
                StatusCode::SERVICE_UNAVAILABLE,
                &err,
            )
            .attach(&mut response);
            response
        }
    }
}

/// Map a repository error to a consistent HTTP error response.
pub fn repo_error_to_http(source: &'static str, err: RepoError) -> HttpError {
    match err {
        RepoError::NotFound => HttpError::new(
            source,
            StatusCode::NOT_FOUND,
            "Resource not found",
            "resource not found",
        ),
        RepoError::Integrity { message } => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Stored data is inconsistent",
            message,
        ),
        RepoError::Timeout => HttpError::new(
            source,
            StatusCode::SERVICE_UNAVAILABLE,
            "Database timeout",
            "Database timeout",
        ),
        RepoError::Persistence(message) => HttpError::new(
            source,
            StatusCode::INTERNAL_SERVER_ERROR,
            "Persistence error",
            message,
        ),
    }
}
