use axum::{
    Extension,
    extract::{Path, State, rejection::PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use time::OffsetDateTime;
use tracing::debug;

use crate::{
    application::key_settings::KeyAccessError,
    domain::tenant::TenantContext,
    infra::http::{DashboardState, repo_error_to_http},
    presentation::{
        keys::KeySettingsTemplate,
        views::{
            DashboardChrome, DashboardLayout, render_not_found_response,
            render_template_response,
        },
    },
};

use super::panels::build_settings_view;

const SOURCE: &str = "infra::http::keys::key_settings_page";

/// Route parameters as the dashboard links them. Only `key_id` selects the key.
#[derive(Debug, Clone, Deserialize)]
pub struct KeySettingsParams {
    pub api_id: String,
    pub key_auth_id: String,
    pub key_id: String,
}

pub async fn key_settings_page(
    State(state): State<DashboardState>,
    Extension(tenant): Extension<TenantContext>,
    params: Result<Path<KeySettingsParams>, PathRejection>,
) -> Response {
    let Path(params) = match params {
        Ok(params) => params,
        Err(rejection) => {
            debug!(
                target = "keydash::http::keys",
                error = %rejection,
                "settings route parameters rejected"
            );
            return render_not_found_response();
        }
    };

    let record = match state.key_settings.load(&tenant, &params.key_id).await {
        Ok(record) => record,
        Err(KeyAccessError::NotFound) => return render_not_found_response(),
        Err(KeyAccessError::Repo(err)) => {
            return repo_error_to_http(SOURCE, err).into_response();
        }
    };

    let view = build_settings_view(&params, &record, OffsetDateTime::now_utc());
    let template = KeySettingsTemplate {
        view: DashboardLayout::new(DashboardChrome::for_page("Settings"), view),
    };
    render_template_response(template, StatusCode::OK)
}
