use axum::{extract::State, response::Response};

use super::{DashboardState, db_health_response};

pub(super) async fn db_health(State(state): State<DashboardState>) -> Response {
    db_health_response(state.db.health_check().await)
}
