pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::profile::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/scenario", get(handlers::handle_get_scenario))
        .route("/api/v1/profiles", post(handlers::handle_create_profile))
        .route("/api/v1/profiles/:id/chart", get(handlers::handle_get_chart))
        .route(
            "/api/v1/profiles/:id/report",
            get(handlers::handle_get_report),
        )
        .with_state(state)
}
