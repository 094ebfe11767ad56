pub mod health;

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::scheduler::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Alert lifecycle API
        .route("/api/v1/alerts", post(handlers::handle_create_alert))
        .route("/api/v1/alerts/:id", get(handlers::handle_get_alert))
        .route("/api/v1/alerts/:id/fire", post(handlers::handle_fire_alert))
        .route(
            "/api/v1/alerts/:id/snooze",
            post(handlers::handle_snooze_alert),
        )
        .route(
            "/api/v1/alerts/:id/deactivate",
            post(handlers::handle_deactivate_alert),
        )
        .route(
            "/api/v1/alerts/:id/reactivate",
            post(handlers::handle_reactivate_alert),
        )
        .route(
            "/api/v1/alerts/:id/schedule",
            put(handlers::handle_update_schedule),
        )
        .with_state(state)
}
