pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::assessment::handlers as test_handlers;
use crate::roadmap::handlers as roadmap_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Roadmap API
        .route(
            "/api/v1/roadmap/generate",
            post(roadmap_handlers::generate_roadmap_handler),
        )
        .route(
            "/api/v1/roadmap/:user_id/status",
            get(roadmap_handlers::roadmap_status_handler),
        )
        .route(
            "/api/v1/roadmap/:user_id",
            get(roadmap_handlers::get_roadmap_handler),
        )
        .route(
            "/api/v1/roadmap/:user_id/recommendations",
            get(roadmap_handlers::get_recommendations_handler),
        )
        // Test API
        .route(
            "/api/v1/tests/:user_id/:phase/:milestone_id/:subtopic_id",
            get(test_handlers::get_test_handler),
        )
        .route("/api/v1/tests/submit", post(test_handlers::submit_test_handler))
        .with_state(state)
}
