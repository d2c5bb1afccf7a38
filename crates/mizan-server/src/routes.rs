use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers;
use crate::state::AppState;

pub fn create_router() -> Router<AppState> {
    Router::new()
        // Health
        .route("/api/health", get(handlers::health::health_check))
        // Knowledge cache
        .route("/api/context", post(handlers::context::get_context))
        .route("/api/harvest", post(handlers::harvest::harvest_answer))
}
