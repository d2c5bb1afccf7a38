use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use tracing::info;

use mizan_core::api_types::HealthResponse;
use mizan_core::store::KnowledgeStore;

use crate::state::AppState;

const VERSION: &str = env!("CARGO_PKG_VERSION");

pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    info!("Health check requested");

    let (qdrant_connected, entry_count) = match state.store.entry_count().await {
        Ok(count) => (true, count),
        Err(e) => {
            tracing::warn!("qdrant connectivity check failed: {e}");
            (false, 0)
        }
    };

    let status = if qdrant_connected {
        "ok".to_string()
    } else {
        "degraded".to_string()
    };

    let response = HealthResponse {
        status,
        version: VERSION.to_string(),
        qdrant_connected,
        entry_count,
    };

    (StatusCode::OK, Json(response))
}
