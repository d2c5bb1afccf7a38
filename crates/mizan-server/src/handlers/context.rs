use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use tracing::{info, instrument};

use mizan_core::api_types::{ContextRequest, ContextResponse};

use crate::state::AppState;

#[instrument(skip(state, req), fields(region = req.region.as_str()))]
pub async fn get_context(
    State(state): State<AppState>,
    Json(req): Json<ContextRequest>,
) -> impl IntoResponse {
    info!(query_len = req.query.len(), "Received context request");

    // The repository degrades to "" on every failure path, so this handler
    // has no error branch.
    let context = state.repository.get_context(&req.query, req.region).await;

    info!(context_len = context.len(), "Context request completed");

    Json(ContextResponse { context })
}
