use axum::{
    extract::{Json, State},
    response::IntoResponse,
};
use tracing::{info, instrument};

use mizan_core::api_types::{HarvestRequest, HarvestResponse};

use crate::state::AppState;

#[instrument(skip(state, req), fields(region = req.region.as_str()))]
pub async fn harvest_answer(
    State(state): State<AppState>,
    Json(req): Json<HarvestRequest>,
) -> impl IntoResponse {
    info!(answer_len = req.answer.len(), "Received harvest request");

    let inserted = state.repository.harvest(&req.answer, req.region).await;

    info!(inserted, "Harvest request completed");

    Json(HarvestResponse { inserted })
}
