//! Weight tracking route

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::WeightService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use healthmate_shared::models::WeightEntry;
use healthmate_shared::types::LogWeightRequest;

pub fn weight_routes() -> Router<AppState> {
    Router::new().route("/", post(log_weight))
}

/// POST /api/v1/weight - Log today's weight in kilograms
async fn log_weight(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogWeightRequest>,
) -> ApiResult<(StatusCode, Json<WeightEntry>)> {
    let entry = WeightService::log_weight(state.profiles(), auth.user_id, req.weight).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
