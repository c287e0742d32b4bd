//! Run and workout tracking route

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ExerciseService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use healthmate_shared::models::RunEntry;
use healthmate_shared::types::LogRunRequest;

pub fn run_routes() -> Router<AppState> {
    Router::new().route("/", post(log_run))
}

/// POST /api/v1/runs
async fn log_run(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogRunRequest>,
) -> ApiResult<(StatusCode, Json<RunEntry>)> {
    let entry = ExerciseService::log_run(state.profiles(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
