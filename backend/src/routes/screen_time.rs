//! Screen time tracking route

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ScreenTimeService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use healthmate_shared::models::ScreenTimeEntry;
use healthmate_shared::types::LogScreenTimeRequest;

pub fn screen_time_routes() -> Router<AppState> {
    Router::new().route("/", post(log_screen_time))
}

/// POST /api/v1/screen-time
async fn log_screen_time(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogScreenTimeRequest>,
) -> ApiResult<(StatusCode, Json<ScreenTimeEntry>)> {
    let entry =
        ScreenTimeService::log_screen_time(state.profiles(), auth.user_id, req.screen_time_hours)
            .await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
