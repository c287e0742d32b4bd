//! Profile document and lifestyle check-in routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::ProfileService;
use crate::state::AppState;
use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use healthmate_shared::checkins::DueCheckIns;
use healthmate_shared::models::{LifestyleUpdate, UserProfile};
use healthmate_shared::types::{ProfileMetricsResponse, UpdateLifestyleRequest};

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(get_profile))
        .route("/metrics", get(get_metrics))
        .route("/reminders", get(get_reminders))
        .route("/lifestyle", put(update_lifestyle))
}

/// GET /api/v1/profile
async fn get_profile(State(state): State<AppState>, auth: AuthUser) -> ApiResult<Json<UserProfile>> {
    let profile = ProfileService::get_profile(state.profiles(), auth.user_id).await?;
    Ok(Json(profile))
}

/// GET /api/v1/profile/metrics - BMI value and category
async fn get_metrics(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<ProfileMetricsResponse>> {
    let metrics = ProfileService::get_metrics(state.profiles(), auth.user_id).await?;
    Ok(Json(metrics))
}

/// GET /api/v1/profile/reminders - which check-in to prompt for
async fn get_reminders(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<DueCheckIns>> {
    let due = ProfileService::get_reminders(state.profiles(), auth.user_id).await?;
    Ok(Json(due))
}

/// PUT /api/v1/profile/lifestyle
async fn update_lifestyle(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateLifestyleRequest>,
) -> ApiResult<Json<LifestyleUpdate>> {
    let entry = ProfileService::update_lifestyle(state.profiles(), auth.user_id, req).await?;
    Ok(Json(entry))
}
