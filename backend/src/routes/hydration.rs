//! Hydration routes

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::HydrationService;
use crate::state::AppState;
use axum::{extract::State, routing::get, Json, Router};
use healthmate_shared::types::{HydrationTodayResponse, UpdateHydrationRequest};

pub fn hydration_routes() -> Router<AppState> {
    Router::new().route("/today", get(get_today).put(set_today))
}

/// GET /api/v1/hydration/today
async fn get_today(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<HydrationTodayResponse>> {
    let cup_size = state.reconciler.cup_size_ml;
    let today = HydrationService::today(state.profiles(), auth.user_id, cup_size).await?;
    Ok(Json(today))
}

/// PUT /api/v1/hydration/today - Replace today's cup count
async fn set_today(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateHydrationRequest>,
) -> ApiResult<Json<HydrationTodayResponse>> {
    let cup_size = state.reconciler.cup_size_ml;
    let today = HydrationService::set_today(state.profiles(), auth.user_id, req, cup_size).await?;
    Ok(Json(today))
}
