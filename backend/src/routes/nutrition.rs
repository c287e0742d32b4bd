//! Meal tracking route

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::services::NutritionService;
use crate::state::AppState;
use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use healthmate_shared::models::FoodEntry;
use healthmate_shared::types::LogMealRequest;

pub fn meal_routes() -> Router<AppState> {
    Router::new().route("/", post(log_meal))
}

/// POST /api/v1/meals
///
/// `meal_type` defaults to Lunch and `goal` to Maintenance.
async fn log_meal(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<LogMealRequest>,
) -> ApiResult<(StatusCode, Json<FoodEntry>)> {
    let entry = NutritionService::log_meal(state.profiles(), auth.user_id, req).await?;
    Ok((StatusCode::CREATED, Json(entry)))
}
