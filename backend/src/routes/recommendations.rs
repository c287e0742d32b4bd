//! Recommendation routes
//!
//! `POST /recommendations/:domain` always answers 200 with a
//! `PredictionState`; missing inputs and predictor failures are outcomes,
//! not HTTP errors.

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::services::{RecommendationContext, RecommendationService};
use crate::state::AppState;
use axum::{
    extract::{Path, State},
    routing::{get, post},
    Json, Router,
};
use healthmate_shared::models::RecommendationDomain;
use std::time::Duration;
use tower_http::timeout::TimeoutLayer;
use healthmate_shared::types::{
    PredictionState, RecommendationInputResponse, RecommendationsResponse,
};

/// Reads get `timeout`; a run is never cut off by the server
pub fn recommendation_routes(timeout: Duration) -> Router<AppState> {
    Router::new()
        .route("/", get(get_recommendations))
        .route("/:domain/input", get(get_input))
        .layer(TimeoutLayer::new(timeout))
        .route("/:domain", post(request_recommendation))
}

fn parse_domain(raw: &str) -> Result<RecommendationDomain, ApiError> {
    raw.parse::<RecommendationDomain>().map_err(|_| {
        ApiError::BadRequest(format!(
            "Unknown recommendation domain '{}'. Expected workout, lifestyle or meal",
            raw
        ))
    })
}

/// GET /api/v1/recommendations - stored latest and history per domain
async fn get_recommendations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<RecommendationsResponse>> {
    let stored = RecommendationService::stored(state.profiles(), auth.user_id).await?;
    Ok(Json(stored))
}

/// GET /api/v1/recommendations/:domain/input - the request body a run would send
async fn get_input(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(domain): Path<String>,
) -> ApiResult<Json<RecommendationInputResponse>> {
    let domain = parse_domain(&domain)?;
    let ctx = RecommendationContext::from(&state);
    Ok(Json(RecommendationService::input(&ctx, auth.user_id, domain).await))
}

/// POST /api/v1/recommendations/:domain
async fn request_recommendation(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(domain): Path<String>,
) -> ApiResult<Json<PredictionState>> {
    let domain = parse_domain(&domain)?;
    let ctx = RecommendationContext::from(&state);
    Ok(Json(RecommendationService::run(&ctx, auth.user_id, domain).await))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_domain() {
        assert_eq!(parse_domain("meal").unwrap(), RecommendationDomain::Meal);
        assert!(matches!(parse_domain("sleep"), Err(ApiError::BadRequest(_))));
    }
}
