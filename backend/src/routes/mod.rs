//! Route definitions for the HealthMate API
//!
//! All API routes live under `/api/v1`; health checks and `/metrics` sit at the root.

use crate::state::AppState;
use axum::{
    http::{header, Method},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    compression::CompressionLayer,
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

mod auth;
mod exercise;
mod health;
mod hydration;
mod nutrition;
mod profile;
mod recommendations;
mod screen_time;
mod weight;


pub use auth::auth_routes;
pub use profile::profile_routes;
pub use recommendations::recommendation_routes;

/// Create the main application router with all middleware
///
/// Every route gets the configured request deadline except
/// `POST /api/v1/recommendations/:domain`, whose outcome (including a slow
/// or hung prediction service) is always reported as a `PredictionState`.
pub fn create_router(state: AppState) -> Router {
    let timeout = state.config().server.request_timeout();

    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
        .route("/health/live", get(health::liveness_check))
        .route("/metrics", get(health::metrics))
        .layer(TimeoutLayer::new(timeout))
        .nest("/api/v1", api_routes(timeout))
        .layer(CompressionLayer::new())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods([Method::GET, Method::POST, Method::PUT])
                .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]),
        )
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Layers only wrap routes added before them, so the recommendation routes
/// are nested last and set their own deadlines.
fn api_routes(timeout: Duration) -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { "HealthMate API v1" }))
        .nest("/auth", auth::auth_routes())
        .nest("/profile", profile::profile_routes())
        .nest("/weight", weight::weight_routes())
        .nest("/runs", exercise::run_routes())
        .nest("/screen-time", screen_time::screen_time_routes())
        .nest("/meals", nutrition::meal_routes())
        .nest("/hydration", hydration::hydration_routes())
        .layer(TimeoutLayer::new(timeout))
        .nest("/recommendations", recommendations::recommendation_routes(timeout))
}
