//! HealthMate Shared Library
//!
//! Profile document model, derived metrics and recommendation input
//! reconciliation, shared by the backend and the WASM module.

pub mod checkins;
pub mod errors;
pub mod health_metrics;
pub mod models;
pub mod reconcile;
pub mod types;
pub mod validation;

// Re-export commonly used items
pub use errors::*;
pub use health_metrics::*;
pub use types::*;

pub use checkins::{due_updates, CheckIn, DueCheckIns};
pub use models::{RecommendationDomain, UserProfile};
pub use reconcile::{prediction_input_for, reconcile, PredictionInput, ReconcilerConfig};
