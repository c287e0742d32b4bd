//! API request and response types

use crate::errors::PredictionError;
use crate::health_metrics::BmiReport;
use crate::models::{
    AiRecommendations, PredictionResult, RecommendationDomain, RecommendationHistory,
};
use crate::reconcile::PredictionInput;
use crate::validation::get_missing_fields_labels;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// API error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
}

// ============================================================================
// Authentication Types
// ============================================================================

/// Authentication tokens response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthTokens {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Login request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Sign-up request: account credentials plus the initial health profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub username: String,
    pub age: u32,
    pub gender: String,
    /// Centimeters
    pub height: f64,
    /// Kilograms
    pub weight: f64,
    pub activity_level: String,
    pub sleep_hours: f64,
    /// 1-10 self-reported score
    pub stress_level: u8,
    pub smoking_status: String,
    pub alcohol_use: String,
    #[serde(default = "default_health_condition")]
    pub health_conditions: String,
}

fn default_health_condition() -> String {
    "None".to_string()
}

/// Account details for the signed-in user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountResponse {
    pub id: String,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Tracker Types
// ============================================================================

/// Daily weight entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogWeightRequest {
    /// Kilograms
    pub weight: f64,
}

/// Completed run or workout
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRunRequest {
    #[serde(default)]
    pub workout_name: Option<String>,
    pub duration_minutes: f64,
    pub calories_burned: u32,
}

/// Daily screen time reading
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogScreenTimeRequest {
    pub screen_time_hours: f64,
}

/// Meal entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogMealRequest {
    pub meal_name: String,
    pub calories: u32,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
}

/// Overwrite today's cup count
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateHydrationRequest {
    pub cups: u32,
    #[serde(default)]
    pub goal: Option<u32>,
}

/// Today's hydration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HydrationTodayResponse {
    pub date: NaiveDate,
    pub cups: u32,
    pub goal: u32,
    pub liters: f64,
    pub goal_reached: bool,
}

/// Weekly lifestyle check-in
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateLifestyleRequest {
    pub activity_level: String,
    pub sleep_hours: f64,
    pub stress_level: u8,
    pub smoking_status: String,
    pub alcohol_use: String,
}

/// BMI derived from the stored profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileMetricsResponse {
    pub weight: Option<f64>,
    pub height: Option<f64>,
    pub bmi: BmiReport,
}

// ============================================================================
// Recommendation Types
// ============================================================================

/// Outcome of one recommendation request, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PredictionState {
    Success {
        domain: RecommendationDomain,
        recommendation: PredictionResult,
    },
    MissingInput {
        domain: RecommendationDomain,
        missing_fields: Vec<String>,
        reason: String,
    },
    ApiError {
        domain: RecommendationDomain,
        message: String,
    },
    ServiceError {
        domain: RecommendationDomain,
        message: String,
    },
}

impl PredictionState {
    pub fn from_error(domain: RecommendationDomain, err: PredictionError) -> Self {
        match err {
            PredictionError::MissingInput {
                missing_fields,
                reason,
            } => PredictionState::MissingInput {
                domain,
                missing_fields,
                reason,
            },
            PredictionError::Api(message) => PredictionState::ApiError { domain, message },
            PredictionError::Service(_) => PredictionState::ServiceError {
                domain,
                message: "Failed to communicate with prediction service.".to_string(),
            },
        }
    }

    /// Same tag as the serialized `status`
    pub fn outcome(&self) -> &'static str {
        match self {
            PredictionState::Success { .. } => "success",
            PredictionState::MissingInput { .. } => "missing_input",
            PredictionState::ApiError { .. } => "api_error",
            PredictionState::ServiceError { .. } => "service_error",
        }
    }

    pub fn domain(&self) -> RecommendationDomain {
        match self {
            PredictionState::Success { domain, .. }
            | PredictionState::MissingInput { domain, .. }
            | PredictionState::ApiError { domain, .. }
            | PredictionState::ServiceError { domain, .. } => *domain,
        }
    }
}

/// Reconciled request body, or why it cannot be built yet
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationInputResponse {
    pub domain: RecommendationDomain,
    pub ready: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_fields: Vec<String>,
    /// Display labels for `missing_fields`
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_labels: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RecommendationInputResponse {
    pub fn from_result(
        domain: RecommendationDomain,
        result: Result<PredictionInput, PredictionError>,
    ) -> Self {
        match result {
            Ok(input) => Self {
                domain,
                ready: true,
                payload: serde_json::to_value(&input).ok(),
                missing_fields: Vec::new(),
                missing_labels: Vec::new(),
                reason: None,
            },
            Err(err) => {
                let missing_fields = match &err {
                    PredictionError::MissingInput { missing_fields, .. } => missing_fields.clone(),
                    _ => Vec::new(),
                };
                Self {
                    domain,
                    ready: false,
                    payload: None,
                    missing_labels: get_missing_fields_labels(&missing_fields),
                    missing_fields,
                    reason: Some(err.to_string()),
                }
            }
        }
    }
}

/// Stored recommendations for all domains
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecommendationsResponse {
    pub latest: AiRecommendations,
    pub history: RecommendationHistory,
    pub last_updated: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_prediction_state_tags() {
        let state = PredictionState::from_error(
            RecommendationDomain::Lifestyle,
            PredictionError::MissingInput {
                missing_fields: vec!["sleep_hours".to_string()],
                reason: "Missing fields: sleep_hours.".to_string(),
            },
        );
        assert_eq!(state.outcome(), "missing_input");
        assert_eq!(
            serde_json::to_value(&state).unwrap(),
            json!({
                "status": "missing_input",
                "domain": "lifestyle",
                "missing_fields": ["sleep_hours"],
                "reason": "Missing fields: sleep_hours."
            })
        );
    }

    #[test]
    fn test_service_error_hides_transport_detail() {
        let state = PredictionState::from_error(
            RecommendationDomain::Meal,
            PredictionError::Service("connection refused".to_string()),
        );
        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(value["status"], "service_error");
        assert_eq!(value["message"], "Failed to communicate with prediction service.");
    }

    #[test]
    fn test_register_request_defaults_health_condition() {
        let req: RegisterRequest = serde_json::from_value(json!({
            "email": "a@b.co",
            "password": "password123",
            "username": "ana",
            "age": 30,
            "gender": "Female",
            "height": 165.0,
            "weight": 60.0,
            "activity_level": "Medium",
            "sleep_hours": 7.5,
            "stress_level": 4,
            "smoking_status": "Never",
            "alcohol_use": "No"
        }))
        .unwrap();
        assert_eq!(req.health_conditions, "None");
    }
}
