//! Error types for the HealthMate application

use thiserror::Error;

/// Why a recommendation could not be produced
///
/// Each variant maps to one of the states a client shows for a domain tab.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PredictionError {
    /// Required inputs were absent after reconciliation. No request was sent.
    #[error("{reason}")]
    MissingInput {
        missing_fields: Vec<String>,
        reason: String,
    },

    /// The prediction service answered but reported a failure
    #[error("Prediction service error: {0}")]
    Api(String),

    /// The prediction service could not be reached or sent an unreadable reply
    #[error("Failed to communicate with prediction service: {0}")]
    Service(String),
}

impl PredictionError {
    /// Status tag used in serialized prediction states
    pub fn status(&self) -> &'static str {
        match self {
            PredictionError::MissingInput { .. } => "missing_input",
            PredictionError::Api(_) => "api_error",
            PredictionError::Service(_) => "service_error",
        }
    }

    /// Missing inputs stay missing until the tracked data changes
    pub fn is_retryable(&self) -> bool {
        !matches!(self, PredictionError::MissingInput { .. })
    }
}
