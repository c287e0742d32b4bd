//! Recommendation model service client
//!
//! One JSON POST per recommendation to `{base_url}/api/{domain}`. The
//! service reports failures in the body (`{"status": "error", "error": ...}`),
//! sometimes with a 4xx/5xx status, so the body decides the outcome:
//!
//! - unreachable, timed out, or a body that is not JSON: [`PredictionError::Service`]
//! - JSON with a `status` other than `"success"`: [`PredictionError::Api`]
//! - otherwise the raw result map

use healthmate_shared::errors::PredictionError;
use healthmate_shared::models::{PredictionResult, RecommendationDomain};
use healthmate_shared::reconcile::PredictionInput;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;
use tracing::{debug, error, warn};

/// `GET /api/health` body
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictorHealth {
    pub status: String,
    #[serde(default)]
    pub workout_model: bool,
    #[serde(default)]
    pub lifestyle_model: bool,
    #[serde(default)]
    pub meal_model: bool,
}

impl PredictorHealth {
    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }
}

/// Deadline for the health check, independent of the prediction timeout
const HEALTH_CHECK_TIMEOUT: Duration = Duration::from_secs(3);

#[derive(Debug, Clone)]
pub struct PredictionClient {
    base_url: String,
    client: Client,
}

impl PredictionClient {
    /// Build a client; requests never time out when `timeout` is `None`
    pub fn new(base_url: impl Into<String>, timeout: Option<Duration>) -> anyhow::Result<Self> {
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: builder.build()?,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Request a recommendation for the domain `input` was built for
    pub async fn predict(&self, input: &PredictionInput) -> Result<PredictionResult, PredictionError> {
        let domain = input.domain();
        let url = format!("{}/api/{}", self.base_url, domain);

        let response = self.client.post(&url).json(input).send().await.map_err(|e| {
            error!(domain = %domain, error = %e, "Prediction request failed");
            PredictionError::Service(e.to_string())
        })?;

        let status = response.status();
        let body: Value = response.json().await.map_err(|e| {
            error!(domain = %domain, http_status = %status, error = %e, "Unreadable prediction response");
            PredictionError::Service(format!("Failed to parse prediction response: {}", e))
        })?;

        debug!(domain = %domain, http_status = %status, "Prediction response received");
        interpret_response(domain, body)
    }

    /// Call the service's health endpoint
    pub async fn health(&self) -> Result<PredictorHealth, PredictionError> {
        let url = format!("{}/api/health", self.base_url);

        let response = self
            .client
            .get(&url)
            .timeout(HEALTH_CHECK_TIMEOUT)
            .send()
            .await
            .map_err(|e| PredictionError::Service(e.to_string()))?;

        if !response.status().is_success() {
            warn!(http_status = %response.status(), "Prediction service health check failed");
            return Err(PredictionError::Api(format!(
                "Health check returned {}",
                response.status()
            )));
        }

        response
            .json::<PredictorHealth>()
            .await
            .map_err(|e| PredictionError::Service(e.to_string()))
    }
}

fn api_error_fallback(domain: RecommendationDomain) -> String {
    format!("Failed to get {} recommendation.", domain)
}

fn interpret_response(domain: RecommendationDomain, body: Value) -> Result<PredictionResult, PredictionError> {
    let succeeded = body.get("status").and_then(Value::as_str) == Some("success");

    if !succeeded {
        let message = body
            .get("error")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| api_error_fallback(domain));
        warn!(domain = %domain, error = %message, "Prediction service reported an error");
        return Err(PredictionError::Api(message));
    }

    serde_json::from_value(body).map_err(|e| {
        error!(domain = %domain, error = %e, "Prediction response has an unexpected shape");
        PredictionError::Service(e.to_string())
    })
}
