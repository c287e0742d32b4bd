//! HealthMate WASM module
//!
//! Browser bindings for the calculations the profile screens show before
//! anything is sent: BMI and the reconciled recommendation input.

use healthmate_shared::health_metrics::{self, BmiStatus};
use healthmate_shared::models::{RecommendationDomain, UserProfile};
use healthmate_shared::reconcile::{prediction_input_for, ReconcilerConfig};
use healthmate_shared::types::RecommendationInputResponse;
use wasm_bindgen::prelude::*;

/// BMI from weight (kg) and height (cm); 22.5 when either is missing or zero
#[wasm_bindgen]
pub fn calculate_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> f64 {
    health_metrics::calculate_bmi(weight_kg, height_cm)
}

/// Category label for a BMI value
#[wasm_bindgen]
pub fn bmi_status(bmi: f64) -> String {
    health_metrics::classify_bmi(bmi).as_str().to_string()
}

/// Liters for a cup count at the default cup size
#[wasm_bindgen]
pub fn cups_to_liters(cups: u32) -> f64 {
    health_metrics::cups_to_liters(cups, health_metrics::CUP_SIZE_ML)
}

/// Reconcile a profile document (JSON) for `domain`
///
/// Returns a JSON `RecommendationInputResponse`: the request payload when
/// every required field is present, otherwise the missing fields.
#[wasm_bindgen]
pub fn reconcile_input(profile_json: &str, domain: &str) -> Result<String, JsValue> {
    preview(profile_json, domain).map_err(|e| JsValue::from_str(&e))
}

fn preview(profile_json: &str, domain: &str) -> Result<String, String> {
    let domain: RecommendationDomain = domain.parse()?;
    let profile: Option<UserProfile> =
        serde_json::from_str(profile_json).map_err(|e| format!("Invalid profile: {}", e))?;

    let result = prediction_input_for(profile.as_ref(), domain, &ReconcilerConfig::default());
    serde_json::to_string(&RecommendationInputResponse::from_result(domain, result))
        .map_err(|e| e.to_string())
}
