//! Health metrics calculations module
//!
//! Provides the derived metrics the recommendation inputs are built from:
//! BMI with a fixed fallback, the four-way BMI status, and hydration cup
//! conversions.
//!
//! # Design Principles
//!
//! 1. **Pure Functions**: All calculations are pure, no side effects
//! 2. **Never Absent**: BMI falls back to a constant instead of propagating a missing value
//! 3. **Type Safety**: Status is an enum, serialized with the labels the prediction service expects

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// BMI Calculations
// ============================================================================

/// BMI used when weight or height is missing
pub const FALLBACK_BMI: f64 = 22.5;

/// BMI status classification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BmiStatus {
    Underweight,
    Normal,
    Overweight,
    Obese,
}

impl BmiStatus {
    /// Get the BMI range for this status (lower bound inclusive)
    pub fn range(&self) -> (f64, f64) {
        match self {
            BmiStatus::Underweight => (f64::NEG_INFINITY, 18.5),
            BmiStatus::Normal => (18.5, 25.0),
            BmiStatus::Overweight => (25.0, 30.0),
            BmiStatus::Obese => (30.0, f64::INFINITY),
        }
    }

    /// Label sent to the prediction service
    pub fn as_str(&self) -> &'static str {
        match self {
            BmiStatus::Underweight => "Underweight",
            BmiStatus::Normal => "Normal",
            BmiStatus::Overweight => "Overweight",
            BmiStatus::Obese => "Obese",
        }
    }
}

impl fmt::Display for BmiStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// BMI value together with its status
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BmiReport {
    pub value: f64,
    pub status: BmiStatus,
}

/// A reading counts only when it is present, non-zero and a number.
fn truthy(value: Option<f64>) -> Option<f64> {
    value.filter(|v| *v != 0.0 && !v.is_nan())
}

/// Round to one decimal place
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Calculate BMI from weight and height
///
/// Formula: BMI = weight(kg) / height(m)², rounded to one decimal.
/// Returns [`FALLBACK_BMI`] when either input is missing, zero or NaN.
pub fn calculate_bmi(weight_kg: Option<f64>, height_cm: Option<f64>) -> f64 {
    calculate_bmi_or(weight_kg, height_cm, FALLBACK_BMI)
}

/// [`calculate_bmi`] with a caller-supplied fallback
pub fn calculate_bmi_or(weight_kg: Option<f64>, height_cm: Option<f64>, fallback: f64) -> f64 {
    match (truthy(weight_kg), truthy(height_cm)) {
        (Some(weight), Some(height)) => {
            let height_m = height / 100.0;
            round1(weight / (height_m * height_m))
        }
        _ => fallback,
    }
}

/// Classify BMI into status
///
/// Upper bounds are exclusive; zero and negative values land in `Underweight`.
pub fn classify_bmi(bmi: f64) -> BmiStatus {
    if bmi < 18.5 {
        BmiStatus::Underweight
    } else if bmi < 25.0 {
        BmiStatus::Normal
    } else if bmi < 30.0 {
        BmiStatus::Overweight
    } else {
        BmiStatus::Obese
    }
}

/// Calculate BMI and classify the rounded value
pub fn bmi_report(weight_kg: Option<f64>, height_cm: Option<f64>) -> BmiReport {
    let value = calculate_bmi(weight_kg, height_cm);
    BmiReport {
        value,
        status: classify_bmi(value),
    }
}

// ============================================================================
// Hydration Calculations
// ============================================================================

/// Volume of one tracked cup
pub const CUP_SIZE_ML: f64 = 200.0;

/// Daily cup goal used until the user picks another one
pub const DEFAULT_DAILY_CUP_GOAL: u32 = 8;

/// Convert a cup count to liters, rounded to one decimal
pub fn cups_to_liters(cups: u32, cup_size_ml: f64) -> f64 {
    round1(cups as f64 * cup_size_ml / 1000.0)
}
