//! Recommendation input reconciliation
//!
//! Turns a sparse [`UserProfile`] into a validated request for one of the
//! recommendation domains. Reconciliation happens in two steps:
//!
//! 1. [`reconcile`] pulls the latest entry out of each history, derives BMI
//!    and applies the profile defaults. Every domain-specific value stays
//!    optional at this point.
//! 2. [`ReconciledInputs::prediction_input`] checks the domain's required
//!    fields and either produces a fully typed [`PredictionInput`] or a
//!    [`PredictionError::MissingInput`] listing what is absent.
//!
//! A missing-input result means no request is sent to the prediction service.

use crate::errors::PredictionError;
use crate::health_metrics::{
    calculate_bmi_or, classify_bmi, cups_to_liters, BmiStatus, CUP_SIZE_ML, FALLBACK_BMI,
};
use crate::models::{latest, RecommendationDomain, StressLevel, UserProfile};
use serde::Serialize;

/// Fields every domain requires
pub const BASE_REQUIRED_FIELDS: &[&str] = &["age", "gender", "activity_level", "bmi_status", "bmi"];

/// Domain-specific required fields, checked after [`BASE_REQUIRED_FIELDS`]
///
/// `stress_level` is absent from the lifestyle list because it always has a default.
pub fn domain_required_fields(domain: RecommendationDomain) -> &'static [&'static str] {
    match domain {
        RecommendationDomain::Workout => &["calories_burned", "health_condition"],
        RecommendationDomain::Lifestyle => &["sleep_hours", "water_intake_liters", "screen_time_hours"],
        RecommendationDomain::Meal => &["goal", "meal_type"],
    }
}

/// Defaults and constants applied while reconciling
#[derive(Debug, Clone, PartialEq)]
pub struct ReconcilerConfig {
    /// BMI used when weight or height is missing
    pub fallback_bmi: f64,
    /// Volume of one tracked hydration cup
    pub cup_size_ml: f64,
    /// Sent as `recommended_sleep` with lifestyle requests
    pub recommended_sleep_hours: f64,
    pub default_activity_level: String,
    pub default_stress_level: String,
    pub default_health_condition: String,
}

impl Default for ReconcilerConfig {
    fn default() -> Self {
        Self {
            fallback_bmi: FALLBACK_BMI,
            cup_size_ml: CUP_SIZE_ML,
            recommended_sleep_hours: 8.0,
            default_activity_level: "Medium".to_string(),
            default_stress_level: "Moderate".to_string(),
            default_health_condition: "None".to_string(),
        }
    }
}

// ============================================================================
// Reconciled (unvalidated) inputs
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutFields {
    pub calories_burned: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifestyleFields {
    pub sleep_hours: Option<f64>,
    pub recommended_sleep: f64,
    pub water_intake_liters: Option<f64>,
    pub stress_level: StressLevel,
    pub screen_time_hours: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealFields {
    pub goal: Option<String>,
    pub meal_type: Option<String>,
}

/// Everything the three domains draw from, before validation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReconciledInputs {
    pub age: Option<u32>,
    pub gender: Option<String>,
    pub activity_level: String,
    pub health_condition: String,
    pub bmi_status: BmiStatus,
    pub bmi: f64,
    pub workout: WorkoutFields,
    pub lifestyle: LifestyleFields,
    pub meal: MealFields,
}

fn non_empty_or(value: Option<&String>, default: &str) -> String {
    value
        .filter(|v| !v.is_empty())
        .cloned()
        .unwrap_or_else(|| default.to_string())
}

/// Collect the latest values from a profile
pub fn reconcile(profile: &UserProfile, config: &ReconcilerConfig) -> ReconciledInputs {
    let bmi = calculate_bmi_or(profile.effective_weight(), profile.height, config.fallback_bmi);

    let latest_run = latest(&profile.run_history);
    let latest_screen_time = latest(&profile.screen_time_history);
    let latest_food = latest(&profile.food_history);

    // A zero-cup day reads the same as no day at all.
    let water_intake_liters = profile
        .latest_hydration()
        .and_then(|(_, day)| day.cups)
        .filter(|cups| *cups != 0)
        .map(|cups| cups_to_liters(cups, config.cup_size_ml));

    let stress_level = profile
        .stress_level
        .clone()
        .filter(StressLevel::is_set)
        .unwrap_or_else(|| StressLevel::Label(config.default_stress_level.clone()));

    ReconciledInputs {
        age: profile.age,
        gender: profile.gender.clone(),
        activity_level: non_empty_or(profile.activity_level.as_ref(), &config.default_activity_level),
        health_condition: non_empty_or(
            profile.health_conditions.as_ref(),
            &config.default_health_condition,
        ),
        bmi_status: classify_bmi(bmi),
        bmi,
        workout: WorkoutFields {
            calories_burned: latest_run.and_then(|run| run.calories_burned),
        },
        lifestyle: LifestyleFields {
            sleep_hours: profile.sleep_hours,
            recommended_sleep: config.recommended_sleep_hours,
            water_intake_liters,
            stress_level,
            screen_time_hours: latest_screen_time.and_then(|entry| entry.screen_time_hours),
        },
        meal: MealFields {
            goal: latest_food.and_then(|food| food.goal.clone()),
            meal_type: latest_food.and_then(|food| food.meal_type.clone()),
        },
    }
}

// ============================================================================
// Validated request payloads
// ============================================================================

/// Fields sent with every domain
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BaseInput {
    pub age: u32,
    pub gender: String,
    pub activity_level: String,
    pub health_condition: String,
    pub bmi_status: BmiStatus,
    pub bmi: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkoutInput {
    pub calories_burned: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LifestyleInput {
    pub sleep_hours: f64,
    pub recommended_sleep: f64,
    pub water_intake_liters: f64,
    pub stress_level: StressLevel,
    pub screen_time_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MealInput {
    pub goal: String,
    pub meal_type: String,
}

/// Domain-specific half of a request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DomainInput {
    Workout(WorkoutInput),
    Lifestyle(LifestyleInput),
    Meal(MealInput),
}

impl DomainInput {
    pub fn domain(&self) -> RecommendationDomain {
        match self {
            DomainInput::Workout(_) => RecommendationDomain::Workout,
            DomainInput::Lifestyle(_) => RecommendationDomain::Lifestyle,
            DomainInput::Meal(_) => RecommendationDomain::Meal,
        }
    }
}

/// Validated request body, serialized as one flat JSON object
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PredictionInput {
    #[serde(flatten)]
    pub base: BaseInput,
    #[serde(flatten)]
    pub domain: DomainInput,
}

impl PredictionInput {
    pub fn domain(&self) -> RecommendationDomain {
        self.domain.domain()
    }
}

/// Values that can be present but still unusable
trait Presence {
    fn is_present(&self) -> bool;
}

impl Presence for String {
    fn is_present(&self) -> bool {
        !self.is_empty()
    }
}

impl Presence for f64 {
    fn is_present(&self) -> bool {
        !self.is_nan()
    }
}

impl Presence for u32 {
    fn is_present(&self) -> bool {
        true
    }
}

impl Presence for BmiStatus {
    fn is_present(&self) -> bool {
        true
    }
}

#[derive(Default)]
struct RequiredFields {
    missing: Vec<String>,
}

impl RequiredFields {
    fn require<T: Presence>(&mut self, name: &str, value: Option<T>) -> Option<T> {
        match value {
            Some(v) if v.is_present() => Some(v),
            _ => {
                self.missing.push(name.to_string());
                None
            }
        }
    }

    fn into_error(self) -> PredictionError {
        PredictionError::MissingInput {
            reason: format!(
                "Missing fields: {}. Please update your profile or activity data.",
                self.missing.join(", ")
            ),
            missing_fields: self.missing,
        }
    }
}

impl ReconciledInputs {
    /// Validate against the domain's required fields and build the request
    pub fn prediction_input(
        &self,
        domain: RecommendationDomain,
    ) -> Result<PredictionInput, PredictionError> {
        let mut fields = RequiredFields::default();

        let age = fields.require("age", self.age);
        let gender = fields.require("gender", self.gender.clone());
        let activity_level = fields.require("activity_level", Some(self.activity_level.clone()));
        let bmi_status = fields.require("bmi_status", Some(self.bmi_status));
        let bmi = fields.require("bmi", Some(self.bmi));

        let domain_input = match domain {
            RecommendationDomain::Workout => {
                let calories_burned = fields.require("calories_burned", self.workout.calories_burned);
                let health_condition =
                    fields.require("health_condition", Some(self.health_condition.clone()));
                match (calories_burned, health_condition) {
                    (Some(calories_burned), Some(_)) => {
                        Some(DomainInput::Workout(WorkoutInput { calories_burned }))
                    }
                    _ => None,
                }
            }
            RecommendationDomain::Lifestyle => {
                let lifestyle = &self.lifestyle;
                let sleep_hours = fields.require("sleep_hours", lifestyle.sleep_hours);
                let water = fields.require("water_intake_liters", lifestyle.water_intake_liters);
                let screen_time = fields.require("screen_time_hours", lifestyle.screen_time_hours);
                match (sleep_hours, water, screen_time) {
                    (Some(sleep_hours), Some(water_intake_liters), Some(screen_time_hours)) => {
                        Some(DomainInput::Lifestyle(LifestyleInput {
                            sleep_hours,
                            recommended_sleep: lifestyle.recommended_sleep,
                            water_intake_liters,
                            stress_level: lifestyle.stress_level.clone(),
                            screen_time_hours,
                        }))
                    }
                    _ => None,
                }
            }
            RecommendationDomain::Meal => {
                let goal = fields.require("goal", self.meal.goal.clone());
                let meal_type = fields.require("meal_type", self.meal.meal_type.clone());
                match (goal, meal_type) {
                    (Some(goal), Some(meal_type)) => Some(DomainInput::Meal(MealInput { goal, meal_type })),
                    _ => None,
                }
            }
        };

        if !fields.missing.is_empty() {
            return Err(fields.into_error());
        }

        match (age, gender, activity_level, bmi_status, bmi, domain_input) {
            (Some(age), Some(gender), Some(activity_level), Some(bmi_status), Some(bmi), Some(domain)) => {
                Ok(PredictionInput {
                    base: BaseInput {
                        age,
                        gender,
                        activity_level,
                        health_condition: self.health_condition.clone(),
                        bmi_status,
                        bmi,
                    },
                    domain,
                })
            }
            _ => Err(fields.into_error()),
        }
    }
}

/// Reason reported when there is no profile to reconcile
pub const MISSING_PROFILE_REASON: &str = "Profile data is missing.";

/// Reconcile and validate in one step; `None` means the profile document is absent
pub fn prediction_input_for(
    profile: Option<&UserProfile>,
    domain: RecommendationDomain,
    config: &ReconcilerConfig,
) -> Result<PredictionInput, PredictionError> {
    match profile {
        Some(profile) => reconcile(profile, config).prediction_input(domain),
        None => Err(PredictionError::MissingInput {
            missing_fields: Vec::new(),
            reason: MISSING_PROFILE_REASON.to_string(),
        }),
    }
}
