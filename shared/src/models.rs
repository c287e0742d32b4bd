//! Data models for the HealthMate profile document
//!
//! One [`UserProfile`] document exists per account. Tracker actions append to
//! its history arrays; the recommendation round-trip writes the
//! `ai_recommendations` and `recommendation_history` fields.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Maximum number of records kept per domain in the recommendation history
pub const RECOMMENDATION_HISTORY_LIMIT: usize = 5;

// ============================================================================
// Recommendation Domains
// ============================================================================

/// One of the three recommendation types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationDomain {
    Workout,
    Lifestyle,
    Meal,
}

impl RecommendationDomain {
    pub const ALL: [RecommendationDomain; 3] = [
        RecommendationDomain::Workout,
        RecommendationDomain::Lifestyle,
        RecommendationDomain::Meal,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RecommendationDomain::Workout => "workout",
            RecommendationDomain::Lifestyle => "lifestyle",
            RecommendationDomain::Meal => "meal",
        }
    }
}

impl fmt::Display for RecommendationDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RecommendationDomain {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "workout" => Ok(RecommendationDomain::Workout),
            "lifestyle" => Ok(RecommendationDomain::Lifestyle),
            "meal" => Ok(RecommendationDomain::Meal),
            other => Err(format!(
                "Invalid recommendation type '{}'. Must be one of: workout, lifestyle, meal",
                other
            )),
        }
    }
}

// ============================================================================
// History Records
// ============================================================================

/// Stress level as stored: a 1-10 score from the pickers, or a label
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StressLevel {
    Score(u8),
    Label(String),
}

impl StressLevel {
    /// A zero score or an empty label counts as unset
    pub fn is_set(&self) -> bool {
        match self {
            StressLevel::Score(score) => *score != 0,
            StressLevel::Label(label) => !label.is_empty(),
        }
    }
}

/// Entries in an append-only history carry the instant they were recorded
pub trait Timestamped {
    fn timestamp(&self) -> DateTime<Utc>;
}

/// Latest record in a history by timestamp
///
/// Insertion order is not trusted. Equal timestamps resolve to the entry
/// appended last.
pub fn latest<T: Timestamped>(entries: &[T]) -> Option<&T> {
    entries.iter().max_by_key(|entry| entry.timestamp())
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub weight: f64,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunEntry {
    #[serde(default)]
    pub duration_minutes: Option<f64>,
    #[serde(default)]
    pub calories_burned: Option<u32>,
    #[serde(default)]
    pub workout_name: Option<String>,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScreenTimeEntry {
    #[serde(default)]
    pub screen_time_hours: Option<f64>,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FoodEntry {
    #[serde(default)]
    pub meal_name: Option<String>,
    #[serde(default)]
    pub calories: Option<u32>,
    #[serde(default)]
    pub meal_type: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

/// One day of hydration tracking, keyed by date in [`UserProfile::hydration_data`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HydrationDay {
    #[serde(default)]
    pub cups: Option<u32>,
    pub goal: u32,
    pub timestamp: DateTime<Utc>,
}

/// Weekly lifestyle check-in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LifestyleUpdate {
    pub activity_level: String,
    pub sleep_hours: f64,
    pub stress_level: StressLevel,
    pub smoking_status: String,
    pub alcohol_use: String,
    pub date: NaiveDate,
    pub timestamp: DateTime<Utc>,
}

macro_rules! impl_timestamped {
    ($($ty:ty),*) => {
        $(impl Timestamped for $ty {
            fn timestamp(&self) -> DateTime<Utc> {
                self.timestamp
            }
        })*
    };
}

impl_timestamped!(WeightEntry, RunEntry, ScreenTimeEntry, FoodEntry, LifestyleUpdate);

// ============================================================================
// Recommendations
// ============================================================================

/// Successful reply from the prediction service, kept verbatim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PredictionResult {
    pub status: String,
    #[serde(flatten)]
    pub fields: Map<String, Value>,
}

impl PredictionResult {
    pub fn confidence(&self) -> Option<f64> {
        self.fields.get("confidence").and_then(Value::as_f64)
    }

    /// Top recommendation text, whichever domain produced it
    pub fn headline(&self) -> Option<&str> {
        ["recommended_workout", "recommendation", "recommended_meal"]
            .iter()
            .find_map(|key| self.fields.get(*key).and_then(Value::as_str))
    }
}

/// A stored recommendation: the reply, the input that produced it, and when
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecommendationRecord {
    #[serde(flatten)]
    pub result: PredictionResult,
    pub input_data: Value,
    pub timestamp: DateTime<Utc>,
}

/// Latest recommendation per domain
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AiRecommendations {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workout: Option<RecommendationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lifestyle: Option<RecommendationRecord>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meal: Option<RecommendationRecord>,
}

impl AiRecommendations {
    pub fn get(&self, domain: RecommendationDomain) -> Option<&RecommendationRecord> {
        match domain {
            RecommendationDomain::Workout => self.workout.as_ref(),
            RecommendationDomain::Lifestyle => self.lifestyle.as_ref(),
            RecommendationDomain::Meal => self.meal.as_ref(),
        }
    }

    pub fn set(&mut self, domain: RecommendationDomain, record: RecommendationRecord) {
        let slot = match domain {
            RecommendationDomain::Workout => &mut self.workout,
            RecommendationDomain::Lifestyle => &mut self.lifestyle,
            RecommendationDomain::Meal => &mut self.meal,
        };
        *slot = Some(record);
    }
}

/// Recent recommendations per domain, newest first
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RecommendationHistory {
    #[serde(default)]
    pub workout: Vec<RecommendationRecord>,
    #[serde(default)]
    pub lifestyle: Vec<RecommendationRecord>,
    #[serde(default)]
    pub meal: Vec<RecommendationRecord>,
}

impl RecommendationHistory {
    pub fn get(&self, domain: RecommendationDomain) -> &[RecommendationRecord] {
        match domain {
            RecommendationDomain::Workout => &self.workout,
            RecommendationDomain::Lifestyle => &self.lifestyle,
            RecommendationDomain::Meal => &self.meal,
        }
    }

    fn get_mut(&mut self, domain: RecommendationDomain) -> &mut Vec<RecommendationRecord> {
        match domain {
            RecommendationDomain::Workout => &mut self.workout,
            RecommendationDomain::Lifestyle => &mut self.lifestyle,
            RecommendationDomain::Meal => &mut self.meal,
        }
    }

    /// Prepend a record, evicting the oldest past [`RECOMMENDATION_HISTORY_LIMIT`]
    pub fn push_front(&mut self, domain: RecommendationDomain, record: RecommendationRecord) {
        let entries = self.get_mut(domain);
        entries.insert(0, record);
        entries.truncate(RECOMMENDATION_HISTORY_LIMIT);
    }
}

// ============================================================================
// Profile Document
// ============================================================================

/// Per-user profile document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserProfile {
    pub username: Option<String>,
    pub email: Option<String>,
    pub created_at: Option<DateTime<Utc>>,

    pub age: Option<u32>,
    pub gender: Option<String>,
    /// Height in centimeters
    pub height: Option<f64>,
    /// Weight in kilograms entered at sign-up
    pub weight: Option<f64>,
    /// Latest weight in kilograms from the daily weight tracker
    pub current_weight: Option<f64>,

    pub activity_level: Option<String>,
    pub sleep_hours: Option<f64>,
    pub stress_level: Option<StressLevel>,
    pub smoking_status: Option<String>,
    pub alcohol_use: Option<String>,
    pub health_conditions: Option<String>,

    pub weight_history: Vec<WeightEntry>,
    pub run_history: Vec<RunEntry>,
    pub screen_time_history: Vec<ScreenTimeEntry>,
    pub food_history: Vec<FoodEntry>,
    pub lifestyle_updates: Vec<LifestyleUpdate>,
    pub hydration_data: BTreeMap<NaiveDate, HydrationDay>,

    pub ai_recommendations: AiRecommendations,
    pub recommendation_history: RecommendationHistory,

    pub last_weight_update: Option<DateTime<Utc>>,
    pub last_run_record_update: Option<DateTime<Utc>>,
    pub last_screen_time_update: Option<DateTime<Utc>>,
    pub last_food_record_update: Option<DateTime<Utc>>,
    pub last_lifestyle_update: Option<DateTime<Utc>>,
    pub last_ai_recommendation_update: Option<DateTime<Utc>>,
}

impl UserProfile {
    /// Weight used for BMI: the tracked weight, else the sign-up weight
    pub fn effective_weight(&self) -> Option<f64> {
        self.current_weight
            .filter(|w| *w != 0.0 && !w.is_nan())
            .or(self.weight)
    }

    /// Hydration entry with the greatest date key
    pub fn latest_hydration(&self) -> Option<(&NaiveDate, &HydrationDay)> {
        self.hydration_data.iter().next_back()
    }

    /// Store a successful recommendation as latest and at the front of the history
    pub fn record_recommendation(
        &mut self,
        domain: RecommendationDomain,
        record: RecommendationRecord,
    ) {
        self.ai_recommendations.set(domain, record.clone());
        self.recommendation_history.push_front(domain, record);
    }
}
