//! Profile service - reading the profile document and the weekly lifestyle check-in

use crate::error::ApiError;
use crate::repositories::{ProfileStore, ProfileUpdate};
use chrono::Utc;
use healthmate_shared::checkins::{due_updates, DueCheckIns};
use healthmate_shared::health_metrics::bmi_report;
use healthmate_shared::models::{LifestyleUpdate, StressLevel, UserProfile};
use healthmate_shared::types::{ProfileMetricsResponse, UpdateLifestyleRequest};
use healthmate_shared::validation::{
    validate_choice, validate_sleep_hours, validate_stress_score, VALID_ACTIVITY_LEVELS,
    VALID_ALCOHOL_USE, VALID_SMOKING_STATUSES,
};
use tracing::info;
use uuid::Uuid;

pub struct ProfileService;

impl ProfileService {
    pub async fn get_profile(store: &dyn ProfileStore, user_id: Uuid) -> Result<UserProfile, ApiError> {
        let profile = store
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?
            .profile()?;
        Ok(profile)
    }

    /// BMI from the tracked weight (sign-up weight as fallback) and height
    pub async fn get_metrics(
        store: &dyn ProfileStore,
        user_id: Uuid,
    ) -> Result<ProfileMetricsResponse, ApiError> {
        let profile = Self::get_profile(store, user_id).await?;
        let weight = profile.effective_weight();

        Ok(ProfileMetricsResponse {
            weight,
            height: profile.height,
            bmi: bmi_report(weight, profile.height),
        })
    }

    /// Weight and lifestyle check-ins that are due now
    pub async fn get_reminders(store: &dyn ProfileStore, user_id: Uuid) -> Result<DueCheckIns, ApiError> {
        let profile = Self::get_profile(store, user_id).await?;
        Ok(due_updates(&profile, Utc::now()))
    }

    fn validate_lifestyle(req: &UpdateLifestyleRequest) -> Result<(), ApiError> {
        validate_sleep_hours(req.sleep_hours).map_err(ApiError::Validation)?;
        validate_stress_score(req.stress_level).map_err(ApiError::Validation)?;
        validate_choice("activity_level", &req.activity_level, VALID_ACTIVITY_LEVELS)
            .map_err(ApiError::Validation)?;
        validate_choice("smoking_status", &req.smoking_status, VALID_SMOKING_STATUSES)
            .map_err(ApiError::Validation)?;
        validate_choice("alcohol_use", &req.alcohol_use, VALID_ALCOHOL_USE)
            .map_err(ApiError::Validation)?;
        Ok(())
    }

    /// Overwrite the lifestyle fields and keep the check-in in `lifestyle_updates`
    pub async fn update_lifestyle(
        store: &dyn ProfileStore,
        user_id: Uuid,
        req: UpdateLifestyleRequest,
    ) -> Result<LifestyleUpdate, ApiError> {
        Self::validate_lifestyle(&req)?;

        let now = Utc::now();
        let entry = LifestyleUpdate {
            activity_level: req.activity_level,
            sleep_hours: req.sleep_hours,
            stress_level: StressLevel::Score(req.stress_level),
            smoking_status: req.smoking_status,
            alcohol_use: req.alcohol_use,
            date: now.date_naive(),
            timestamp: now,
        };

        let update = ProfileUpdate::new()
            .set("activity_level", &entry.activity_level)?
            .set("sleep_hours", entry.sleep_hours)?
            .set("stress_level", &entry.stress_level)?
            .set("smoking_status", &entry.smoking_status)?
            .set("alcohol_use", &entry.alcohol_use)?
            .append("lifestyle_updates", &entry)?
            .server_timestamp("last_lifestyle_update");
        store.update(user_id, &update, None).await?;

        info!(user_id = %user_id, "Lifestyle updated");
        Ok(entry)
    }
}
