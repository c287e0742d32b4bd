//! Run and workout tracking
//!
//! The latest run's calories feed workout recommendations.

use crate::error::ApiError;
use crate::repositories::{ProfileStore, ProfileUpdate};
use chrono::Utc;
use healthmate_shared::models::RunEntry;
use healthmate_shared::types::LogRunRequest;
use healthmate_shared::validation::validate_run;
use tracing::info;
use uuid::Uuid;

const DEFAULT_WORKOUT_NAME: &str = "Unnamed Workout";

pub struct ExerciseService;

impl ExerciseService {
    pub async fn log_run(
        store: &dyn ProfileStore,
        user_id: Uuid,
        req: LogRunRequest,
    ) -> Result<RunEntry, ApiError> {
        validate_run(req.duration_minutes, req.calories_burned).map_err(ApiError::Validation)?;

        let workout_name = req
            .workout_name
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_WORKOUT_NAME.to_string());

        let now = Utc::now();
        let entry = RunEntry {
            duration_minutes: Some(req.duration_minutes),
            calories_burned: Some(req.calories_burned),
            workout_name: Some(workout_name),
            date: now.date_naive(),
            timestamp: now,
        };

        let update = ProfileUpdate::new()
            .append("run_history", &entry)?
            .server_timestamp("last_run_record_update");
        store.update(user_id, &update, None).await?;

        info!(
            user_id = %user_id,
            calories = req.calories_burned,
            duration_minutes = req.duration_minutes,
            "Run logged"
        );
        Ok(entry)
    }
}
