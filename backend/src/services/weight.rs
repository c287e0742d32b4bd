//! Daily weight tracking

use crate::error::ApiError;
use crate::repositories::{ProfileStore, ProfileUpdate};
use chrono::Utc;
use healthmate_shared::models::WeightEntry;
use healthmate_shared::validation::validate_weight;
use tracing::info;
use uuid::Uuid;

pub struct WeightService;

impl WeightService {
    /// Record today's weight and make it the current weight
    pub async fn log_weight(
        store: &dyn ProfileStore,
        user_id: Uuid,
        weight_kg: f64,
    ) -> Result<WeightEntry, ApiError> {
        validate_weight(weight_kg).map_err(ApiError::Validation)?;

        let now = Utc::now();
        let entry = WeightEntry {
            weight: weight_kg,
            date: now.date_naive(),
            timestamp: now,
        };

        let update = ProfileUpdate::new()
            .set("current_weight", weight_kg)?
            .append("weight_history", &entry)?
            .server_timestamp("last_weight_update");
        store.update(user_id, &update, None).await?;

        info!(user_id = %user_id, weight_kg, "Weight logged");
        Ok(entry)
    }
}
