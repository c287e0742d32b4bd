//! Screen time tracking

use crate::error::ApiError;
use crate::repositories::{ProfileStore, ProfileUpdate};
use chrono::Utc;
use healthmate_shared::models::ScreenTimeEntry;
use healthmate_shared::validation::validate_screen_time_hours;
use tracing::info;
use uuid::Uuid;

pub struct ScreenTimeService;

impl ScreenTimeService {
    /// Record a daily reading; zero hours is a valid reading
    pub async fn log_screen_time(
        store: &dyn ProfileStore,
        user_id: Uuid,
        hours: f64,
    ) -> Result<ScreenTimeEntry, ApiError> {
        validate_screen_time_hours(hours).map_err(ApiError::Validation)?;

        let now = Utc::now();
        let entry = ScreenTimeEntry {
            screen_time_hours: Some(hours),
            date: now.date_naive(),
            timestamp: now,
        };

        let update = ProfileUpdate::new()
            .append("screen_time_history", &entry)?
            .server_timestamp("last_screen_time_update");
        store.update(user_id, &update, None).await?;

        info!(user_id = %user_id, hours, "Screen time logged");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryProfileStore;
    use serde_json::json;

    #[tokio::test]
    async fn test_zero_hours_recorded() {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        store.create(user_id, json!({})).await.unwrap();

        ScreenTimeService::log_screen_time(&store, user_id, 0.0).await.unwrap();

        let profile = store.get(user_id).await.unwrap().unwrap().profile().unwrap();
        assert_eq!(profile.screen_time_history[0].screen_time_hours, Some(0.0));
        assert!(profile.last_screen_time_update.is_some());
    }

    #[tokio::test]
    async fn test_negative_hours_rejected() {
        let store = InMemoryProfileStore::new();
        let result = ScreenTimeService::log_screen_time(&store, Uuid::new_v4(), -1.0).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
