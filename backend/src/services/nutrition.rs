//! Meal tracking
//!
//! The latest meal's type and goal feed meal recommendations.

use crate::error::ApiError;
use crate::repositories::{ProfileStore, ProfileUpdate};
use chrono::Utc;
use healthmate_shared::models::FoodEntry;
use healthmate_shared::types::LogMealRequest;
use healthmate_shared::validation::{
    validate_choice, validate_meal, VALID_MEAL_GOALS, VALID_MEAL_TYPES,
};
use tracing::info;
use uuid::Uuid;

const DEFAULT_MEAL_TYPE: &str = "Lunch";
const DEFAULT_MEAL_GOAL: &str = "Maintenance";

pub struct NutritionService;

impl NutritionService {
    pub async fn log_meal(
        store: &dyn ProfileStore,
        user_id: Uuid,
        req: LogMealRequest,
    ) -> Result<FoodEntry, ApiError> {
        validate_meal(&req.meal_name, req.calories).map_err(ApiError::Validation)?;

        let meal_type = req.meal_type.unwrap_or_else(|| DEFAULT_MEAL_TYPE.to_string());
        let goal = req.goal.unwrap_or_else(|| DEFAULT_MEAL_GOAL.to_string());
        validate_choice("meal_type", &meal_type, VALID_MEAL_TYPES).map_err(ApiError::Validation)?;
        validate_choice("goal", &goal, VALID_MEAL_GOALS).map_err(ApiError::Validation)?;

        let now = Utc::now();
        let entry = FoodEntry {
            meal_name: Some(req.meal_name.trim().to_string()),
            calories: Some(req.calories),
            meal_type: Some(meal_type),
            goal: Some(goal),
            date: now.date_naive(),
            timestamp: now,
        };

        let update = ProfileUpdate::new()
            .append("food_history", &entry)?
            .server_timestamp("last_food_record_update");
        store.update(user_id, &update, None).await?;

        info!(user_id = %user_id, calories = req.calories, "Meal logged");
        Ok(entry)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::InMemoryProfileStore;
    use serde_json::json;

    fn meal(name: &str, meal_type: Option<&str>, goal: Option<&str>) -> LogMealRequest {
        LogMealRequest {
            meal_name: name.to_string(),
            calories: 520,
            meal_type: meal_type.map(str::to_string),
            goal: goal.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_defaults_applied() {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        store.create(user_id, json!({})).await.unwrap();

        let entry = NutritionService::log_meal(&store, user_id, meal("Rice bowl", None, None))
            .await
            .unwrap();
        assert_eq!(entry.meal_type.as_deref(), Some("Lunch"));
        assert_eq!(entry.goal.as_deref(), Some("Maintenance"));

        let profile = store.get(user_id).await.unwrap().unwrap().profile().unwrap();
        assert_eq!(profile.food_history, vec![entry]);
        assert!(profile.last_food_record_update.is_some());
    }

    #[tokio::test]
    async fn test_unknown_meal_type_rejected() {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        store.create(user_id, json!({})).await.unwrap();

        let result =
            NutritionService::log_meal(&store, user_id, meal("Toast", Some("Brunch"), None)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }

    #[tokio::test]
    async fn test_empty_name_rejected() {
        let store = InMemoryProfileStore::new();
        let result = NutritionService::log_meal(&store, Uuid::new_v4(), meal("", None, None)).await;
        assert!(matches!(result, Err(ApiError::Validation(_))));
    }
}
