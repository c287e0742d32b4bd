//! Hydration tracking
//!
//! Cups are stored per day in `hydration_data`, keyed by date. Saving
//! overwrites the whole day entry.

use crate::error::ApiError;
use crate::repositories::{ProfileStore, ProfileUpdate, StoreError};
use chrono::{NaiveDate, Utc};
use healthmate_shared::health_metrics::{cups_to_liters, DEFAULT_DAILY_CUP_GOAL};
use healthmate_shared::models::HydrationDay;
use healthmate_shared::types::{HydrationTodayResponse, UpdateHydrationRequest};
use tracing::{debug, info};
use uuid::Uuid;

/// Largest cup count accepted for a day
const MAX_DAILY_CUPS: u32 = 50;

/// Read-modify-write rounds before a version conflict is returned
const MAX_WRITE_ATTEMPTS: u32 = 3;

pub struct HydrationService;

impl HydrationService {
    pub async fn today(
        store: &dyn ProfileStore,
        user_id: Uuid,
        cup_size_ml: f64,
    ) -> Result<HydrationTodayResponse, ApiError> {
        let profile = store
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?
            .profile()?;

        let today = Utc::now().date_naive();
        let day = profile.hydration_data.get(&today);
        Ok(summary(
            today,
            day.and_then(|d| d.cups).unwrap_or(0),
            day.map(|d| d.goal).unwrap_or(DEFAULT_DAILY_CUP_GOAL),
            cup_size_ml,
        ))
    }

    /// Overwrite today's entry; the goal carries over from today's entry when omitted.
    /// The carried-over goal is re-read when another write lands in between.
    pub async fn set_today(
        store: &dyn ProfileStore,
        user_id: Uuid,
        req: UpdateHydrationRequest,
        cup_size_ml: f64,
    ) -> Result<HydrationTodayResponse, ApiError> {
        if req.cups > MAX_DAILY_CUPS {
            return Err(ApiError::Validation(format!(
                "Cups must be at most {}",
                MAX_DAILY_CUPS
            )));
        }
        if req.goal == Some(0) {
            return Err(ApiError::Validation("Goal must be at least 1 cup".to_string()));
        }

        let mut attempt = 0;
        let (today, goal) = loop {
            attempt += 1;
            let current = store
                .get(user_id)
                .await?
                .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?;
            let profile = current.profile()?;

            let now = Utc::now();
            let today = now.date_naive();
            let goal = req
                .goal
                .or_else(|| profile.hydration_data.get(&today).map(|d| d.goal))
                .unwrap_or(DEFAULT_DAILY_CUP_GOAL);

            let day = HydrationDay {
                cups: Some(req.cups),
                goal,
                timestamp: now,
            };
            let update = ProfileUpdate::new().set(format!("hydration_data.{}", today), &day)?;
            match store.update(user_id, &update, Some(current.version)).await {
                Ok(_) => break (today, goal),
                Err(StoreError::Conflict { expected, actual }) if attempt < MAX_WRITE_ATTEMPTS => {
                    debug!(user_id = %user_id, expected, actual, attempt, "Profile changed while saving hydration, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        };

        info!(user_id = %user_id, cups = req.cups, goal, "Hydration updated");
        Ok(summary(today, req.cups, goal, cup_size_ml))
    }
}

fn summary(date: NaiveDate, cups: u32, goal: u32, cup_size_ml: f64) -> HydrationTodayResponse {
    HydrationTodayResponse {
        date,
        cups,
        goal,
        liters: cups_to_liters(cups, cup_size_ml),
        goal_reached: cups >= goal,
    }
}
