//! Recommendation orchestration
//!
//! A request runs fetch profile -> reconcile -> validate -> predict ->
//! persist, strictly in that order. Every failure along the way is folded
//! into the returned [`PredictionState`]; callers never see an error.
//!
//! Persisting is a read-modify-write of the profile document guarded by the
//! document version. A concurrent writer causes a version conflict and the
//! whole read-modify-write is retried, up to the configured attempt count.
//! Persistence failures are logged and counted, never reported: the caller
//! still gets the recommendation it asked for.

use crate::error::ApiError;
use crate::external::PredictionClient;
use crate::repositories::{ProfileStore, ProfileUpdate, StoreError};
use crate::state::AppState;
use chrono::Utc;
use healthmate_shared::errors::PredictionError;
use healthmate_shared::models::{
    RecommendationDomain, RecommendationHistory, RecommendationRecord, UserProfile,
};
use healthmate_shared::reconcile::{prediction_input_for, PredictionInput, ReconcilerConfig};
use healthmate_shared::types::{
    PredictionState, RecommendationInputResponse, RecommendationsResponse,
};
use serde_json::Value;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Collaborators a recommendation run needs
pub struct RecommendationContext<'a> {
    pub store: &'a dyn ProfileStore,
    pub client: &'a PredictionClient,
    pub reconciler: &'a ReconcilerConfig,
    pub persist_max_attempts: u32,
}

impl<'a> From<&'a AppState> for RecommendationContext<'a> {
    fn from(state: &'a AppState) -> Self {
        Self {
            store: state.profiles(),
            client: &state.predictor,
            reconciler: &state.reconciler,
            persist_max_attempts: state.config.prediction.persist_max_attempts,
        }
    }
}

pub struct RecommendationService;

impl RecommendationService {
    /// Produce (and on success store) a recommendation for one domain
    pub async fn run(
        ctx: &RecommendationContext<'_>,
        user_id: Uuid,
        domain: RecommendationDomain,
    ) -> PredictionState {
        let state = Self::run_inner(ctx, user_id, domain).await;
        metrics::counter!(
            "healthmate_predictions_total",
            "domain" => domain.as_str(),
            "outcome" => state.outcome()
        )
        .increment(1);
        state
    }

    async fn run_inner(
        ctx: &RecommendationContext<'_>,
        user_id: Uuid,
        domain: RecommendationDomain,
    ) -> PredictionState {
        let input = match Self::build_input(ctx, user_id, domain).await {
            Ok(input) => input,
            Err(err) => {
                info!(user_id = %user_id, domain = %domain, reason = %err, "Recommendation skipped, inputs missing");
                return PredictionState::from_error(domain, err);
            }
        };

        let result = match ctx.client.predict(&input).await {
            Ok(result) => result,
            Err(err) => {
                match &err {
                    PredictionError::Service(detail) => {
                        error!(user_id = %user_id, domain = %domain, error = %detail, "Prediction service unreachable")
                    }
                    other => warn!(user_id = %user_id, domain = %domain, error = %other, "Prediction rejected"),
                }
                return PredictionState::from_error(domain, err);
            }
        };

        let record = RecommendationRecord {
            result: result.clone(),
            input_data: serde_json::to_value(&input).unwrap_or(Value::Null),
            timestamp: Utc::now(),
        };

        if let Err(err) =
            persist_recommendation(ctx.store, user_id, domain, record, ctx.persist_max_attempts).await
        {
            warn!(user_id = %user_id, domain = %domain, error = %err, "Failed to save recommendation");
            metrics::counter!("healthmate_persist_failures_total", "domain" => domain.as_str())
                .increment(1);
        }

        PredictionState::Success {
            domain,
            recommendation: result,
        }
    }

    /// Show the request body a run would send, without sending it
    pub async fn input(
        ctx: &RecommendationContext<'_>,
        user_id: Uuid,
        domain: RecommendationDomain,
    ) -> RecommendationInputResponse {
        RecommendationInputResponse::from_result(domain, Self::build_input(ctx, user_id, domain).await)
    }

    /// Latest recommendation and recent history for every domain
    pub async fn stored(store: &dyn ProfileStore, user_id: Uuid) -> Result<RecommendationsResponse, ApiError> {
        let profile = store
            .get(user_id)
            .await?
            .ok_or_else(|| ApiError::NotFound("Profile not found".to_string()))?
            .profile()?;

        Ok(RecommendationsResponse {
            latest: profile.ai_recommendations,
            history: profile.recommendation_history,
            last_updated: profile.last_ai_recommendation_update,
        })
    }

    async fn build_input(
        ctx: &RecommendationContext<'_>,
        user_id: Uuid,
        domain: RecommendationDomain,
    ) -> Result<PredictionInput, PredictionError> {
        let profile = load_profile(ctx.store, user_id).await;
        let input = prediction_input_for(profile.as_ref(), domain, ctx.reconciler)?;
        debug!(user_id = %user_id, domain = %domain, "Recommendation input reconciled");
        Ok(input)
    }
}

/// A profile that cannot be read is treated as absent
async fn load_profile(store: &dyn ProfileStore, user_id: Uuid) -> Option<UserProfile> {
    match store.get(user_id).await {
        Ok(Some(doc)) => match doc.profile() {
            Ok(profile) => Some(profile),
            Err(err) => {
                error!(user_id = %user_id, error = %err, "Unreadable profile document");
                None
            }
        },
        Ok(None) => None,
        Err(err) => {
            error!(user_id = %user_id, error = %err, "Failed to fetch profile");
            None
        }
    }
}

/// Save `record` as the domain's latest and prepend it to the capped history
pub async fn persist_recommendation(
    store: &dyn ProfileStore,
    user_id: Uuid,
    domain: RecommendationDomain,
    record: RecommendationRecord,
    max_attempts: u32,
) -> Result<(), StoreError> {
    let max_attempts = max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        let current = store.get(user_id).await?.ok_or(StoreError::NotFound)?;

        let mut history: RecommendationHistory = match current.document.get("recommendation_history") {
            Some(value) if !value.is_null() => serde_json::from_value(value.clone())
                .map_err(|e| StoreError::Malformed(e.to_string()))?,
            _ => RecommendationHistory::default(),
        };
        history.push_front(domain, record.clone());

        let update = ProfileUpdate::new()
            .set(format!("ai_recommendations.{}", domain), &record)?
            .set(format!("recommendation_history.{}", domain), history.get(domain))?
            .server_timestamp("last_ai_recommendation_update");

        match store.update(user_id, &update, Some(current.version)).await {
            Ok(version) => {
                debug!(user_id = %user_id, domain = %domain, version, attempt, "Recommendation saved");
                return Ok(());
            }
            Err(StoreError::Conflict { expected, actual }) if attempt < max_attempts => {
                debug!(user_id = %user_id, domain = %domain, expected, actual, attempt, "Profile changed while saving, retrying");
            }
            Err(err) => return Err(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repositories::{InMemoryProfileStore, VersionedDocument};
    use async_trait::async_trait;
    use chrono::{Duration as ChronoDuration, TimeZone};
    use healthmate_shared::models::RunEntry;
    use serde_json::json;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::time::Duration;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn run_entry(calories: u32, offset_hours: i64) -> RunEntry {
        let ts = Utc.with_ymd_and_hms(2025, 5, 10, 7, 0, 0).unwrap() + ChronoDuration::hours(offset_hours);
        RunEntry {
            duration_minutes: Some(30.0),
            calories_burned: Some(calories),
            workout_name: Some("Morning Run".to_string()),
            date: ts.date_naive(),
            timestamp: ts,
        }
    }

    fn workout_ready_profile() -> UserProfile {
        UserProfile {
            age: Some(30),
            gender: Some("Female".to_string()),
            height: Some(165.0),
            current_weight: Some(60.0),
            activity_level: Some("Medium".to_string()),
            health_conditions: Some("None".to_string()),
            run_history: vec![run_entry(300, 0)],
            ..Default::default()
        }
    }

    async fn seeded_store(profile: &UserProfile) -> (InMemoryProfileStore, Uuid) {
        let store = InMemoryProfileStore::new();
        let user_id = Uuid::new_v4();
        store
            .create(user_id, serde_json::to_value(profile).unwrap())
            .await
            .unwrap();
        (store, user_id)
    }

    fn client_for(server: &MockServer) -> PredictionClient {
        PredictionClient::new(server.uri(), Some(Duration::from_secs(5))).unwrap()
    }

    async fn mount_workout_success(server: &MockServer, workout: &str) {
        Mock::given(method("POST"))
            .and(path("/api/workout"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "status": "success",
                "recommended_workout": workout,
                "confidence": 0.91,
                "top_recommendations": [{"workout": workout, "confidence": 0.91}]
            })))
            .mount(server)
            .await;
    }

    async fn stored_profile(store: &dyn ProfileStore, user_id: Uuid) -> UserProfile {
        store.get(user_id).await.unwrap().unwrap().profile().unwrap()
    }

    fn record(label: &str) -> RecommendationRecord {
        RecommendationRecord {
            result: serde_json::from_value(json!({"status": "success", "recommended_workout": label}))
                .unwrap(),
            input_data: json!({"age": 30}),
            timestamp: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_success_is_persisted() {
        let server = MockServer::start().await;
        mount_workout_success(&server, "Cycling").await;
        let (store, user_id) = seeded_store(&workout_ready_profile()).await;
        let client = client_for(&server);
        let reconciler = ReconcilerConfig::default();
        let ctx = RecommendationContext {
            store: &store,
            client: &client,
            reconciler: &reconciler,
            persist_max_attempts: 3,
        };

        let state = RecommendationService::run(&ctx, user_id, RecommendationDomain::Workout).await;
        match &state {
            PredictionState::Success { recommendation, .. } => {
                assert_eq!(recommendation.headline(), Some("Cycling"))
            }
            other => panic!("expected success, got {:?}", other),
        }

        let profile = stored_profile(&store, user_id).await;
        let latest = profile.ai_recommendations.workout.clone().unwrap();
        assert_eq!(latest.input_data["calories_burned"], 300);
        assert_eq!(latest.input_data["bmi"], 22.0);
        assert_eq!(profile.recommendation_history.workout, vec![latest]);
        assert!(profile.last_ai_recommendation_update.is_some());
        // Tracker data is untouched by the persist.
        assert_eq!(profile.run_history.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_input_makes_no_request() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"status": "success"})))
            .expect(0)
            .mount(&server)
            .await;

        let mut profile = workout_ready_profile();
        profile.age = None;
        let (store, user_id) = seeded_store(&profile).await;
        let client = client_for(&server);
        let reconciler = ReconcilerConfig::default();
        let ctx = RecommendationContext {
            store: &store,
            client: &client,
            reconciler: &reconciler,
            persist_max_attempts: 3,
        };

        for domain in RecommendationDomain::ALL {
            let state = RecommendationService::run(&ctx, user_id, domain).await;
            match state {
                PredictionState::MissingInput { missing_fields, .. } => {
                    assert!(missing_fields.contains(&"age".to_string()))
                }
                other => panic!("expected missing input, got {:?}", other),
            }
        }
        assert!(stored_profile(&store, user_id).await.recommendation_history.workout.is_empty());
    }

    #[tokio::test]
    async fn test_missing_profile() {
        let server = MockServer::start().await;
        let store = InMemoryProfileStore::new();
        let client = client_for(&server);
        let reconciler = ReconcilerConfig::default();
        let ctx = RecommendationContext {
            store: &store,
            client: &client,
            reconciler: &reconciler,
            persist_max_attempts: 3,
        };

        let state = RecommendationService::run(&ctx, Uuid::new_v4(), RecommendationDomain::Meal).await;
        assert_eq!(
            state,
            PredictionState::MissingInput {
                domain: RecommendationDomain::Meal,
                missing_fields: vec![],
                reason: "Profile data is missing.".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_api_error_is_not_persisted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/workout"))
            .respond_with(ResponseTemplate::new(500).set_body_json(json!({
                "status": "error",
                "error": "Model not loaded"
            })))
            .mount(&server)
            .await;
        let (store, user_id) = seeded_store(&workout_ready_profile()).await;
        let client = client_for(&server);
        let reconciler = ReconcilerConfig::default();
        let ctx = RecommendationContext {
            store: &store,
            client: &client,
            reconciler: &reconciler,
            persist_max_attempts: 3,
        };

        let state = RecommendationService::run(&ctx, user_id, RecommendationDomain::Workout).await;
        assert_eq!(
            state,
            PredictionState::ApiError {
                domain: RecommendationDomain::Workout,
                message: "Model not loaded".to_string(),
            }
        );
        let profile = stored_profile(&store, user_id).await;
        assert!(profile.ai_recommendations.workout.is_none());
        assert!(profile.last_ai_recommendation_update.is_none());
    }

    #[tokio::test]
    async fn test_unreachable_service() {
        let (store, user_id) = seeded_store(&workout_ready_profile()).await;
        let client = PredictionClient::new("http://127.0.0.1:9", Some(Duration::from_secs(2))).unwrap();
        let reconciler = ReconcilerConfig::default();
        let ctx = RecommendationContext {
            store: &store,
            client: &client,
            reconciler: &reconciler,
            persist_max_attempts: 3,
        };

        let state = RecommendationService::run(&ctx, user_id, RecommendationDomain::Workout).await;
        assert_eq!(state.outcome(), "service_error");
    }

    #[tokio::test]
    async fn test_history_capped_newest_first() {
        let (store, user_id) = seeded_store(&UserProfile::default()).await;

        for i in 0..7 {
            persist_recommendation(&store, user_id, RecommendationDomain::Workout, record(&format!("w{}", i)), 3)
                .await
                .unwrap();
        }

        let profile = stored_profile(&store, user_id).await;
        let history = &profile.recommendation_history.workout;
        let labels: Vec<_> = history.iter().map(|r| r.result.headline().unwrap()).collect();
        assert_eq!(labels, vec!["w6", "w5", "w4", "w3", "w2"]);
        assert_eq!(profile.ai_recommendations.workout.as_ref(), history.first());
        assert!(profile.recommendation_history.meal.is_empty());
    }

    #[tokio::test]
    async fn test_persist_without_profile_fails() {
        let store = InMemoryProfileStore::new();
        let result =
            persist_recommendation(&store, Uuid::new_v4(), RecommendationDomain::Meal, record("m"), 3).await;
        assert!(matches!(result, Err(StoreError::NotFound)));
    }

    /// Lets another writer bump the version right before each of the first
    /// `conflicts` compare-and-swap updates.
    struct RacingStore {
        inner: InMemoryProfileStore,
        conflicts: AtomicU32,
    }

    #[async_trait]
    impl ProfileStore for RacingStore {
        async fn get(&self, user_id: Uuid) -> Result<Option<VersionedDocument>, StoreError> {
            self.inner.get(user_id).await
        }

        async fn create(&self, user_id: Uuid, document: Value) -> Result<(), StoreError> {
            self.inner.create(user_id, document).await
        }

        async fn update(
            &self,
            user_id: Uuid,
            update: &ProfileUpdate,
            expected_version: Option<i64>,
        ) -> Result<i64, StoreError> {
            let remaining = self.conflicts.load(Ordering::SeqCst);
            if expected_version.is_some() && remaining > 0 {
                self.conflicts.store(remaining - 1, Ordering::SeqCst);
                let concurrent = ProfileUpdate::new()
                    .append("screen_time_history", json!({"screen_time_hours": 2.0, "date": "2025-05-10", "timestamp": Utc::now()}))?
                    .server_timestamp("last_screen_time_update");
                self.inner.update(user_id, &concurrent, None).await?;
            }
            self.inner.update(user_id, update, expected_version).await
        }

        async fn health_check(&self) -> Result<(), StoreError> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_persist_retries_after_conflict() {
        let store = RacingStore {
            inner: InMemoryProfileStore::new(),
            conflicts: AtomicU32::new(2),
        };
        let user_id = Uuid::new_v4();
        store.create(user_id, json!({})).await.unwrap();

        persist_recommendation(&store, user_id, RecommendationDomain::Lifestyle, record("l"), 3)
            .await
            .unwrap();

        let profile = stored_profile(&store, user_id).await;
        assert_eq!(profile.recommendation_history.lifestyle.len(), 1);
        // The concurrent writes survive.
        assert_eq!(profile.screen_time_history.len(), 1);
    }

    #[tokio::test]
    async fn test_persist_gives_up_after_max_attempts() {
        let store = RacingStore {
            inner: InMemoryProfileStore::new(),
            conflicts: AtomicU32::new(10),
        };
        let user_id = Uuid::new_v4();
        store.create(user_id, json!({})).await.unwrap();

        let result =
            persist_recommendation(&store, user_id, RecommendationDomain::Lifestyle, record("l"), 3).await;
        assert!(matches!(result, Err(StoreError::Conflict { .. })));
        assert_eq!(store.conflicts.load(Ordering::SeqCst), 7);
    }

    #[tokio::test]
    async fn test_input_preview_lists_labels() {
        let server = MockServer::start().await;
        let mut profile = workout_ready_profile();
        profile.sleep_hours = None;
        let (store, user_id) = seeded_store(&profile).await;
        let client = client_for(&server);
        let reconciler = ReconcilerConfig::default();
        let ctx = RecommendationContext {
            store: &store,
            client: &client,
            reconciler: &reconciler,
            persist_max_attempts: 3,
        };

        let preview = RecommendationService::input(&ctx, user_id, RecommendationDomain::Lifestyle).await;
        assert!(!preview.ready);
        assert_eq!(
            preview.missing_labels,
            vec!["Sleep Hours", "Water Intake", "Screen Time"]
        );

        let ready = RecommendationService::input(&ctx, user_id, RecommendationDomain::Workout).await;
        assert!(ready.ready);
        assert_eq!(ready.payload.unwrap()["calories_burned"], 300);
    }
}
