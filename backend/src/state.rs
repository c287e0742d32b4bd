//! Application state management
//!
//! Everything a handler needs, built once at startup and cloned per request.
//! All fields are `Arc`s or internally reference counted.

use crate::auth::JwtService;
use crate::config::{AppConfig, StoreBackend};
use crate::external::PredictionClient;
use crate::repositories::{InMemoryProfileStore, PgProfileStore, ProfileStore};
use healthmate_shared::reconcile::ReconcilerConfig;
use metrics_exporter_prometheus::PrometheusHandle;
use sqlx::PgPool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    /// Account database pool
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    /// Pre-initialized JWT service with cached keys
    pub jwt: JwtService,
    pub profiles: Arc<dyn ProfileStore>,
    pub predictor: PredictionClient,
    pub reconciler: Arc<ReconcilerConfig>,
    /// Present when a Prometheus recorder is installed
    pub metrics: Option<PrometheusHandle>,
}

impl AppState {
    /// Build state with the profile store selected by `config.store.backend`
    pub fn new(db: PgPool, config: AppConfig) -> anyhow::Result<Self> {
        let profiles: Arc<dyn ProfileStore> = match config.store.backend {
            StoreBackend::Postgres => Arc::new(PgProfileStore::new(db.clone())),
            StoreBackend::Memory => Arc::new(InMemoryProfileStore::new()),
        };
        Self::with_store(db, config, profiles)
    }

    pub fn with_store(
        db: PgPool,
        config: AppConfig,
        profiles: Arc<dyn ProfileStore>,
    ) -> anyhow::Result<Self> {
        let jwt = JwtService::new(
            &config.jwt.secret,
            config.jwt.access_token_expiry_secs,
            config.jwt.refresh_token_expiry_secs,
        );
        let predictor =
            PredictionClient::new(config.prediction.base_url.clone(), config.prediction.timeout())?;
        let reconciler = Arc::new(config.reconciler_config());

        Ok(Self {
            db,
            config: Arc::new(config),
            jwt,
            profiles,
            predictor,
            reconciler,
            metrics: None,
        })
    }

    pub fn with_metrics(mut self, handle: PrometheusHandle) -> Self {
        self.metrics = Some(handle);
        self
    }

    #[inline]
    pub fn db(&self) -> &PgPool {
        &self.db
    }

    #[inline]
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    #[inline]
    pub fn jwt(&self) -> &JwtService {
        &self.jwt
    }

    #[inline]
    pub fn profiles(&self) -> &dyn ProfileStore {
        self.profiles.as_ref()
    }
}
