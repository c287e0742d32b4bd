//! Account service: sign-up, login and session refresh
//!
//! Sign-up creates the account row and then seeds the user's profile
//! document from the sign-up form. Password hashing runs on the blocking
//! pool.

use crate::auth::{JwtService, PasswordService, TokenKind};
use crate::error::ApiError;
use crate::repositories::{ProfileStore, UserRepository};
use chrono::{DateTime, Utc};
use healthmate_shared::models::{LifestyleUpdate, StressLevel, UserProfile, WeightEntry};
use healthmate_shared::types::{AccountResponse, AuthTokens, RegisterRequest};
use healthmate_shared::validation::{
    validate_age, validate_choice, validate_height_cm, validate_password, validate_sleep_hours,
    validate_stress_score, validate_weight, VALID_ACTIVITY_LEVELS, VALID_ALCOHOL_USE,
    VALID_GENDERS, VALID_HEALTH_CONDITIONS, VALID_SMOKING_STATUSES,
};
use sqlx::PgPool;
use tracing::{error, info};
use uuid::Uuid;
use validator::ValidateEmail;

/// Accounts are keyed by the trimmed, lowercased address
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub struct UserService;

impl UserService {
    fn validate_registration(req: &RegisterRequest) -> Result<(), ApiError> {
        if !req.email.validate_email() {
            return Err(ApiError::Validation("Invalid email format".to_string()));
        }
        if req.username.trim().is_empty() {
            return Err(ApiError::Validation("Username is required".to_string()));
        }

        let checks = [
            validate_password(&req.password),
            validate_age(req.age),
            validate_height_cm(req.height),
            validate_weight(req.weight),
            validate_sleep_hours(req.sleep_hours),
            validate_stress_score(req.stress_level),
            validate_choice("gender", &req.gender, VALID_GENDERS),
            validate_choice("activity_level", &req.activity_level, VALID_ACTIVITY_LEVELS),
            validate_choice("smoking_status", &req.smoking_status, VALID_SMOKING_STATUSES),
            validate_choice("alcohol_use", &req.alcohol_use, VALID_ALCOHOL_USE),
            validate_choice("health_conditions", &req.health_conditions, VALID_HEALTH_CONDITIONS),
        ];
        checks
            .into_iter()
            .collect::<Result<Vec<()>, String>>()
            .map(|_| ())
            .map_err(ApiError::Validation)
    }

    /// Initial profile document for a new account
    pub fn seed_profile(req: &RegisterRequest, now: DateTime<Utc>) -> UserProfile {
        let stress_level = StressLevel::Score(req.stress_level);

        UserProfile {
            username: Some(req.username.trim().to_string()),
            email: Some(normalize_email(&req.email)),
            created_at: Some(now),
            age: Some(req.age),
            gender: Some(req.gender.clone()),
            height: Some(req.height),
            weight: Some(req.weight),
            current_weight: Some(req.weight),
            activity_level: Some(req.activity_level.clone()),
            sleep_hours: Some(req.sleep_hours),
            stress_level: Some(stress_level.clone()),
            smoking_status: Some(req.smoking_status.clone()),
            alcohol_use: Some(req.alcohol_use.clone()),
            health_conditions: Some(req.health_conditions.clone()),
            weight_history: vec![WeightEntry {
                weight: req.weight,
                date: now.date_naive(),
                timestamp: now,
            }],
            lifestyle_updates: vec![LifestyleUpdate {
                activity_level: req.activity_level.clone(),
                sleep_hours: req.sleep_hours,
                stress_level,
                smoking_status: req.smoking_status.clone(),
                alcohol_use: req.alcohol_use.clone(),
                date: now.date_naive(),
                timestamp: now,
            }],
            last_weight_update: Some(now),
            last_lifestyle_update: Some(now),
            ..Default::default()
        }
    }

    pub async fn register(
        pool: &PgPool,
        store: &dyn ProfileStore,
        jwt: &JwtService,
        mut req: RegisterRequest,
    ) -> Result<AuthTokens, ApiError> {
        req.email = normalize_email(&req.email);
        Self::validate_registration(&req)?;

        if UserRepository::email_exists(pool, &req.email)
            .await
            .map_err(ApiError::Internal)?
        {
            return Err(ApiError::Conflict("Email already registered".to_string()));
        }

        let password_hash = PasswordService::hash_async(req.password.clone())
            .await
            .map_err(ApiError::Internal)?;

        let user = UserRepository::create(pool, &req.email, &password_hash)
            .await
            .map_err(ApiError::Internal)?;

        let document = serde_json::to_value(Self::seed_profile(&req, Utc::now()))
            .map_err(|e| ApiError::Internal(e.into()))?;
        if let Err(err) = store.create(user.id, document).await {
            error!(user_id = %user.id, error = %err, "Failed to create profile, removing account");
            UserRepository::delete(pool, user.id)
                .await
                .map_err(ApiError::Internal)?;
            return Err(err.into());
        }

        info!(user_id = %user.id, "Account registered");
        Self::issue_tokens(jwt, user.id)
    }

    pub async fn login(
        pool: &PgPool,
        jwt: &JwtService,
        email: &str,
        password: &str,
    ) -> Result<AuthTokens, ApiError> {
        let user = UserRepository::find_by_email(pool, &normalize_email(email))
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("Invalid credentials".to_string()))?;

        let valid = PasswordService::verify_async(password.to_string(), user.password_hash.clone())
            .await
            .map_err(ApiError::Internal)?;
        if !valid {
            return Err(ApiError::Unauthorized("Invalid credentials".to_string()));
        }

        Self::issue_tokens(jwt, user.id)
    }

    pub async fn refresh(pool: &PgPool, jwt: &JwtService, refresh_token: &str) -> Result<AuthTokens, ApiError> {
        let user_id = jwt
            .validate(refresh_token, TokenKind::Refresh)
            .and_then(|claims| claims.user_id())
            .map_err(|e| ApiError::Unauthorized(format!("Invalid refresh token: {}", e)))?;

        UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::Unauthorized("User not found".to_string()))?;

        Self::issue_tokens(jwt, user_id)
    }

    pub async fn account(pool: &PgPool, user_id: Uuid) -> Result<AccountResponse, ApiError> {
        let user = UserRepository::find_by_id(pool, user_id)
            .await
            .map_err(ApiError::Internal)?
            .ok_or_else(|| ApiError::NotFound("User not found".to_string()))?;

        Ok(AccountResponse {
            id: user.id.to_string(),
            email: user.email,
            created_at: user.created_at,
        })
    }

    fn issue_tokens(jwt: &JwtService, user_id: Uuid) -> Result<AuthTokens, ApiError> {
        Ok(AuthTokens {
            access_token: jwt.issue(user_id, TokenKind::Access).map_err(ApiError::Internal)?,
            refresh_token: jwt.issue(user_id, TokenKind::Refresh).map_err(ApiError::Internal)?,
            token_type: "Bearer".to_string(),
            expires_in: jwt.access_token_expiry_secs(),
        })
    }
}
