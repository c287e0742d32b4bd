//! JWT session tokens
//!
//! Keys are derived once from the configured secret and shared through
//! `AppState`; cloning a [`JwtService`] only bumps reference counts.

use anyhow::{anyhow, Result};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

/// Which half of the token pair a JWT is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TokenKind {
    Access,
    Refresh,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Access => f.write_str("access"),
            TokenKind::Refresh => f.write_str("refresh"),
        }
    }
}

/// JWT claims
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// User id
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub token_type: TokenKind,
}

impl Claims {
    pub fn user_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|_| anyhow!("Invalid user ID in token"))
    }
}

/// Issues and validates the session token pair
#[derive(Clone)]
pub struct JwtService {
    encoding: Arc<EncodingKey>,
    decoding: Arc<DecodingKey>,
    access_ttl_secs: i64,
    refresh_ttl_secs: i64,
}

impl JwtService {
    /// Derive keys from `secret`. Call once at startup.
    pub fn new(secret: &str, access_ttl_secs: i64, refresh_ttl_secs: i64) -> Self {
        Self {
            encoding: Arc::new(EncodingKey::from_secret(secret.as_bytes())),
            decoding: Arc::new(DecodingKey::from_secret(secret.as_bytes())),
            access_ttl_secs,
            refresh_ttl_secs,
        }
    }

    pub fn issue(&self, user_id: Uuid, kind: TokenKind) -> Result<String> {
        let ttl = match kind {
            TokenKind::Access => self.access_ttl_secs,
            TokenKind::Refresh => self.refresh_ttl_secs,
        };
        let now = Utc::now();
        let claims = Claims {
            sub: user_id.to_string(),
            exp: (now + Duration::seconds(ttl)).timestamp(),
            iat: now.timestamp(),
            token_type: kind,
        };

        encode(&Header::default(), &claims, &self.encoding)
            .map_err(|e| anyhow!("Failed to generate {} token: {}", kind, e))
    }

    /// Decode `token` and require it to be of `kind`
    pub fn validate(&self, token: &str, kind: TokenKind) -> Result<Claims> {
        let claims = decode::<Claims>(token, &self.decoding, &Validation::default())
            .map_err(|e| anyhow!("Invalid token: {}", e))?
            .claims;

        if claims.token_type != kind {
            return Err(anyhow!("Expected a {} token", kind));
        }
        Ok(claims)
    }

    #[inline]
    pub fn access_token_expiry_secs(&self) -> i64 {
        self.access_ttl_secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> JwtService {
        JwtService::new("test-secret", 3600, 604800)
    }

    #[test]
    fn test_issue_and_validate_access_token() {
        let service = service();
        let user_id = Uuid::new_v4();

        let token = service.issue(user_id, TokenKind::Access).unwrap();
        let claims = service.validate(&token, TokenKind::Access).unwrap();

        assert_eq!(claims.user_id().unwrap(), user_id);
        assert_eq!(claims.token_type, TokenKind::Access);
    }

    #[test]
    fn test_access_token_rejected_as_refresh() {
        let service = service();
        let token = service.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        assert!(service.validate(&token, TokenKind::Refresh).is_err());
    }

    #[test]
    fn test_token_from_other_secret_rejected() {
        let other = JwtService::new("another-secret", 3600, 604800);
        let token = other.issue(Uuid::new_v4(), TokenKind::Access).unwrap();
        assert!(service().validate(&token, TokenKind::Access).is_err());
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(service().validate("invalid.token.here", TokenKind::Access).is_err());
    }
}
