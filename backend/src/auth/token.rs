use axum::http::HeaderMap;
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Caller identity resolved from a verified bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Access token is required")]
    MissingToken,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Token signing failed: {0}")]
    Signing(String),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::MissingToken | AuthError::InvalidToken => ApiError::Auth(err.to_string()),
            AuthError::Signing(_) => {
                tracing::error!("{}", err);
                ApiError::Internal("Internal server error".to_string())
            }
        }
    }
}

/// JWT claims.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Claims {
    pub user_id: i64,
    pub iat: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens.
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

/// Extract the token from an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("authorization")?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

impl TokenService {
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation: Validation::new(Algorithm::HS256),
            ttl: Duration::hours(ttl_hours),
        }
    }

    /// Mint a token bound to `user_id`.
    pub fn issue(&self, user_id: i64) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims = Claims {
            user_id,
            iat: now.timestamp(),
            exp: (now + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    /// Check signature and expiry.
    pub fn verify(&self, token: &str) -> Result<Claims, AuthError> {
        decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!("Token rejected: {}", e);
                AuthError::InvalidToken
            })
    }

    /// Authenticate a request by validating its Bearer token.
    pub fn authenticate(&self, headers: &HeaderMap) -> Result<AuthUser, AuthError> {
        let token = bearer_token(headers).ok_or(AuthError::MissingToken)?;
        let claims = self.verify(token)?;
        Ok(AuthUser {
            user_id: claims.user_id,
        })
    }
}
