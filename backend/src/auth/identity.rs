use std::sync::Arc;

use axum::http::HeaderMap;
use chrono::Utc;
use ticketdesk_common::Role;

use super::password::PasswordHasher;
use super::token::{AuthUser, TokenService};
use super::validation::{is_strong_password, is_valid_email};
use crate::error::{ApiError, Result};
use crate::models::user::{NewUser, User};
use crate::store::Store;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub token: String,
}

/// Registration, credential checks and token resolution.
pub struct IdentityService {
    store: Arc<Store>,
    tokens: TokenService,
    hasher: PasswordHasher,
}

impl IdentityService {
    pub fn new(store: Arc<Store>, tokens: TokenService, hasher: PasswordHasher) -> Self {
        Self {
            store,
            tokens,
            hasher,
        }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    pub async fn register(
        &self,
        name: &str,
        email: &str,
        password: &str,
        role: &str,
    ) -> Result<User> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ApiError::validation("Name is required."));
        }
        if !is_valid_email(email) {
            return Err(ApiError::validation("Invalid Email Format!"));
        }
        if !is_strong_password(password) {
            return Err(ApiError::validation(
                "Password must be at least 8 characters long and contain an uppercase letter, \
                 a lowercase letter, a number and one of @$!%*?&.",
            ));
        }
        let role: Role = role
            .parse()
            .map_err(|_| ApiError::validation("Invalid User Type!"))?;

        if self.store.find_user_by_email(email)?.is_some() {
            return Err(ApiError::Conflict("Email already exists.".to_string()));
        }

        let password_hash = self.hasher.hash(password.to_string()).await?;
        // The UNIQUE constraint still catches a registration racing this one.
        let user = self.store.insert_user(&NewUser {
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
            role,
            registered_on: Utc::now(),
        })?;

        tracing::info!("Registered user {} ({}) as {}", user.id, user.email, user.role);
        Ok(user)
    }

    pub async fn login(&self, email: &str, password: &str) -> Result<LoginOutcome> {
        if email.is_empty() || password.is_empty() {
            return Err(ApiError::validation("Email and password are required"));
        }

        let Some(user) = self.store.find_user_by_email(email)? else {
            return Err(ApiError::NotFound("User not found.".to_string()));
        };

        if !user.is_active {
            return Err(ApiError::validation(
                "Account has been deactivated. Kindly contact the administrator.",
            ));
        }

        if !self
            .hasher
            .verify(password.to_string(), user.password_hash.clone())
            .await
        {
            return Err(ApiError::Auth("Invalid credentials.".to_string()));
        }

        let reusable = user
            .session_token
            .as_deref()
            .filter(|token| matches!(self.tokens.verify(token), Ok(claims) if claims.user_id == user.id));
        let token = match reusable {
            Some(token) => token.to_string(),
            None => self.tokens.issue(user.id)?,
        };

        self.store.record_login(user.id, &token, &Utc::now())?;
        tracing::info!("User {} logged in", user.id);

        Ok(LoginOutcome { token })
    }

    /// Resolve the bearer token in `headers` to a caller identity.
    pub fn resolve(&self, headers: &HeaderMap) -> Result<AuthUser> {
        Ok(self.tokens.authenticate(headers)?)
    }
}
