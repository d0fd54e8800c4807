//! Helpers shared by unit and integration tests.

use std::sync::Arc;

use chrono::Utc;
use ticketdesk_common::Role;

use crate::config::{AuthConfig, Config, CorsConfig, DatabaseConfig, LoggingConfig};
use crate::models::user::{NewUser, User};
use crate::store::Store;
use crate::AppState;

pub const TEST_JWT_SECRET: &str = "test-secret";

/// Password meeting the registration rules.
pub const TEST_PASSWORD: &str = "Secur3!pass";

pub fn test_config() -> Config {
    Config {
        host: "127.0.0.1".to_string(),
        port: 5000,
        database: DatabaseConfig {
            url: ":memory:".to_string(),
        },
        auth: AuthConfig {
            jwt_secret: TEST_JWT_SECRET.to_string(),
            token_ttl_hours: 1,
            // bcrypt's minimum work factor
            bcrypt_cost: 4,
        },
        logging: LoggingConfig {
            level: "debug".to_string(),
        },
        cors: CorsConfig {
            origins: "*".to_string(),
        },
    }
}

/// State over a fresh in-memory database.
pub fn create_test_state() -> Arc<AppState> {
    let store = Arc::new(Store::open(":memory:").expect("in-memory store opens"));
    Arc::new(AppState::new(test_config(), store))
}

/// Insert a user directly, bypassing registration and hashing.
pub fn seed_user(state: &AppState, email: &str, role: Role) -> User {
    state
        .store
        .insert_user(&NewUser {
            name: email.split('@').next().unwrap_or(email).to_string(),
            email: email.to_string(),
            password_hash: "unusable".to_string(),
            role,
            registered_on: Utc::now(),
        })
        .expect("seed user inserts")
}

/// Valid bearer token for `user`.
pub fn token_for(state: &AppState, user: &User) -> String {
    state
        .identity
        .tokens()
        .issue(user.id)
        .expect("test token signs")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {}", token)
}
