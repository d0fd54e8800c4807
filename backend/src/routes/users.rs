//! Registration and login.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    /// Accepted as `role` or `type`.
    #[serde(default, alias = "type")]
    pub role: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterResponse {
    pub message: &'static str,
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub message: &'static str,
    pub token: String,
}

/// POST /api/users
async fn register(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RegisterRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let Json(body) = payload?;
    let user = state
        .identity
        .register(&body.name, &body.email, &body.password, &body.role)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(RegisterResponse {
            message: "User registered successfully.",
            user_id: user.id,
            name: user.name,
            email: user.email,
        }),
    ))
}

/// POST /api/auth/login
async fn login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Result<Json<LoginResponse>, ApiError> {
    let Json(body) = payload?;
    let outcome = state.identity.login(&body.email, &body.password).await?;

    Ok(Json(LoginResponse {
        message: "Login successful.",
        token: outcome.token,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/users", post(register))
        .route("/api/auth/login", post(login))
        .with_state(state)
}
