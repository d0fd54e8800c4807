use std::sync::Arc;

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::error::ApiError;
use crate::AppState;

/// Middleware that requires a valid bearer token.
///
/// The resolved [`AuthUser`](super::AuthUser) is inserted into the request
/// extensions for handlers to pick up with `Extension<AuthUser>`.
pub async fn require_auth(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let user = state.identity.resolve(request.headers())?;
    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
