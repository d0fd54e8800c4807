pub mod analytics;
pub mod auth;
pub mod config;
pub mod error;
pub mod logging;
pub mod models;
pub mod routes;
pub mod store;
pub mod test_util;
pub mod tickets;
pub mod time;

pub use analytics::AnalyticsService;
pub use auth::{AuthUser, IdentityService};
pub use config::Config;
pub use error::ApiError;
pub use store::{Store, StoreError};
pub use tickets::TicketService;

use std::sync::Arc;

use axum::http::HeaderValue;
use axum::{middleware, Router};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::auth::{PasswordHasher, TokenService};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub store: Arc<Store>,
    pub identity: IdentityService,
    pub tickets: TicketService,
    pub analytics: AnalyticsService,
}

impl AppState {
    /// Wire every service to the one store.
    pub fn new(config: Config, store: Arc<Store>) -> Self {
        let tokens = TokenService::new(&config.auth.jwt_secret, config.auth.token_ttl_hours);
        let hasher = PasswordHasher::new(config.auth.bcrypt_cost);

        Self {
            identity: IdentityService::new(store.clone(), tokens, hasher),
            tickets: TicketService::new(store.clone()),
            analytics: AnalyticsService::new(store.clone()),
            store,
            config,
        }
    }
}

fn cors_layer(config: &Config) -> CorsLayer {
    let origin = match config.cors.origin_list() {
        None => AllowOrigin::from(Any),
        Some(origins) => AllowOrigin::list(origins.iter().filter_map(|origin| {
            match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    tracing::warn!("Ignoring invalid CORS origin '{}'", origin);
                    None
                }
            }
        })),
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods(Any)
        .allow_headers(Any)
}

/// Build the full HTTP surface.
pub fn app(state: Arc<AppState>) -> Router {
    Router::new()
        .merge(routes::health::router())
        .merge(routes::users::router(state.clone()))
        .merge(routes::tickets::router(state.clone()))
        .merge(routes::analytics::router(state.clone()))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            logging::request_logger,
        ))
        .layer(cors_layer(&state.config))
        .layer(TraceLayer::new_for_http())
}
