use std::sync::Arc;

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    middleware,
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use ticketdesk_common::{DashboardAnalytics, TicketAnalytics};

use crate::analytics::DateRange;
use crate::auth::require_auth;
use crate::error::ApiError;
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

impl RangeQuery {
    fn range(&self) -> Result<DateRange, ApiError> {
        DateRange::parse(self.start_date.as_deref(), self.end_date.as_deref())
    }
}

/// GET /api/tickets/analytics
async fn ticket_analytics(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<TicketAnalytics>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.analytics.ticket_analytics(&query.range()?)?))
}

/// GET /api/dashboard/analytics
async fn dashboard_analytics(
    State(state): State<Arc<AppState>>,
    query: Result<Query<RangeQuery>, QueryRejection>,
) -> Result<Json<DashboardAnalytics>, ApiError> {
    let Query(query) = query?;
    Ok(Json(state.analytics.dashboard_analytics(&query.range()?)?))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/tickets/analytics", get(ticket_analytics))
        .route("/api/dashboard/analytics", get(dashboard_analytics))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
