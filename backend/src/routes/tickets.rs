//! Ticket creation, assignment and lookup. All routes need a bearer token.

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    middleware,
    routing::{get, post},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use ticketdesk_common::{AssignedUser, Ticket};

use crate::auth::{require_auth, AuthUser};
use crate::error::ApiError;
use crate::tickets::{number_or_string, parse_ticket_id, CreateTicketRequest};
use crate::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignRequest {
    #[serde(default, deserialize_with = "number_or_string")]
    pub user_id: Option<i64>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResponse {
    pub message: &'static str,
    pub assigned_users: Vec<AssignedUser>,
}

#[derive(Debug, Serialize)]
pub struct TicketResponse {
    pub message: &'static str,
    pub ticket: Ticket,
}

/// POST /api/ticket
async fn create_ticket(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    payload: Result<Json<CreateTicketRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Ticket>), ApiError> {
    let Json(body) = payload?;
    let ticket = state.tickets.create(&caller, body)?;
    Ok((StatusCode::CREATED, Json(ticket)))
}

/// POST /api/tickets/:ticketId/assign
async fn assign_user(
    State(state): State<Arc<AppState>>,
    Extension(caller): Extension<AuthUser>,
    Path(ticket_id): Path<String>,
    payload: Result<Json<AssignRequest>, JsonRejection>,
) -> Result<Json<AssignResponse>, ApiError> {
    let ticket_id = parse_ticket_id(&ticket_id)?;
    let Json(body) = payload?;
    let ticket = state.tickets.assign(&caller, ticket_id, body.user_id)?;

    Ok(Json(AssignResponse {
        message: "User assigned successfully.",
        assigned_users: ticket.assigned_users,
    }))
}

/// GET or POST /api/tickets/:ticketId
async fn ticket_details(
    State(state): State<Arc<AppState>>,
    Path(ticket_id): Path<String>,
) -> Result<Json<TicketResponse>, ApiError> {
    let ticket = state.tickets.details(parse_ticket_id(&ticket_id)?)?;
    Ok(Json(TicketResponse {
        message: "Ticket details fetched successfully.",
        ticket,
    }))
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/ticket", post(create_ticket))
        .route("/api/tickets/:ticketId/assign", post(assign_user))
        .route("/api/tickets/:ticketId", get(ticket_details).post(ticket_details))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_auth))
        .with_state(state)
}
