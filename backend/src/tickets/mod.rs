//! Ticket lifecycle: creation, role-gated assignment, lookup.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{de, Deserialize, Deserializer};
use ticketdesk_common::{Priority, Status, Ticket, MAX_ASSIGNED_USERS};

use crate::auth::AuthUser;
use crate::error::{ApiError, Result};
use crate::models::ticket::NewTicket;
use crate::store::Store;
use crate::time::parse_time;

const MISSING_PARAMETERS: &str = "Required parameters are missing.";

/// Body of a ticket creation request. Every field is required.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTicketRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub ticket_type: Option<String>,
    pub venue: Option<String>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub price: Option<f64>,
    pub priority: Option<String>,
    pub due_date: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub created_by: Option<i64>,
}

/// Accept a JSON number or a numeric string. Null and blank strings read as absent.
pub fn number_or_string<'de, D, T>(deserializer: D) -> std::result::Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + FromStr,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString<N> {
        Number(N),
        Text(String),
    }

    match Option::<NumberOrString<T>>::deserialize(deserializer)? {
        None => Ok(None),
        Some(NumberOrString::Number(n)) => Ok(Some(n)),
        Some(NumberOrString::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(NumberOrString::Text(text)) => text
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| de::Error::custom(format!("expected a number, got '{}': {}", text, e))),
    }
}

/// The value as sent, unless it is empty or whitespace.
fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Check fields against `now` and produce an insertable ticket.
///
/// Zero counts as missing for `price` and `createdBy`, like an empty string
/// does for the text fields.
pub fn validate_new_ticket(request: CreateTicketRequest, now: DateTime<Utc>) -> Result<NewTicket> {
    let (
        Some(title),
        Some(description),
        Some(ticket_type),
        Some(venue),
        Some(status),
        Some(price),
        Some(priority),
        Some(due_date),
        Some(created_by),
    ) = (
        present(request.title),
        present(request.description),
        present(request.ticket_type),
        present(request.venue),
        present(request.status),
        request.price.filter(|p| *p != 0.0),
        present(request.priority),
        present(request.due_date),
        request.created_by.filter(|id| *id != 0),
    )
    else {
        return Err(ApiError::validation(MISSING_PARAMETERS));
    };

    let status: Status = status
        .parse()
        .map_err(|_| ApiError::validation("Invalid Status Type!"))?;
    let priority: Priority = priority
        .parse()
        .map_err(|_| ApiError::validation("Invalid priority Type!"))?;

    let due_date = match parse_time(&due_date) {
        Some(parsed) if parsed.instant > now => parsed.instant,
        _ => return Err(ApiError::validation("Due date must be a future date.")),
    };

    Ok(NewTicket {
        title,
        description,
        ticket_type,
        venue,
        status,
        price,
        priority,
        due_date,
        created_by,
        created_at: now,
    })
}

/// Parse a ticket id taken from the request path.
pub fn parse_ticket_id(raw: &str) -> Result<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| ApiError::validation(format!("Invalid ticket id: '{}'", raw)))
}

pub struct TicketService {
    store: Arc<Store>,
}

impl TicketService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    pub fn create(&self, caller: &AuthUser, request: CreateTicketRequest) -> Result<Ticket> {
        let new_ticket = validate_new_ticket(request, Utc::now())?;

        if self.store.find_user_by_id(new_ticket.created_by)?.is_none() {
            return Err(ApiError::validation("Invalid ID."));
        }

        let ticket = self.store.insert_ticket(&new_ticket)?;
        tracing::info!(
            "User {} created ticket {} for creator {}",
            caller.user_id,
            ticket.ticket_id,
            ticket.created_by
        );
        Ok(ticket)
    }

    /// Append `user_id` to the ticket's assignees and return the updated ticket.
    pub fn assign(&self, caller: &AuthUser, ticket_id: i64, user_id: Option<i64>) -> Result<Ticket> {
        let Some(user_id) = user_id.filter(|id| *id != 0) else {
            return Err(ApiError::validation(MISSING_PARAMETERS));
        };

        let Some(mut ticket) = self.store.find_ticket(ticket_id)? else {
            return Err(ApiError::NotFound("Ticket not found.".to_string()));
        };

        if !ticket.status.is_assignable() {
            return Err(ApiError::validation("Cannot assign users to a closed ticket."));
        }

        let Some(requester) = self.store.find_user_by_id(caller.user_id)? else {
            return Err(ApiError::Auth("Requesting user does not exist.".to_string()));
        };
        if !requester.role.is_admin() && requester.id != ticket.created_by {
            return Err(ApiError::Forbidden(
                "Only an admin or the ticket creator can assign users.".to_string(),
            ));
        }

        let Some(assignee) = self.store.find_user_by_id(user_id)? else {
            return Err(ApiError::validation("User does not exist."));
        };
        if assignee.role.is_admin() {
            return Err(ApiError::validation("Cannot assign ticket to an Admin."));
        }

        if ticket.is_assigned(assignee.id) {
            return Err(ApiError::validation("User already assigned to this ticket."));
        }
        if ticket.is_full() {
            return Err(ApiError::validation(format!(
                "Maximum number of users assigned ({}).",
                MAX_ASSIGNED_USERS
            )));
        }

        let now = Utc::now();
        ticket.assigned_users.push(assignee.snapshot());
        self.store
            .update_assigned_users(ticket.ticket_id, ticket.version, &ticket.assigned_users, &now)?;
        ticket.version += 1;
        ticket.updated_at = now;

        tracing::info!(
            "User {} assigned user {} to ticket {} ({}/{})",
            caller.user_id,
            assignee.id,
            ticket.ticket_id,
            ticket.assigned_users.len(),
            MAX_ASSIGNED_USERS
        );
        Ok(ticket)
    }

    pub fn details(&self, ticket_id: i64) -> Result<Ticket> {
        self.store
            .find_ticket(ticket_id)?
            .ok_or_else(|| ApiError::NotFound("Ticket not found.".to_string()))
    }
}
