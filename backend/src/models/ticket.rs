use chrono::{DateTime, Utc};
use ticketdesk_common::{Priority, Status};

/// Validated fields for a ticket insert. Tickets start with no assignees.
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub title: String,
    pub description: String,
    pub ticket_type: String,
    pub venue: String,
    pub status: Status,
    pub price: f64,
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    pub created_by: i64,
    pub created_at: DateTime<Utc>,
}
