//! Ticket types.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Upper bound on the number of users assigned to a single ticket.
pub const MAX_ASSIGNED_USERS: usize = 5;

/// Error returned when a string is not a member of a closed set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseEnumError {
    kind: &'static str,
    value: String,
}

impl ParseEnumError {
    pub fn new(kind: &'static str, value: &str) -> Self {
        Self {
            kind,
            value: value.to_string(),
        }
    }
}

impl std::fmt::Display for ParseEnumError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid {}: '{}'", self.kind, self.value)
    }
}

impl std::error::Error for ParseEnumError {}

/// Ticket status.
///
/// The wire and storage form of `InProgress` is `in-progress`. Parsing is
/// case-insensitive and also accepts `in progress` and `in_progress`, so every
/// spelling lands in the same bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Status {
    #[serde(rename = "open")]
    Open,
    #[serde(rename = "in-progress")]
    InProgress,
    #[serde(rename = "closed")]
    Closed,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Open => "open",
            Status::InProgress => "in-progress",
            Status::Closed => "closed",
        }
    }

    /// Closed tickets accept no further assignments.
    pub fn is_assignable(&self) -> bool {
        !matches!(self, Status::Closed)
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Status::Open),
            "in-progress" | "in progress" | "in_progress" => Ok(Status::InProgress),
            "closed" => Ok(Status::Closed),
            _ => Err(ParseEnumError::new("status", s)),
        }
    }
}

/// Ticket priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    Medium,
    High,
}

impl Priority {
    pub fn as_str(&self) -> &'static str {
        match self {
            Priority::Low => "low",
            Priority::Medium => "medium",
            Priority::High => "high",
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Priority {
    type Err = ParseEnumError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            _ => Err(ParseEnumError::new("priority", s)),
        }
    }
}

/// Snapshot of a user copied into a ticket at assignment time.
///
/// Later changes to the user's name or email are not reflected here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignedUser {
    pub user_id: i64,
    pub name: String,
    pub email: String,
}

/// A ticket as returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub ticket_id: i64,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub ticket_type: String,
    pub venue: String,
    pub status: Status,
    pub price: f64,
    pub priority: Priority,
    pub due_date: DateTime<Utc>,
    pub created_by: i64,
    pub assigned_users: Vec<AssignedUser>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Optimistic concurrency counter, bumped on every assignment write.
    #[serde(skip)]
    pub version: i64,
}

impl Ticket {
    pub fn is_assigned(&self, user_id: i64) -> bool {
        self.assigned_users.iter().any(|u| u.user_id == user_id)
    }

    pub fn is_full(&self) -> bool {
        self.assigned_users.len() >= MAX_ASSIGNED_USERS
    }
}
