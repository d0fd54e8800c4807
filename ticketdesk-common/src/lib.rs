//! TicketDesk Common Types
//!
//! Shared types used by the backend and its clients: roles, ticket enums,
//! ticket payloads and analytics views.

pub mod analytics;
pub mod role;
pub mod ticket;

pub use analytics::{DashboardAnalytics, PriorityBreakdown, TicketAnalytics};
pub use role::Role;
pub use ticket::{AssignedUser, ParseEnumError, Priority, Status, Ticket, MAX_ASSIGNED_USERS};
