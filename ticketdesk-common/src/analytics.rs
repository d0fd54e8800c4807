//! Analytics response payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::ticket::Ticket;

/// Counts and full rows for tickets created within a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketAnalytics {
    pub total_tickets: u64,
    pub closed_tickets: u64,
    pub open_tickets: u64,
    pub in_progress_tickets: u64,
    /// Lowercased priority -> count. Only priorities present in the range appear.
    pub priority_distribution: BTreeMap<String, u64>,
    /// Ticket type -> count.
    pub type_distribution: BTreeMap<String, u64>,
    pub ticket_details: Vec<Ticket>,
}

/// Per-priority counts with their per-day averages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriorityBreakdown {
    pub low: u64,
    pub average_low_tickets_booked_per_day: f64,
    pub medium: u64,
    pub average_medium_tickets_booked_per_day: f64,
    pub high: u64,
    pub average_high_tickets_booked_per_day: f64,
}

/// Dashboard summary for tickets created within a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardAnalytics {
    pub total_tickets: u64,
    pub total_days: i64,
    pub closed_tickets: u64,
    pub open_tickets: u64,
    pub in_progress_tickets: u64,
    /// Mean ticket price, rounded to two decimals. Zero when no tickets match.
    pub average_customer_spending: f64,
    pub average_tickets_booked_per_day: f64,
    pub priority_distribution: PriorityBreakdown,
    pub type_distribution: BTreeMap<String, u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dashboard_field_names() {
        let dashboard = DashboardAnalytics {
            total_tickets: 0,
            total_days: 1,
            closed_tickets: 0,
            open_tickets: 0,
            in_progress_tickets: 0,
            average_customer_spending: 0.0,
            average_tickets_booked_per_day: 0.0,
            priority_distribution: PriorityBreakdown::default(),
            type_distribution: BTreeMap::new(),
        };
        let json = serde_json::to_value(&dashboard).unwrap();
        assert_eq!(json["totalDays"], 1);
        assert_eq!(json["inProgressTickets"], 0);
        assert_eq!(json["priorityDistribution"]["averageHighTicketsBookedPerDay"], 0.0);
        assert!(json["typeDistribution"].as_object().unwrap().is_empty());
    }
}
