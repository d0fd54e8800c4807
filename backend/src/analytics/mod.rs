//! Aggregate views over tickets created within a date range.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use ticketdesk_common::{DashboardAnalytics, PriorityBreakdown, Status, TicketAnalytics};

use crate::error::{ApiError, Result};
use crate::store::{GroupColumn, Store};
use crate::time::{parse_time, ParsedTime};

/// An inclusive `createdAt` window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: ParsedTime,
    end: ParsedTime,
}

impl DateRange {
    pub fn parse(start: Option<&str>, end: Option<&str>) -> Result<Self> {
        let (Some(start), Some(end)) = (start, end) else {
            return Err(ApiError::validation("Start date and end date are required."));
        };
        let start = parse_time(start)
            .ok_or_else(|| ApiError::validation(format!("Invalid start date: '{}'", start)))?;
        let end = parse_time(end)
            .ok_or_else(|| ApiError::validation(format!("Invalid end date: '{}'", end)))?;
        Ok(Self { start, end })
    }

    pub fn from(&self) -> DateTime<Utc> {
        self.start.instant
    }

    /// Upper bound for queries; a bare end date reaches the end of that day.
    pub fn until(&self) -> DateTime<Utc> {
        self.end.last_instant()
    }

    /// Whole days between the parsed instants, counting both ends.
    pub fn total_days(&self) -> i64 {
        (self.end.instant - self.start.instant).num_days() + 1
    }
}

#[derive(Debug, Default, PartialEq, Eq)]
struct StatusCounts {
    open: u64,
    in_progress: u64,
    closed: u64,
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

fn per_day(count: u64, days: i64) -> f64 {
    count as f64 / days as f64
}

pub struct AnalyticsService {
    store: Arc<Store>,
}

impl AnalyticsService {
    pub fn new(store: Arc<Store>) -> Self {
        Self { store }
    }

    fn status_counts(&self, range: &DateRange) -> Result<StatusCounts> {
        let mut counts = StatusCounts::default();
        for (raw, count) in self
            .store
            .count_tickets_by(GroupColumn::Status, &range.from(), &range.until())?
        {
            match raw.parse::<Status>() {
                Ok(Status::Open) => counts.open += count,
                Ok(Status::InProgress) => counts.in_progress += count,
                Ok(Status::Closed) => counts.closed += count,
                Err(e) => tracing::warn!("Skipping {} tickets: {}", count, e),
            }
        }
        Ok(counts)
    }

    fn distribution(&self, group: GroupColumn, range: &DateRange) -> Result<BTreeMap<String, u64>> {
        let mut out = BTreeMap::new();
        for (key, count) in self.store.count_tickets_by(group, &range.from(), &range.until())? {
            let key = match group {
                GroupColumn::Priority => key.to_lowercase(),
                _ => key,
            };
            *out.entry(key).or_insert(0) += count;
        }
        Ok(out)
    }

    pub fn ticket_analytics(&self, range: &DateRange) -> Result<TicketAnalytics> {
        let (from, until) = (range.from(), range.until());
        let statuses = self.status_counts(range)?;

        Ok(TicketAnalytics {
            total_tickets: self.store.count_tickets_between(&from, &until)?,
            closed_tickets: statuses.closed,
            open_tickets: statuses.open,
            in_progress_tickets: statuses.in_progress,
            priority_distribution: self.distribution(GroupColumn::Priority, range)?,
            type_distribution: self.distribution(GroupColumn::Type, range)?,
            ticket_details: self.store.tickets_created_between(&from, &until)?,
        })
    }

    pub fn dashboard_analytics(&self, range: &DateRange) -> Result<DashboardAnalytics> {
        let total_days = range.total_days();
        if total_days <= 0 {
            return Err(ApiError::validation("End date must not be before start date."));
        }

        let (from, until) = (range.from(), range.until());
        let total_tickets = self.store.count_tickets_between(&from, &until)?;
        let average_customer_spending = self
            .store
            .average_price_between(&from, &until)?
            .map(round2)
            .unwrap_or(0.0);
        let statuses = self.status_counts(range)?;

        let priorities = self.distribution(GroupColumn::Priority, range)?;
        let count_of = |key: &str| priorities.get(key).copied().unwrap_or(0);
        let (low, medium, high) = (count_of("low"), count_of("medium"), count_of("high"));

        Ok(DashboardAnalytics {
            total_tickets,
            total_days,
            closed_tickets: statuses.closed,
            open_tickets: statuses.open,
            in_progress_tickets: statuses.in_progress,
            average_customer_spending,
            average_tickets_booked_per_day: per_day(total_tickets, total_days),
            priority_distribution: PriorityBreakdown {
                low,
                average_low_tickets_booked_per_day: per_day(low, total_days),
                medium,
                average_medium_tickets_booked_per_day: per_day(medium, total_days),
                high,
                average_high_tickets_booked_per_day: per_day(high, total_days),
            },
            type_distribution: self.distribution(GroupColumn::Type, range)?,
        })
    }
}
