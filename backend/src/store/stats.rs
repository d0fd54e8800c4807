use chrono::{DateTime, Utc};
use rusqlite::params;

use super::{format_ts, Store, StoreError};

/// Ticket columns that analytics may group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GroupColumn {
    Status,
    Priority,
    Type,
}

impl GroupColumn {
    fn column(&self) -> &'static str {
        match self {
            GroupColumn::Status => "status",
            GroupColumn::Priority => "priority",
            GroupColumn::Type => "type",
        }
    }
}

impl Store {
    pub fn count_tickets_between(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<u64, StoreError> {
        let conn = self.conn()?;
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM tickets WHERE created_at BETWEEN ?1 AND ?2",
            params![format_ts(start), format_ts(end)],
            |row| row.get(0),
        )?;
        Ok(count as u64)
    }

    /// `(value, count)` pairs for one column, ordered by value.
    pub fn count_tickets_by(
        &self,
        group: GroupColumn,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<(String, u64)>, StoreError> {
        let column = group.column();
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {column}, COUNT(*) FROM tickets
             WHERE created_at BETWEEN ?1 AND ?2
             GROUP BY {column}
             ORDER BY {column}"
        ))?;

        let rows = stmt
            .query_map(params![format_ts(start), format_ts(end)], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as u64))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    /// Mean ticket price in the range, `None` when no tickets match.
    pub fn average_price_between(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Option<f64>, StoreError> {
        let conn = self.conn()?;
        let avg: Option<f64> = conn.query_row(
            "SELECT AVG(price) FROM tickets WHERE created_at BETWEEN ?1 AND ?2",
            params![format_ts(start), format_ts(end)],
            |row| row.get(0),
        )?;
        Ok(avg)
    }
}
