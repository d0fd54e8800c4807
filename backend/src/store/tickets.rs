use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, OptionalExtension, Row};
use ticketdesk_common::{AssignedUser, Priority, Status, Ticket};

use super::{format_ts, parse_ts, Store, StoreError};
use crate::models::ticket::NewTicket;

const TICKET_COLUMNS: &str = "ticket_id, title, description, type, venue, status, price, priority, \
     due_date, created_by, assigned_users, version, created_at, updated_at";

fn conversion_error<E>(idx: usize, err: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_to_ticket(row: &Row<'_>) -> rusqlite::Result<Ticket> {
    let status: String = row.get(5)?;
    let priority: String = row.get(7)?;
    let due_date: String = row.get(8)?;
    let assigned: String = row.get(10)?;
    let created_at: String = row.get(12)?;
    let updated_at: String = row.get(13)?;

    Ok(Ticket {
        ticket_id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        ticket_type: row.get(3)?,
        venue: row.get(4)?,
        status: status.parse::<Status>().map_err(|e| conversion_error(5, e))?,
        price: row.get(6)?,
        priority: priority.parse::<Priority>().map_err(|e| conversion_error(7, e))?,
        due_date: parse_ts(8, &due_date)?,
        created_by: row.get(9)?,
        assigned_users: serde_json::from_str::<Vec<AssignedUser>>(&assigned)
            .map_err(|e| conversion_error(10, e))?,
        version: row.get(11)?,
        created_at: parse_ts(12, &created_at)?,
        updated_at: parse_ts(13, &updated_at)?,
    })
}

impl Store {
    /// Insert a ticket with an empty assignment list and return it as stored.
    pub fn insert_ticket(&self, new_ticket: &NewTicket) -> Result<Ticket, StoreError> {
        let conn = self.conn()?;
        let created_at = format_ts(&new_ticket.created_at);

        conn.execute(
            "INSERT INTO tickets (title, description, type, venue, status, price, priority,
                                  due_date, created_by, assigned_users, version, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, '[]', 0, ?10, ?10)",
            params![
                new_ticket.title,
                new_ticket.description,
                new_ticket.ticket_type,
                new_ticket.venue,
                new_ticket.status.as_str(),
                new_ticket.price,
                new_ticket.priority.as_str(),
                format_ts(&new_ticket.due_date),
                new_ticket.created_by,
                created_at,
            ],
        )?;

        let ticket_id = conn.last_insert_rowid();
        let ticket = conn.query_row(
            &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
            params![ticket_id],
            row_to_ticket,
        )?;

        tracing::debug!("Inserted ticket {}", ticket_id);
        Ok(ticket)
    }

    pub fn find_ticket(&self, ticket_id: i64) -> Result<Option<Ticket>, StoreError> {
        let conn = self.conn()?;
        let ticket = conn
            .query_row(
                &format!("SELECT {TICKET_COLUMNS} FROM tickets WHERE ticket_id = ?1"),
                params![ticket_id],
                row_to_ticket,
            )
            .optional()?;
        Ok(ticket)
    }

    /// Replace a ticket's assignment list if its version is still `expected_version`.
    ///
    /// A concurrent writer that got there first leaves zero matching rows, which
    /// is reported as [`StoreError::Conflict`] and nothing is written.
    pub fn update_assigned_users(
        &self,
        ticket_id: i64,
        expected_version: i64,
        assigned_users: &[AssignedUser],
        at: &DateTime<Utc>,
    ) -> Result<(), StoreError> {
        let assigned = serde_json::to_string(assigned_users)?;
        let conn = self.conn()?;

        let changed = conn.execute(
            "UPDATE tickets
             SET assigned_users = ?1, version = version + 1, updated_at = ?2
             WHERE ticket_id = ?3 AND version = ?4",
            params![assigned, format_ts(at), ticket_id, expected_version],
        )?;

        if changed == 0 {
            return Err(StoreError::Conflict(
                "Ticket was modified concurrently; retry the assignment".to_string(),
            ));
        }
        Ok(())
    }

    /// Tickets created within `[start, end]`, oldest first.
    pub fn tickets_created_between(
        &self,
        start: &DateTime<Utc>,
        end: &DateTime<Utc>,
    ) -> Result<Vec<Ticket>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {TICKET_COLUMNS} FROM tickets
             WHERE created_at BETWEEN ?1 AND ?2
             ORDER BY created_at, ticket_id"
        ))?;

        let tickets = stmt
            .query_map(params![format_ts(start), format_ts(end)], row_to_ticket)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(tickets)
    }
}
