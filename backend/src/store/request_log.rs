use rusqlite::params;

use super::{format_ts, parse_ts, Store, StoreError};
use crate::models::request::RequestLogEntry;

impl Store {
    /// Append one entry to the request log.
    pub fn log_request(&self, entry: &RequestLogEntry) -> Result<(), StoreError> {
        let conn = self.conn()?;

        conn.execute(
            "INSERT INTO request_logs (id, timestamp, user_id, method, path, ip_addr, user_agent, referer, status, latency_ms)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
            params![
                entry.id,
                format_ts(&entry.timestamp),
                entry.user_id,
                entry.method,
                entry.path,
                entry.ip_addr,
                entry.user_agent,
                entry.referer,
                entry.status,
                entry.latency_ms as i64,
            ],
        )?;

        tracing::debug!("Logged request: {}", entry.id);
        Ok(())
    }

    /// Most recent request log entries, newest first.
    pub fn recent_requests(&self, limit: u32) -> Result<Vec<RequestLogEntry>, StoreError> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(
            "SELECT id, timestamp, user_id, method, path, ip_addr, user_agent, referer, status, latency_ms
             FROM request_logs
             ORDER BY timestamp DESC, rowid DESC
             LIMIT ?1",
        )?;

        let entries = stmt
            .query_map(params![limit], |row| {
                let timestamp: String = row.get(1)?;
                Ok(RequestLogEntry {
                    id: row.get(0)?,
                    timestamp: parse_ts(1, &timestamp)?,
                    user_id: row.get(2)?,
                    method: row.get(3)?,
                    path: row.get(4)?,
                    ip_addr: row.get(5)?,
                    user_agent: row.get(6)?,
                    referer: row.get(7)?,
                    status: row.get(8)?,
                    latency_ms: row.get::<_, i64>(9)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(entries)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_and_read_back() {
        let store = Store::open(":memory:").unwrap();

        let mut first = RequestLogEntry::new("POST".to_string(), "/api/users".to_string());
        first.status = 201;
        first.ip_addr = Some("10.0.0.1".to_string());
        store.log_request(&first).unwrap();

        let mut second = RequestLogEntry::new("GET".to_string(), "/api/tickets/1".to_string());
        second.timestamp = first.timestamp + chrono::Duration::seconds(1);
        second.user_id = Some(3);
        second.status = 404;
        store.log_request(&second).unwrap();

        let entries = store.recent_requests(10).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].id, second.id);
        assert_eq!(entries[0].user_id, Some(3));
        assert_eq!(entries[0].status, 404);
        assert_eq!(entries[1].ip_addr.as_deref(), Some("10.0.0.1"));
    }

    #[test]
    fn test_recent_requests_respects_limit() {
        let store = Store::open(":memory:").unwrap();
        for _ in 0..3 {
            store
                .log_request(&RequestLogEntry::new("GET".to_string(), "/health".to_string()))
                .unwrap();
        }
        assert_eq!(store.recent_requests(2).unwrap().len(), 2);
    }
}
