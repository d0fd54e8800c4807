use chrono::{DateTime, Utc};
use serde::Serialize;

/// A logged API request. Bodies and bearer tokens are never recorded.
#[derive(Debug, Clone, Serialize)]
pub struct RequestLogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    /// Set when the request carried a verifiable token
    pub user_id: Option<i64>,
    pub method: String,
    pub path: String,
    pub ip_addr: Option<String>,
    pub user_agent: Option<String>,
    pub referer: Option<String>,
    pub status: u16,
    pub latency_ms: u64,
}

impl RequestLogEntry {
    pub fn new(method: String, path: String) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            user_id: None,
            method,
            path,
            ip_addr: None,
            user_agent: None,
            referer: None,
            status: 0,
            latency_ms: 0,
        }
    }
}
