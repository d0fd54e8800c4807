use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use crate::auth::token::bearer_token;
use crate::models::request::RequestLogEntry;
use crate::AppState;

fn header_string(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// First `X-Forwarded-For` hop, else the socket peer.
fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("x-forwarded-for")
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .map(str::trim)
        .filter(|v| !v.is_empty());

    if let Some(first) = forwarded {
        return Some(match first.parse::<IpAddr>() {
            Ok(ip) => canonical_ip(ip).to_string(),
            Err(_) => first.to_string(),
        });
    }
    peer.map(|addr| canonical_ip(addr.ip()).to_string())
}

/// `::ffff:a.b.c.d` becomes `a.b.c.d`.
fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => v6.to_ipv4_mapped().map(IpAddr::V4).unwrap_or(ip),
        v4 => v4,
    }
}

/// Logs every request at INFO and appends it to the request log.
///
/// The log write happens after the response is produced; its failure is
/// reported and otherwise ignored.
pub async fn request_logger(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let uri = request.uri().clone();
    let path = uri
        .path_and_query()
        .map(|pq| pq.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let headers = request.headers();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| *addr);

    let mut entry = RequestLogEntry::new(method.to_string(), path.clone());
    entry.user_id = bearer_token(headers)
        .and_then(|token| state.identity.tokens().verify(token).ok())
        .map(|claims| claims.user_id);
    entry.ip_addr = client_ip(headers, peer);
    entry.user_agent = header_string(headers, header::USER_AGENT);
    entry.referer = header_string(headers, header::REFERER);

    let response = next.run(request).await;

    let status = response.status();
    let duration = start.elapsed();

    tracing::info!(
        method = %method,
        path = %path,
        status = %status.as_u16(),
        duration_ms = %duration.as_millis(),
        "HTTP request"
    );

    entry.status = status.as_u16();
    entry.latency_ms = duration.as_millis() as u64;
    if let Err(e) = state.store.log_request(&entry) {
        tracing::warn!("Failed to record request {}: {}", entry.id, e);
    }

    response
}
