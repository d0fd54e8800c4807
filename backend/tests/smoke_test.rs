use std::sync::Arc;

use bytes::Bytes;
use chrono::{Duration, SecondsFormat, Utc};
use http::StatusCode;
use serde_json::{json, Value};
use tower::ServiceExt;

use ticketdesk_backend::test_util::{bearer, create_test_state, seed_user, token_for, TEST_PASSWORD};
use ticketdesk_backend::{app, AppState};
use ticketdesk_common::Role;

async fn send(
    app: &axum::Router,
    method: http::Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut req_builder = http::Request::builder().method(method).uri(uri);

    if let Some(token) = token {
        req_builder = req_builder.header("Authorization", bearer(token));
    }
    if body.is_some() {
        req_builder = req_builder.header("Content-Type", "application/json");
    }

    let req = req_builder
        .body(match body {
            Some(b) => axum::body::Body::from(Bytes::from(b.to_string())),
            None => axum::body::Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, value)
}

fn ticket_body(created_by: i64) -> Value {
    json!({
        "title": "Jazz night",
        "description": "Balcony seats",
        "type": "music",
        "venue": "Blue Note",
        "status": "open",
        "price": 150.5,
        "priority": "medium",
        "dueDate": (Utc::now() + Duration::days(10)).to_rfc3339(),
        "createdBy": created_by,
    })
}

fn setup() -> (Arc<AppState>, axum::Router) {
    let state = create_test_state();
    let router = app(state.clone());
    (state, router)
}

#[tokio::test]
async fn test_health() {
    let (_, app) = setup();
    let (status, body) = send(&app, http::Method::GET, "/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_protected_routes_require_token() {
    let (_, app) = setup();

    for (method, uri) in [
        (http::Method::POST, "/api/ticket"),
        (http::Method::POST, "/api/tickets/1/assign"),
        (http::Method::GET, "/api/tickets/1"),
        (http::Method::GET, "/api/tickets/analytics?startDate=2024-01-01&endDate=2024-01-02"),
        (http::Method::GET, "/api/dashboard/analytics?startDate=2024-01-01&endDate=2024-01-02"),
    ] {
        let (status, body) = send(&app, method.clone(), uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
        assert_eq!(body["error"]["type"], "auth_error");

        let (status, _) = send(&app, method.clone(), uri, Some("not.a.jwt"), None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{method} {uri}");
    }
}

#[tokio::test]
async fn test_register_login_flow() {
    let (_, app) = setup();
    let registration = json!({
        "name": "Asha",
        "email": "asha@example.com",
        "password": TEST_PASSWORD,
        "type": "customer",
    });

    let (status, body) =
        send(&app, http::Method::POST, "/api/users", None, Some(registration.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["email"], "asha@example.com");
    assert!(body["userId"].as_i64().is_some());

    let (status, body) = send(&app, http::Method::POST, "/api/users", None, Some(registration)).await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["type"], "conflict");

    let (status, body) = send(
        &app,
        http::Method::POST,
        "/api/auth/login",
        None,
        Some(json!({"email": "asha@example.com", "password": TEST_PASSWORD})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap().to_string();

    let (status, _) = send(
        &app,
        http::Method::GET,
        "/api/tickets/analytics?startDate=2024-01-01&endDate=2024-01-02",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_weak_password_is_validation_error() {
    let (_, app) = setup();
    let (status, body) = send(
        &app,
        http::Method::POST,
        "/api/users",
        None,
        Some(json!({
            "name": "Asha",
            "email": "asha@example.com",
            "password": "Password!",
            "role": "customer",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_malformed_json_is_validation_error() {
    let (state, app) = setup();
    let user = seed_user(&state, "creator@example.com", Role::Customer);
    let token = token_for(&state, &user);

    let req = http::Request::builder()
        .method(http::Method::POST)
        .uri("/api/ticket")
        .header("Authorization", bearer(&token))
        .header("Content-Type", "application/json")
        .body(axum::body::Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_create_fetch_and_assign() {
    let (state, app) = setup();
    let creator = seed_user(&state, "creator@example.com", Role::Customer);
    let assignee = seed_user(&state, "assignee@example.com", Role::Customer);
    let admin = seed_user(&state, "admin@example.com", Role::Admin);
    let token = token_for(&state, &creator);

    let (status, created) =
        send(&app, http::Method::POST, "/api/ticket", Some(&token), Some(ticket_body(creator.id))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["type"], "music");
    assert_eq!(created["assignedUsers"], json!([]));
    assert!(created.get("version").is_none());
    let ticket_id = created["ticketId"].as_i64().unwrap();

    for method in [http::Method::GET, http::Method::POST] {
        let (status, body) =
            send(&app, method, &format!("/api/tickets/{ticket_id}"), Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["ticket"], created);
    }

    let assign_uri = format!("/api/tickets/{ticket_id}/assign");
    let (status, body) = send(
        &app,
        http::Method::POST,
        &assign_uri,
        Some(&token),
        Some(json!({"userId": assignee.id})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assignedUsers"][0]["userId"], assignee.id);

    let (status, body) = send(
        &app,
        http::Method::POST,
        &assign_uri,
        Some(&token),
        Some(json!({"userId": admin.id})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");

    let stranger = seed_user(&state, "stranger@example.com", Role::Customer);
    let other = seed_user(&state, "other@example.com", Role::Customer);
    let (status, body) = send(
        &app,
        http::Method::POST,
        &assign_uri,
        Some(&token_for(&state, &stranger)),
        Some(json!({"userId": other.id})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["type"], "authorization_error");
}

#[tokio::test]
async fn test_ticket_lookup_errors() {
    let (state, app) = setup();
    let user = seed_user(&state, "creator@example.com", Role::Customer);
    let token = token_for(&state, &user);

    let (status, body) = send(&app, http::Method::GET, "/api/tickets/999", Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["type"], "not_found");

    let (status, body) = send(&app, http::Method::GET, "/api/tickets/abc", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["type"], "validation_error");
}

#[tokio::test]
async fn test_analytics_on_empty_range() {
    let (state, app) = setup();
    let user = seed_user(&state, "viewer@example.com", Role::Admin);
    let token = token_for(&state, &user);

    let (status, body) = send(
        &app,
        http::Method::GET,
        "/api/dashboard/analytics?startDate=2024-01-01&endDate=2024-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalDays"], 1);
    assert_eq!(body["totalTickets"], 0);
    assert_eq!(body["averageCustomerSpending"], 0.0);
    assert_eq!(body["priorityDistribution"]["averageLowTicketsBookedPerDay"], 0.0);
    assert_eq!(body["typeDistribution"], json!({}));

    let (status, body) = send(
        &app,
        http::Method::GET,
        "/api/tickets/analytics?startDate=2024-01-01&endDate=2024-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTickets"], 0);
    assert_eq!(body["ticketDetails"], json!([]));

    let (status, _) = send(
        &app,
        http::Method::GET,
        "/api/dashboard/analytics?startDate=2024-01-01",
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_analytics_counts_created_ticket() {
    let (state, app) = setup();
    let creator = seed_user(&state, "creator@example.com", Role::Customer);
    let token = token_for(&state, &creator);
    send(&app, http::Method::POST, "/api/ticket", Some(&token), Some(ticket_body(creator.id))).await;

    let start = (Utc::now() - Duration::days(2)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let end = (Utc::now() + Duration::hours(1)).to_rfc3339_opts(SecondsFormat::Secs, true);
    let (status, body) = send(
        &app,
        http::Method::GET,
        &format!("/api/tickets/analytics?startDate={start}&endDate={end}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTickets"], 1);
    assert_eq!(body["openTickets"], 1);
    assert_eq!(body["priorityDistribution"]["medium"], 1);
}

#[tokio::test]
async fn test_request_log_records_each_request_without_token() {
    let (state, app) = setup();
    let user = seed_user(&state, "creator@example.com", Role::Customer);
    let token = token_for(&state, &user);

    send(&app, http::Method::GET, "/health", None, None).await;
    send(&app, http::Method::GET, "/api/tickets/1", Some(&token), None).await;
    send(&app, http::Method::GET, "/api/tickets/1", Some("garbage"), None).await;

    let logged = state.store.recent_requests(10).unwrap();
    assert_eq!(logged.len(), 3);

    let newest = &logged[0];
    assert_eq!(newest.user_id, None);
    assert_eq!(newest.status, 401);

    let authed = &logged[1];
    assert_eq!(authed.user_id, Some(user.id));
    assert_eq!(authed.path, "/api/tickets/1");
    assert_eq!(authed.status, 404);

    for entry in &logged {
        let row = serde_json::to_string(entry).unwrap();
        assert!(!row.contains(&token));
    }
}

#[tokio::test]
async fn test_numeric_fields_accept_strings() {
    let (state, app) = setup();
    let creator = seed_user(&state, "creator@example.com", Role::Customer);
    let assignee = seed_user(&state, "assignee@example.com", Role::Customer);
    let token = token_for(&state, &creator);

    let mut body = ticket_body(creator.id);
    body["createdBy"] = json!(creator.id.to_string());
    body["price"] = json!("150.5");
    let (status, created) = send(&app, http::Method::POST, "/api/ticket", Some(&token), Some(body)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["createdBy"], creator.id);
    assert_eq!(created["price"], 150.5);

    let ticket_id = created["ticketId"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        http::Method::POST,
        &format!("/api/tickets/{ticket_id}/assign"),
        Some(&token),
        Some(json!({"userId": assignee.id.to_string()})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["assignedUsers"][0]["userId"], assignee.id);
}
