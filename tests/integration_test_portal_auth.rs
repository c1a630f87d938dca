mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{booking_payload, days_from_today, parse_body, TestApp};
use serde_json::json;

const LOGIN_MESSAGE: &str = "If an account with this email exists, a login link has been sent.";

fn token_from(html: &str) -> String {
    let start = html.find("token=").expect("login link in email") + "token=".len();
    html[start..].chars().take_while(|c| c.is_ascii_alphanumeric()).collect()
}

async fn book(app: &TestApp, email: &str, offset: i64) {
    let res = app.request(
        "POST",
        "/api/bookings",
        Some(booking_payload(email, "Standard", days_from_today(offset), days_from_today(offset + 1))),
    ).await;
    assert_eq!(res.status(), StatusCode::CREATED);
}

async fn request_link(app: &TestApp, email: &str) -> String {
    let res = app.request("POST", "/api/auth/login", Some(json!({ "email": email }))).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["message"], LOGIN_MESSAGE);

    let mail = app.email.sent_to(email);
    let last = mail.last().expect("login email");
    assert_eq!(last.subject, "Your Secure Login Link");
    token_from(&last.html_body)
}

#[tokio::test]
async fn unknown_email_gets_the_same_answer_and_no_token() {
    let app = TestApp::new().await;

    let res = app.request("POST", "/api/auth/login", Some(json!({ "email": "ghost@example.com" }))).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["message"], LOGIN_MESSAGE);
    assert_eq!(app.count("login_tokens").await, 0);
    assert!(app.email.sent_to("ghost@example.com").is_empty());
}

#[tokio::test]
async fn link_opens_the_portal_once() {
    let app = TestApp::new().await;
    book(&app, "jane@example.com", 20).await;
    book(&app, "jane@example.com", 50).await;

    let token = request_link(&app, "jane@example.com").await;
    assert_eq!(token.len(), 48);

    let stored: String = sqlx::query_scalar("SELECT token_hash FROM login_tokens")
        .fetch_one(&app.pool).await.unwrap();
    assert_ne!(stored, token);

    let res = app.request("GET", &format!("/api/auth/verify?token={}", token), None).await;
    assert_eq!(res.status(), StatusCode::OK);

    let body = parse_body(res).await;
    assert_eq!(body["customerName"], "Jane Doe");
    assert_eq!(body["customerEmail"], "jane@example.com");
    let bookings = body["bookings"].as_array().unwrap();
    assert_eq!(bookings.len(), 2);
    // newest event first
    assert!(bookings[0]["eventDate"].as_str().unwrap() > bookings[1]["eventDate"].as_str().unwrap());

    let res = app.request("GET", &format!("/api/auth/verify?token={}", token), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(res).await, json!({ "message": "Invalid or expired login link." }));
}

#[tokio::test]
async fn new_link_replaces_the_old_one() {
    let app = TestApp::new().await;
    book(&app, "jane@example.com", 20).await;

    let first = request_link(&app, "jane@example.com").await;
    let second = request_link(&app, "jane@example.com").await;
    assert_ne!(first, second);

    let res = app.request("GET", &format!("/api/auth/verify?token={}", first), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app.request("GET", &format!("/api/auth/verify?token={}", second), None).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn expired_link_is_rejected() {
    let app = TestApp::new().await;
    book(&app, "jane@example.com", 20).await;
    let token = request_link(&app, "jane@example.com").await;

    sqlx::query("UPDATE login_tokens SET expires_at = ?")
        .bind(Utc::now() - Duration::minutes(1))
        .execute(&app.pool).await.unwrap();

    let res = app.request("GET", &format!("/api/auth/verify?token={}", token), None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(res).await["message"], "Invalid or expired login link.");
}

#[tokio::test]
async fn missing_or_garbage_token_is_rejected() {
    let app = TestApp::new().await;

    for uri in ["/api/auth/verify", "/api/auth/verify?token=", "/api/auth/verify?token=abc123"] {
        let res = app.request("GET", uri, None).await;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "{}", uri);
    }
}

#[tokio::test]
async fn mail_outage_still_answers_generically() {
    let app = TestApp::new().await;
    book(&app, "jane@example.com", 20).await;
    app.email.set_failing(true);

    let res = app.request("POST", "/api/auth/login", Some(json!({ "email": "jane@example.com" }))).await;

    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await["message"], LOGIN_MESSAGE);
    assert_eq!(app.count("login_tokens").await, 1);
}
