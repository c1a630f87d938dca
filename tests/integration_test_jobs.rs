mod common;

use axum::http::StatusCode;
use common::{booking_payload, days_from_today, parse_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn jobs_require_the_admin_token() {
    let app = TestApp::new().await;

    let res = app.request("POST", "/api/jobs/run", None).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(parse_body(res).await, json!({ "error": "Unauthorized" }));

    let res = app.send("POST", "/api/jobs/run", None, Some("wrong-token")).await;
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    assert_eq!(app.count("notifications").await, 0);
}

#[tokio::test]
async fn sweep_queues_each_reminder_once() {
    let app = TestApp::new().await;
    app.seed_booking("week@example.com", "Standard", days_from_today(7), days_from_today(8)).await;
    app.seed_booking("tomorrow@example.com", "Deluxe", days_from_today(1), days_from_today(2)).await;
    app.seed_booking("past@example.com", "Standard", days_from_today(-4), days_from_today(-2)).await;
    app.seed_booking("later@example.com", "Standard", days_from_today(3), days_from_today(4)).await;

    let res = app.admin_request("POST", "/api/jobs/run", None).await;
    assert_eq!(res.status(), StatusCode::OK);
    assert_eq!(parse_body(res).await, json!({
        "sevenDayReminders": 1,
        "oneDayReminders": 1,
        "followUps": 1,
        "delivered": 3,
        "failed": 0
    }));

    assert_eq!(app.email.sent_to("week@example.com")[0].subject, "Reminder: Your Tent Rental is in 7 Days!");
    assert_eq!(app.email.sent_to("tomorrow@example.com")[0].subject, "Reminder: Your Tent Rental is Tomorrow!");
    let follow_up = &app.email.sent_to("past@example.com")[0];
    assert_eq!(follow_up.subject, "Thank You for Renting With Us!");
    assert!(follow_up.html_body.contains("THANKYOU10"));
    assert!(app.email.sent_to("later@example.com").is_empty());

    let res = app.admin_request("POST", "/api/jobs/run", None).await;
    assert_eq!(parse_body(res).await, json!({
        "sevenDayReminders": 0,
        "oneDayReminders": 0,
        "followUps": 0,
        "delivered": 0,
        "failed": 0
    }));
    assert_eq!(app.email.sent.lock().unwrap().len(), 3);
}

#[tokio::test]
async fn failing_reminders_are_retried_then_abandoned() {
    let app = TestApp::new().await;
    app.seed_booking("week@example.com", "Standard", days_from_today(7), days_from_today(8)).await;
    app.email.set_failing(true);

    for attempt in 1..=5 {
        let res = app.admin_request("POST", "/api/jobs/run", None).await;
        assert_eq!(res.status(), StatusCode::OK);
        let body = parse_body(res).await;
        assert_eq!(body["failed"], 1, "attempt {}", attempt);
    }

    let (status, attempts): (String, i32) = sqlx::query_as("SELECT status, attempts FROM notifications WHERE kind = 'REMINDER_7D'")
        .fetch_one(&app.pool).await.unwrap();
    assert_eq!((status.as_str(), attempts), ("FAILED", 5));

    app.email.set_failing(false);
    let res = app.admin_request("POST", "/api/jobs/run", None).await;
    let body = parse_body(res).await;
    assert_eq!(body["delivered"], 0);
    assert_eq!(body["failed"], 0);
    assert!(app.email.sent_to("week@example.com").is_empty());
}

#[tokio::test]
async fn undelivered_confirmation_goes_out_on_next_run() {
    let app = TestApp::new().await;
    app.email.set_failing(true);

    let res = app.request(
        "POST",
        "/api/bookings",
        Some(booking_payload("jane@example.com", "Standard", days_from_today(30), days_from_today(31))),
    ).await;
    assert_eq!(res.status(), StatusCode::CREATED);
    assert!(app.email.sent_to("jane@example.com").is_empty());

    app.email.set_failing(false);
    let res = app.admin_request("POST", "/api/jobs/run", None).await;
    assert_eq!(parse_body(res).await["delivered"], 1);

    let mail = app.email.sent_to("jane@example.com");
    assert_eq!(mail.len(), 1);
    assert_eq!(mail[0].subject, "Your Tent Rental is Confirmed!");

    let status: String = sqlx::query_scalar("SELECT status FROM notifications WHERE kind = 'CONFIRMATION'")
        .fetch_one(&app.pool).await.unwrap();
    assert_eq!(status, "SENT");
}

#[tokio::test]
async fn cancelled_bookings_get_no_reminders() {
    let app = TestApp::new().await;
    let booking = app.seed_booking("week@example.com", "Standard", days_from_today(7), days_from_today(8)).await;

    sqlx::query("UPDATE bookings SET status = 'Cancelled' WHERE id = ?")
        .bind(&booking.id)
        .execute(&app.pool).await.unwrap();

    let res = app.admin_request("POST", "/api/jobs/run", None).await;
    assert_eq!(parse_body(res).await["sevenDayReminders"], 0);
}
