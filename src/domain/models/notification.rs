use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

pub const STATUS_PENDING: &str = "PENDING";
pub const STATUS_SENT: &str = "SENT";
pub const STATUS_FAILED: &str = "FAILED";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Confirmation,
    SevenDayReminder,
    OneDayReminder,
    FollowUp,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "CONFIRMATION",
            NotificationKind::SevenDayReminder => "REMINDER_7D",
            NotificationKind::OneDayReminder => "REMINDER_1D",
            NotificationKind::FollowUp => "FOLLOW_UP",
        }
    }

    pub fn template(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "booking_confirmation.html",
            NotificationKind::SevenDayReminder => "reminder_7d.html",
            NotificationKind::OneDayReminder => "reminder_1d.html",
            NotificationKind::FollowUp => "follow_up.html",
        }
    }

    pub fn subject(&self) -> &'static str {
        match self {
            NotificationKind::Confirmation => "Your Tent Rental is Confirmed!",
            NotificationKind::SevenDayReminder => "Reminder: Your Tent Rental is in 7 Days!",
            NotificationKind::OneDayReminder => "Reminder: Your Tent Rental is Tomorrow!",
            NotificationKind::FollowUp => "Thank You for Renting With Us!",
        }
    }
}

/// Outbox row. A booking's customer-facing emails are written here first and delivered afterwards,
/// so a mail outage never undoes an accepted booking.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Notification {
    pub id: String,
    pub booking_id: Option<String>,
    pub kind: String,
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
    pub status: String,
    pub attempts: i32,
    pub last_error: Option<String>,
    pub dedupe_key: String,
    pub created_at: DateTime<Utc>,
    pub sent_at: Option<DateTime<Utc>>,
}

impl Notification {
    pub fn new(kind: NotificationKind, booking_id: &str, recipient: String, html_body: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            booking_id: Some(booking_id.to_string()),
            kind: kind.as_str().to_string(),
            recipient,
            subject: kind.subject().to_string(),
            html_body,
            status: STATUS_PENDING.to_string(),
            attempts: 0,
            last_error: None,
            dedupe_key: format!("{}:{}", kind.as_str(), booking_id),
            created_at: Utc::now(),
            sent_at: None,
        }
    }
}
