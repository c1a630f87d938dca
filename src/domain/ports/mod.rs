use crate::domain::models::{
    blockout::BlockoutDate, booking::Booking, customer::Customer, geo::Coordinates,
    login_token::LoginToken, notification::Notification,
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};

#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn find_by_id(&self, id: &str) -> Result<Option<Customer>, AppError>;
    /// Exact, case-sensitive match.
    async fn find_by_email(&self, email: &str) -> Result<Option<Customer>, AppError>;
}

/// What committing a booking does to its customer row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CustomerWrite {
    Insert,
    UpdateContact,
    Unchanged,
}

#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Writes the customer, a Confirmed booking and its confirmation outbox row in one transaction.
    /// The booking insert is conditional on no other Confirmed booking of the same tent type
    /// overlapping; otherwise nothing is written and the result is `AppError::Conflict`.
    async fn create_confirmed(
        &self,
        customer: &Customer,
        customer_write: CustomerWrite,
        booking: &Booking,
        confirmation: &Notification,
    ) -> Result<Booking, AppError>;
    /// Confirmed bookings with `event_date < range_end` and `event_end_date + 1 > range_start`.
    async fn list_confirmed_overlapping(&self, tent_type: &str, range_start: NaiveDate, range_end: NaiveDate) -> Result<Vec<Booking>, AppError>;
    /// Most recent event first.
    async fn list_by_customer(&self, customer_id: &str) -> Result<Vec<Booking>, AppError>;
    async fn list_confirmed_starting_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
    async fn list_confirmed_ending_on(&self, date: NaiveDate) -> Result<Vec<Booking>, AppError>;
}

#[async_trait]
pub trait LoginTokenRepository: Send + Sync {
    /// Marks every unused token of the customer as used and inserts `token`, atomically.
    async fn replace_active(&self, token: &LoginToken) -> Result<(), AppError>;
    async fn list_active(&self, now: DateTime<Utc>) -> Result<Vec<LoginToken>, AppError>;
    /// Flips `is_used`. Returns false if another caller got there first.
    async fn redeem(&self, id: &str) -> Result<bool, AppError>;
}

#[async_trait]
pub trait BlockoutRepository: Send + Sync {
    async fn upsert(&self, blockout: &BlockoutDate) -> Result<BlockoutDate, AppError>;
    /// Blockouts with `range_start <= date < range_end`.
    async fn list_by_range(&self, tent_type: &str, range_start: NaiveDate, range_end: NaiveDate) -> Result<Vec<BlockoutDate>, AppError>;
    async fn delete(&self, tent_type: &str, date: NaiveDate) -> Result<(), AppError>;
}

#[async_trait]
pub trait NotificationRepository: Send + Sync {
    /// Returns false when a row with the same dedupe key already exists.
    async fn enqueue(&self, notification: &Notification) -> Result<bool, AppError>;
    async fn list_pending(&self, limit: i64) -> Result<Vec<Notification>, AppError>;
    async fn mark_sent(&self, id: &str) -> Result<(), AppError>;
    /// Bumps the attempt counter; the row turns FAILED once `max_attempts` is reached.
    async fn record_failure(&self, id: &str, error_message: &str, max_attempts: i32) -> Result<(), AppError>;
}

#[async_trait]
pub trait EmailService: Send + Sync {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError>;
}

#[async_trait]
pub trait GeocodingClient: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<Coordinates, AppError>;
}

#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub amount_minor: i64,
    pub currency: String,
    pub payment_method_id: String,
    pub description: String,
}

#[derive(Debug, Clone)]
pub struct PaymentAuthorization {
    pub payment_intent_id: String,
    pub status: String,
}

#[async_trait]
pub trait PaymentGateway: Send + Sync {
    async fn authorize(&self, request: &PaymentRequest) -> Result<PaymentAuthorization, AppError>;
    /// Gives the money back for an intent whose booking could not be persisted.
    async fn void(&self, payment_intent_id: &str) -> Result<(), AppError>;
}
