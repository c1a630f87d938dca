#![allow(dead_code)]

use tent_rental_backend::{
    api::router::create_router,
    state::AppState,
    config::Config,
    domain::{
        models::{
            address::Address,
            booking::{Booking, NewBookingParams},
            customer::Customer,
            geo::Coordinates,
            notification::{Notification, NotificationKind},
            quote::Quote,
        },
        ports::{
            BookingRepository, CustomerRepository, CustomerWrite, EmailService, GeocodingClient,
            NotificationRepository, PaymentAuthorization, PaymentGateway, PaymentRequest,
        },
    },
    error::AppError,
    infra::{
        factory::{assemble_state, load_templates, Gateways, Repositories},
        repositories::{
            sqlite_booking_repo::SqliteBookingRepo,
            sqlite_customer_repo::SqliteCustomerRepo,
            sqlite_notification_repo::SqliteNotificationRepo,
        },
    },
};
use sqlx::{sqlite::{SqliteConnectOptions, SqlitePoolOptions}, Pool, Sqlite};
use std::sync::{Arc, Mutex};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use uuid::Uuid;
use axum::{
    body::Body,
    http::{Request, header},
    response::Response,
    Router,
};
use chrono::{Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use std::str::FromStr;
use async_trait::async_trait;
use tower::ServiceExt;
use serde_json::Value;

pub const ADMIN_TOKEN: &str = "test-admin-token";
pub const ADMIN_EMAIL: &str = "owner@example.com";
pub const ORIGIN: Coordinates = Coordinates { latitude: 40.101, longitude: -87.105 };
pub const INDIANAPOLIS: Coordinates = Coordinates { latitude: 39.9612, longitude: -86.1581 };

#[derive(Debug, Clone)]
pub struct SentEmail {
    pub recipient: String,
    pub subject: String,
    pub html_body: String,
}

#[derive(Default)]
pub struct RecordingEmailService {
    pub sent: Mutex<Vec<SentEmail>>,
    pub failing: AtomicBool,
}

impl RecordingEmailService {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn sent_to(&self, recipient: &str) -> Vec<SentEmail> {
        self.sent.lock().unwrap().iter().filter(|m| m.recipient == recipient).cloned().collect()
    }
}

#[async_trait]
impl EmailService for RecordingEmailService {
    async fn send(&self, recipient: &str, subject: &str, html_body: &str) -> Result<(), AppError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(AppError::Dependency("mail relay unavailable".into()));
        }
        self.sent.lock().unwrap().push(SentEmail {
            recipient: recipient.to_string(),
            subject: subject.to_string(),
            html_body: html_body.to_string(),
        });
        Ok(())
    }
}

/// Addresses mentioning Indianapolis resolve there, "Nowhere" fails, everything else sits on the yard.
pub struct FakeGeocoder;

#[async_trait]
impl GeocodingClient for FakeGeocoder {
    async fn geocode(&self, address: &str) -> Result<Coordinates, AppError> {
        if address.contains("Nowhere") {
            return Err(AppError::Dependency("ZERO_RESULTS".into()));
        }
        if address.contains("Indianapolis") {
            return Ok(INDIANAPOLIS);
        }
        Ok(ORIGIN)
    }
}

#[derive(Default)]
pub struct MockPaymentGateway {
    pub authorized: Mutex<Vec<PaymentRequest>>,
    pub voided: Mutex<Vec<String>>,
    pub declining: AtomicBool,
    counter: AtomicUsize,
}

impl MockPaymentGateway {
    pub fn set_declining(&self, declining: bool) {
        self.declining.store(declining, Ordering::SeqCst);
    }

    pub fn authorized_count(&self) -> usize {
        self.authorized.lock().unwrap().len()
    }
}

#[async_trait]
impl PaymentGateway for MockPaymentGateway {
    async fn authorize(&self, request: &PaymentRequest) -> Result<PaymentAuthorization, AppError> {
        if self.declining.load(Ordering::SeqCst) {
            return Err(AppError::Payment("card_declined".into()));
        }
        self.authorized.lock().unwrap().push(request.clone());
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(PaymentAuthorization {
            payment_intent_id: format!("pi_test_{}", n),
            status: "succeeded".into(),
        })
    }

    async fn void(&self, payment_intent_id: &str) -> Result<(), AppError> {
        self.voided.lock().unwrap().push(payment_intent_id.to_string());
        Ok(())
    }
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
    pub email: Arc<RecordingEmailService>,
    pub payments: Arc<MockPaymentGateway>,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_repositories(|repos| repos).await
    }

    /// Builds the app with the SQLite repositories passed through `customize` first,
    /// so a test can wrap one of them.
    pub async fn with_repositories(customize: impl FnOnce(Repositories) -> Repositories) -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true);

        let pool = SqlitePoolOptions::new()
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            mail_service_url: "http://localhost".to_string(),
            mail_service_token: "token".to_string(),
            stripe_secret_key: "sk_test".to_string(),
            stripe_api_base: "http://localhost".to_string(),
            payment_currency: "usd".to_string(),
            google_maps_api_key: "maps-key".to_string(),
            geocoding_api_base: "http://localhost".to_string(),
            delivery_origin_address: "Darlington, IN 47940".to_string(),
            allowed_origins: vec!["http://localhost:5173".to_string()],
            admin_email: Some(ADMIN_EMAIL.to_string()),
            frontend_base_url: "http://localhost:5173".to_string(),
            admin_api_token: Some(ADMIN_TOKEN.to_string()),
            http_client_timeout_secs: 5,
        };

        let email = Arc::new(RecordingEmailService::default());
        let payments = Arc::new(MockPaymentGateway::default());

        let gateways = Gateways {
            email: email.clone(),
            geocoder: Arc::new(FakeGeocoder),
            payments: payments.clone(),
        };

        let templates = Arc::new(load_templates().expect("templates"));
        let state = Arc::new(assemble_state(&config, customize(Repositories::sqlite(pool.clone())), gateways, templates));
        let router = create_router(state.clone());

        Self { router, pool, db_filename, state, email, payments }
    }

    pub async fn request(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
        self.send(method, uri, body, None).await
    }

    pub async fn admin_request(&self, method: &str, uri: &str, body: Option<Value>) -> Response {
        self.send(method, uri, body, Some(ADMIN_TOKEN)).await
    }

    pub async fn send(&self, method: &str, uri: &str, body: Option<Value>, bearer: Option<&str>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = bearer {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };
        self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap()
    }

    pub async fn count(&self, table: &str) -> i64 {
        sqlx::query_scalar::<_, i64>(&format!("SELECT COUNT(*) FROM {}", table))
            .fetch_one(&self.pool).await.unwrap()
    }

    /// Writes a Confirmed booking straight to the database, bypassing payment and date validation.
    /// Its confirmation row is marked sent so it does not show up in later dispatches.
    pub async fn seed_booking(&self, email: &str, tent_type: &str, start: NaiveDate, end: NaiveDate) -> Booking {
        let customers = SqliteCustomerRepo::new(self.pool.clone());
        let address = Address::new("1 Field Rd", "Darlington", "IN", "47940");

        let (customer, write) = match customers.find_by_email(email).await.unwrap() {
            Some(c) => (c, CustomerWrite::Unchanged),
            None => (Customer::new("Seed Customer", email.to_string(), &address), CustomerWrite::Insert),
        };

        let quote = Quote {
            rental_days: 2,
            rental_fee: Decimal::new(40000, 2),
            delivery_fee: Decimal::new(500, 2),
            security_deposit: Decimal::new(10000, 2),
            total_price: Decimal::new(50500, 2),
        };
        let booking = Booking::new(NewBookingParams {
            customer_id: customer.id.clone(),
            tent_type: tent_type.to_string(),
            event_date: start,
            event_end_date: end,
            event_address: &address,
            quote: &quote,
            payment_intent_id: "pi_seed".to_string(),
            special_requests: None,
        }).unwrap();

        let confirmation = Notification::new(NotificationKind::Confirmation, &booking.id, email.to_string(), "<p>seed</p>".into());
        let saved = SqliteBookingRepo::new(self.pool.clone()).create_confirmed(&customer, write, &booking, &confirmation).await.unwrap();
        SqliteNotificationRepo::new(self.pool.clone()).mark_sent(&confirmation.id).await.unwrap();
        saved
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
    }
}

pub async fn parse_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn today() -> NaiveDate {
    Utc::now().date_naive()
}

pub fn days_from_today(days: i64) -> NaiveDate {
    if days >= 0 {
        today().checked_add_days(Days::new(days as u64)).unwrap()
    } else {
        today().checked_sub_days(Days::new(days.unsigned_abs())).unwrap()
    }
}

pub fn ymd(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn booking_payload(email: &str, tent_type: &str, start: NaiveDate, end: NaiveDate) -> Value {
    serde_json::json!({
        "customerName": "Jane Doe",
        "customerEmail": email,
        "address": "1 Field Rd",
        "city": "Darlington",
        "state": "IN",
        "zipCode": "47940",
        "eventDate": ymd(start),
        "eventEndDate": ymd(end),
        "tentType": tent_type,
        "specialRequests": "Please set up near the barn",
        "paymentMethodId": "pm_card_visa"
    })
}
