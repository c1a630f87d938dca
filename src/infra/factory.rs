use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::info;
use tracing::log::LevelFilter;
use tera::Tera;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{
    BlockoutRepository, BookingRepository, CustomerRepository, EmailService, GeocodingClient,
    LoginTokenRepository, NotificationRepository, PaymentGateway,
};
use crate::domain::services::{
    availability::AvailabilityIndex,
    booking_service::{BookingService, BookingSettings},
    delivery_fee::DeliveryFeeEstimator,
    login_service::LoginService,
    notification_service::NotificationService,
    quote::QuoteCalculator,
    reminders::ReminderSweep,
};
use crate::infra::email::http_email_service::HttpEmailService;
use crate::infra::geocoding::google_maps_client::GoogleMapsClient;
use crate::infra::payment::stripe_gateway::StripeGateway;
use crate::infra::repositories::{
    postgres_blockout_repo::PostgresBlockoutRepo, postgres_booking_repo::PostgresBookingRepo,
    postgres_customer_repo::PostgresCustomerRepo, postgres_login_token_repo::PostgresLoginTokenRepo,
    postgres_notification_repo::PostgresNotificationRepo,
    sqlite_blockout_repo::SqliteBlockoutRepo, sqlite_booking_repo::SqliteBookingRepo,
    sqlite_customer_repo::SqliteCustomerRepo, sqlite_login_token_repo::SqliteLoginTokenRepo,
    sqlite_notification_repo::SqliteNotificationRepo,
};

pub struct Repositories {
    pub customers: Arc<dyn CustomerRepository>,
    pub bookings: Arc<dyn BookingRepository>,
    pub login_tokens: Arc<dyn LoginTokenRepository>,
    pub blockouts: Arc<dyn BlockoutRepository>,
    pub notifications: Arc<dyn NotificationRepository>,
}

impl Repositories {
    pub fn postgres(pool: PgPool) -> Self {
        Self {
            customers: Arc::new(PostgresCustomerRepo::new(pool.clone())),
            bookings: Arc::new(PostgresBookingRepo::new(pool.clone())),
            login_tokens: Arc::new(PostgresLoginTokenRepo::new(pool.clone())),
            blockouts: Arc::new(PostgresBlockoutRepo::new(pool.clone())),
            notifications: Arc::new(PostgresNotificationRepo::new(pool)),
        }
    }

    pub fn sqlite(pool: SqlitePool) -> Self {
        Self {
            customers: Arc::new(SqliteCustomerRepo::new(pool.clone())),
            bookings: Arc::new(SqliteBookingRepo::new(pool.clone())),
            login_tokens: Arc::new(SqliteLoginTokenRepo::new(pool.clone())),
            blockouts: Arc::new(SqliteBlockoutRepo::new(pool.clone())),
            notifications: Arc::new(SqliteNotificationRepo::new(pool)),
        }
    }
}

/// Outbound collaborators. Swapped for in-memory fakes in tests.
pub struct Gateways {
    pub email: Arc<dyn EmailService>,
    pub geocoder: Arc<dyn GeocodingClient>,
    pub payments: Arc<dyn PaymentGateway>,
}

pub fn load_templates() -> Result<Tera, tera::Error> {
    let mut tera = Tera::default();
    tera.add_raw_templates(vec![
        ("booking_confirmation.html", include_str!("../templates/booking_confirmation.html")),
        ("admin_new_booking.html", include_str!("../templates/admin_new_booking.html")),
        ("login_link.html", include_str!("../templates/login_link.html")),
        ("reminder_7d.html", include_str!("../templates/reminder_7d.html")),
        ("reminder_1d.html", include_str!("../templates/reminder_1d.html")),
        ("follow_up.html", include_str!("../templates/follow_up.html")),
    ])?;
    Ok(tera)
}

/// Wires services on top of already-built repositories and gateways.
pub fn assemble_state(config: &Config, repos: Repositories, gateways: Gateways, templates: Arc<Tera>) -> AppState {
    let delivery_fees = Arc::new(DeliveryFeeEstimator::new(
        gateways.geocoder.clone(),
        config.delivery_origin_address.clone(),
    ));
    let quotes = Arc::new(QuoteCalculator::new(delivery_fees.clone()));
    let availability = Arc::new(AvailabilityIndex::new(repos.bookings.clone(), repos.blockouts.clone()));
    let notifications = Arc::new(NotificationService::new(
        repos.notifications.clone(),
        gateways.email.clone(),
        templates,
        config.frontend_base_url.clone(),
    ));

    let booking_service = Arc::new(BookingService::new(
        repos.customers.clone(),
        repos.bookings.clone(),
        availability.clone(),
        quotes.clone(),
        gateways.payments.clone(),
        notifications.clone(),
        BookingSettings {
            currency: config.payment_currency.clone(),
            admin_email: config.admin_email.clone(),
            frontend_base_url: config.frontend_base_url.clone(),
        },
    ));

    let login_service = Arc::new(LoginService::new(
        repos.customers.clone(),
        repos.bookings.clone(),
        repos.login_tokens.clone(),
        notifications.clone(),
        config.frontend_base_url.clone(),
    ));

    let reminder_sweep = Arc::new(ReminderSweep::new(
        repos.bookings.clone(),
        repos.customers.clone(),
        notifications,
    ));

    AppState {
        config: config.clone(),
        blockout_repo: repos.blockouts,
        availability,
        delivery_fees,
        quotes,
        booking_service,
        login_service,
        reminder_sweep,
    }
}

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let http_client = reqwest::Client::builder()
        .timeout(Duration::from_secs(config.http_client_timeout_secs))
        .build()
        .expect("Failed to build HTTP client");

    let frontend_base_url = config.frontend_base_url.trim_end_matches('/');
    let gateways = Gateways {
        email: Arc::new(HttpEmailService::new(
            http_client.clone(),
            config.mail_service_url.clone(),
            config.mail_service_token.clone(),
        )),
        geocoder: Arc::new(GoogleMapsClient::new(
            http_client.clone(),
            config.geocoding_api_base.clone(),
            config.google_maps_api_key.clone(),
        )),
        payments: Arc::new(StripeGateway::new(
            http_client,
            config.stripe_api_base.clone(),
            config.stripe_secret_key.clone(),
            format!("{}/booking/confirmation", frontend_base_url),
        )),
    };

    let templates = Arc::new(load_templates().expect("Failed to load email templates"));

    let repos = if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
        info!("Initializing PostgreSQL connection...");

        let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
        opts = opts.log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect_with(opts)
            .await
            .expect("Failed to connect to Postgres");

        run_postgres_migrations(&pool).await;
        Repositories::postgres(pool)
    } else {
        info!("Initializing SQLite connection with WAL Mode...");

        let opts = SqliteConnectOptions::from_str(database_url)
            .expect("Invalid SQLite connection string")
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(Duration::from_secs(5))
            .log_statements(LevelFilter::Debug)
            .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

        let pool = SqlitePoolOptions::new()
            .max_connections(5)
            .connect_with(opts)
            .await
            .expect("Failed to connect to SQLite");

        run_sqlite_migrations(&pool).await;
        Repositories::sqlite(pool)
    };

    assemble_state(config, repos, gateways, templates)
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_templates_parse() {
        let tera = load_templates().unwrap();
        for name in [
            "booking_confirmation.html",
            "admin_new_booking.html",
            "login_link.html",
            "reminder_7d.html",
            "reminder_1d.html",
            "follow_up.html",
        ] {
            assert!(tera.get_template_names().any(|n| n == name), "missing {}", name);
        }
    }
}
