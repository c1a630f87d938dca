use std::env;

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub mail_service_url: String,
    pub mail_service_token: String,
    pub stripe_secret_key: String,
    pub stripe_api_base: String,
    pub payment_currency: String,
    pub google_maps_api_key: String,
    pub geocoding_api_base: String,
    pub delivery_origin_address: String,
    pub allowed_origins: Vec<String>,
    pub admin_email: Option<String>,
    pub frontend_base_url: String,
    pub admin_api_token: Option<String>,
    pub http_client_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            database_url: env::var("DATABASE_URL").expect("DATABASE_URL must be set"),
            port: env::var("PORT").unwrap_or_else(|_| "5000".to_string()).parse().expect("PORT must be a number"),
            mail_service_url: env::var("MAIL_SERVICE_URL").unwrap_or_else(|_| "http://localhost:8000/api/v1/send".to_string()),
            mail_service_token: env::var("MAIL_SERVICE_TOKEN").unwrap_or_else(|_| "dev-token".to_string()),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY").expect("STRIPE_SECRET_KEY must be set"),
            stripe_api_base: env::var("STRIPE_API_BASE").unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            payment_currency: env::var("PAYMENT_CURRENCY").unwrap_or_else(|_| "usd".to_string()),
            google_maps_api_key: env::var("GOOGLE_MAPS_API_KEY").expect("GOOGLE_MAPS_API_KEY must be set"),
            geocoding_api_base: env::var("GEOCODING_API_BASE").unwrap_or_else(|_| "https://maps.googleapis.com".to_string()),
            delivery_origin_address: env::var("DELIVERY_ORIGIN_ADDRESS").unwrap_or_else(|_| "Darlington, IN 47940".to_string()),
            allowed_origins: parse_list(&env::var("ALLOWED_ORIGINS").unwrap_or_else(|_| "http://localhost:5173".to_string())),
            admin_email: non_blank(env::var("ADMIN_EMAIL").ok()),
            frontend_base_url: env::var("FRONTEND_BASE_URL").unwrap_or_else(|_| "http://localhost:5173".to_string()),
            admin_api_token: non_blank(env::var("ADMIN_API_TOKEN").ok()),
            http_client_timeout_secs: env::var("HTTP_CLIENT_TIMEOUT_SECS").unwrap_or_else(|_| "15".to_string()).parse().expect("HTTP_CLIENT_TIMEOUT_SECS must be a number"),
        }
    }
}

fn parse_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
