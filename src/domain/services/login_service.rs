use std::sync::Arc;
use chrono::Utc;
use constant_time_eq::constant_time_eq;
use serde::Serialize;
use tera::Context;
use tracing::{info, warn};
use crate::domain::{
    models::{
        booking::Booking,
        customer::Customer,
        login_token::{hash_token, LoginToken, LOGIN_TOKEN_TTL_MINUTES},
    },
    ports::{BookingRepository, CustomerRepository, LoginTokenRepository},
    services::notification_service::NotificationService,
};
use crate::error::AppError;

/// Returned for every login request, whether or not the account exists.
pub const LOGIN_LINK_MESSAGE: &str = "If an account with this email exists, a login link has been sent.";
pub const LOGIN_LINK_SUBJECT: &str = "Your Secure Login Link";

#[derive(Debug, Clone, Serialize)]
pub struct PortalData {
    pub customer: Customer,
    pub bookings: Vec<Booking>,
}

pub struct LoginService {
    customers: Arc<dyn CustomerRepository>,
    bookings: Arc<dyn BookingRepository>,
    tokens: Arc<dyn LoginTokenRepository>,
    notifications: Arc<NotificationService>,
    frontend_base_url: String,
}

impl LoginService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        bookings: Arc<dyn BookingRepository>,
        tokens: Arc<dyn LoginTokenRepository>,
        notifications: Arc<NotificationService>,
        frontend_base_url: String,
    ) -> Self {
        Self { customers, bookings, tokens, notifications, frontend_base_url }
    }

    /// Issues a fresh link for a known customer. Unknown addresses, and mail failures, are
    /// indistinguishable from success to the caller.
    pub async fn request_link(&self, email: &str) -> Result<&'static str, AppError> {
        let Some(customer) = self.customers.find_by_email(email.trim()).await? else {
            info!("Login link requested for unknown email");
            return Ok(LOGIN_LINK_MESSAGE);
        };

        let (token, raw) = LoginToken::issue(customer.id.clone(), Utc::now());
        self.tokens.replace_active(&token).await?;
        info!("Login token {} issued for customer {}, expires {}", token.id, customer.id, token.expires_at);

        let mut context = Context::new();
        context.insert("first_name", &customer.first_name);
        context.insert("login_url", &self.login_url(&raw));
        context.insert("ttl_minutes", &LOGIN_TOKEN_TTL_MINUTES);

        if let Err(e) = self.notifications
            .send_direct(&customer.email, LOGIN_LINK_SUBJECT, "login_link.html", &context)
            .await
        {
            warn!("Login link email for customer {} failed: {:?}", customer.id, e);
        }

        Ok(LOGIN_LINK_MESSAGE)
    }

    /// Redeems a link. Every failure mode (unknown, used, expired, raced) maps to `InvalidLoginLink`.
    pub async fn verify(&self, raw_token: &str) -> Result<PortalData, AppError> {
        if raw_token.trim().is_empty() {
            return Err(AppError::InvalidLoginLink);
        }

        let now = Utc::now();
        let active = self.tokens.list_active(now).await?;
        let token = find_matching(&active, raw_token)
            .filter(|t| t.is_active(now))
            .ok_or(AppError::InvalidLoginLink)?;

        if !self.tokens.redeem(&token.id).await? {
            warn!("Login token {} was redeemed concurrently", token.id);
            return Err(AppError::InvalidLoginLink);
        }

        let customer = self.customers.find_by_id(&token.customer_id).await?
            .ok_or(AppError::InvalidLoginLink)?;
        let bookings = self.bookings.list_by_customer(&customer.id).await?;

        info!("Customer {} signed in to the portal", customer.id);
        Ok(PortalData { customer, bookings })
    }

    fn login_url(&self, raw_token: &str) -> String {
        format!("{}/portal/login?token={}", self.frontend_base_url.trim_end_matches('/'), raw_token)
    }
}

/// Compares the presented token's digest against every candidate without short-circuiting,
/// so the time taken does not depend on which row (if any) matches.
pub fn find_matching<'a>(candidates: &'a [LoginToken], raw_token: &str) -> Option<&'a LoginToken> {
    let presented = hash_token(raw_token);
    let mut found = None;

    for candidate in candidates {
        if constant_time_eq(candidate.token_hash.as_bytes(), presented.as_bytes()) && found.is_none() {
            found = Some(candidate);
        }
    }

    found
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matches_only_the_issued_value() {
        let now = Utc::now();
        let (a, raw_a) = LoginToken::issue("c1".into(), now);
        let (b, raw_b) = LoginToken::issue("c2".into(), now);
        let candidates = vec![a.clone(), b.clone()];

        assert_eq!(find_matching(&candidates, &raw_a).map(|t| &t.id), Some(&a.id));
        assert_eq!(find_matching(&candidates, &raw_b).map(|t| &t.id), Some(&b.id));
        assert!(find_matching(&candidates, "nope").is_none());
        assert!(find_matching(&candidates, &a.token_hash).is_none());
        assert!(find_matching(&[], &raw_a).is_none());
    }

    #[test]
    fn issued_tokens_are_long_and_distinct() {
        let now = Utc::now();
        let (_, first) = LoginToken::issue("c1".into(), now);
        let (_, second) = LoginToken::issue("c1".into(), now);

        assert_eq!(first.len(), 48);
        assert!(first.chars().all(|c| c.is_ascii_alphanumeric()));
        assert_ne!(first, second);
    }

    #[test]
    fn expired_tokens_are_inactive() {
        let issued_at = Utc::now() - chrono::Duration::minutes(LOGIN_TOKEN_TTL_MINUTES + 1);
        let (token, _) = LoginToken::issue("c1".into(), issued_at);
        assert!(!token.is_active(Utc::now()));
    }
}
