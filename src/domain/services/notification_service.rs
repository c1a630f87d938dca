use std::sync::Arc;
use serde::Serialize;
use tera::{Context, Tera};
use tracing::{error, info, warn};
use crate::domain::{
    models::{
        booking::Booking,
        customer::Customer,
        notification::{Notification, NotificationKind},
    },
    ports::{EmailService, NotificationRepository},
};
use crate::error::AppError;

pub const MAX_DELIVERY_ATTEMPTS: i32 = 5;
pub const DISPATCH_BATCH_SIZE: i64 = 100;
pub const FOLLOW_UP_DISCOUNT_CODE: &str = "THANKYOU10";

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub delivered: usize,
    pub failed: usize,
}

/// Renders customer emails into the outbox and drains it through the mail service.
pub struct NotificationService {
    repo: Arc<dyn NotificationRepository>,
    email: Arc<dyn EmailService>,
    templates: Arc<Tera>,
    frontend_base_url: String,
}

impl NotificationService {
    pub fn new(
        repo: Arc<dyn NotificationRepository>,
        email: Arc<dyn EmailService>,
        templates: Arc<Tera>,
        frontend_base_url: String,
    ) -> Self {
        Self { repo, email, templates, frontend_base_url }
    }

    pub fn render(&self, template_name: &str, context: &Context) -> Result<String, AppError> {
        self.templates.render(template_name, context)
            .map_err(|e| AppError::InternalWithMsg(format!("Tera render error for {}: {:?}", template_name, e)))
    }

    /// Builds the outbox row for one booking email. Nothing is persisted here.
    pub fn compose(&self, kind: NotificationKind, booking: &Booking, customer: &Customer) -> Result<Notification, AppError> {
        let context = booking_context(booking, customer, &self.frontend_base_url);
        let html_body = self.render(kind.template(), &context)?;
        Ok(Notification::new(kind, &booking.id, customer.email.clone(), html_body))
    }

    /// Returns true if the row was newly queued, false if an identical one already exists.
    pub async fn enqueue(&self, notification: &Notification) -> Result<bool, AppError> {
        self.repo.enqueue(notification).await
    }

    /// Sends one queued row and records the outcome. `Ok(false)` means the mail service refused it.
    pub async fn deliver(&self, notification: &Notification) -> Result<bool, AppError> {
        match self.email.send(&notification.recipient, &notification.subject, &notification.html_body).await {
            Ok(()) => {
                self.repo.mark_sent(&notification.id).await?;
                info!("Delivered {} notification {} to {}", notification.kind, notification.id, notification.recipient);
                Ok(true)
            }
            Err(e) => {
                warn!(
                    "Delivery of {} notification {} failed (attempt {}): {}",
                    notification.kind, notification.id, notification.attempts + 1, e
                );
                self.repo.record_failure(&notification.id, &e.to_string(), MAX_DELIVERY_ATTEMPTS).await?;
                Ok(false)
            }
        }
    }

    pub async fn dispatch_pending(&self, limit: i64) -> Result<DispatchSummary, AppError> {
        let pending = self.repo.list_pending(limit).await?;
        let mut summary = DispatchSummary::default();

        for notification in &pending {
            match self.deliver(notification).await {
                Ok(true) => summary.delivered += 1,
                Ok(false) => summary.failed += 1,
                Err(e) => {
                    error!("Could not record delivery outcome for {}: {:?}", notification.id, e);
                    summary.failed += 1;
                }
            }
        }

        if !pending.is_empty() {
            info!("Outbox dispatch: {} delivered, {} failed", summary.delivered, summary.failed);
        }
        Ok(summary)
    }

    /// Renders and sends without touching the outbox. Used for mail that must not be stored,
    /// such as login links, and for operator notices.
    pub async fn send_direct(&self, recipient: &str, subject: &str, template_name: &str, context: &Context) -> Result<(), AppError> {
        let html_body = self.render(template_name, context)?;
        self.email.send(recipient, subject, &html_body).await
    }
}

pub fn booking_context(booking: &Booking, customer: &Customer, frontend_base_url: &str) -> Context {
    let mut context = Context::new();
    context.insert("first_name", &customer.first_name);
    context.insert("customer_name", &customer.full_name());
    context.insert("customer_email", &customer.email);
    context.insert("booking_id", &booking.id);
    context.insert("tent_type", &booking.tent_type);
    context.insert("event_date", &booking.event_date.format("%A, %B %-d, %Y").to_string());
    context.insert("event_end_date", &booking.event_end_date.format("%A, %B %-d, %Y").to_string());
    context.insert("event_location", &booking.event_location().formatted());
    context.insert("rental_fee", &booking.rental_fee().to_string());
    context.insert("delivery_fee", &booking.delivery_fee().to_string());
    context.insert("security_deposit", &booking.security_deposit().to_string());
    context.insert("total_price", &booking.total_price().to_string());
    context.insert("special_requests", &booking.special_requests.clone().unwrap_or_default());
    context.insert("portal_url", &format!("{}/portal", frontend_base_url.trim_end_matches('/')));
    context.insert("review_url", &format!("{}/review", frontend_base_url.trim_end_matches('/')));
    context.insert("discount_code", FOLLOW_UP_DISCOUNT_CODE);
    context
}
