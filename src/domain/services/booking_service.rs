use std::sync::Arc;
use chrono::{Months, NaiveDate, Utc};
use tracing::{error, info, info_span, warn, Instrument};
use crate::domain::{
    models::{
        address::{contact_address, Address},
        booking::{exclusive_end, Booking, NewBookingParams},
        customer::Customer,
        money::to_minor_units,
        notification::NotificationKind,
        quote::Quote,
    },
    ports::{BookingRepository, CustomerRepository, CustomerWrite, PaymentGateway, PaymentRequest},
    services::{
        availability::AvailabilityIndex,
        notification_service::{booking_context, NotificationService},
        quote::QuoteCalculator,
    },
};
use crate::error::AppError;

pub const MAX_BOOKING_HORIZON_MONTHS: u32 = 24;
pub const ADMIN_NOTICE_SUBJECT: &str = "New Booking Received";

#[derive(Debug, Clone)]
pub struct BookingRequest {
    pub customer_name: String,
    pub customer_email: String,
    pub event_address: Address,
    pub billing_address: Option<Address>,
    pub event_date: NaiveDate,
    pub event_end_date: NaiveDate,
    pub tent_type: String,
    pub special_requests: Option<String>,
    pub payment_method_id: String,
}

impl BookingRequest {
    pub fn validate(&self, today: NaiveDate) -> Result<(), AppError> {
        if self.customer_name.trim().is_empty() {
            return Err(AppError::Validation("customerName is required".into()));
        }
        if self.customer_email.trim().is_empty() || !self.customer_email.contains('@') {
            return Err(AppError::Validation("customerEmail must be a valid email address".into()));
        }
        if self.tent_type.trim().is_empty() {
            return Err(AppError::Validation("tentType is required".into()));
        }
        if self.payment_method_id.trim().is_empty() {
            return Err(AppError::Validation("paymentMethodId is required".into()));
        }
        if !self.event_address.is_complete() {
            return Err(AppError::Validation("Event address, city, state and zipCode are required".into()));
        }
        if self.event_date <= today {
            return Err(AppError::Validation("eventDate must be in the future".into()));
        }
        let horizon = today.checked_add_months(Months::new(MAX_BOOKING_HORIZON_MONTHS)).unwrap_or(NaiveDate::MAX);
        if self.event_date > horizon {
            return Err(AppError::Validation("eventDate cannot be more than 2 years in the future".into()));
        }
        if self.event_end_date < self.event_date {
            return Err(AppError::Validation("eventEndDate cannot be before eventDate".into()));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct BookingConfirmation {
    pub booking: Booking,
    pub customer: Customer,
}

#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub currency: String,
    pub admin_email: Option<String>,
    pub frontend_base_url: String,
}

pub struct BookingService {
    customers: Arc<dyn CustomerRepository>,
    bookings: Arc<dyn BookingRepository>,
    availability: Arc<AvailabilityIndex>,
    quotes: Arc<QuoteCalculator>,
    payments: Arc<dyn PaymentGateway>,
    notifications: Arc<NotificationService>,
    settings: BookingSettings,
}

/// Customer as resolved before payment. Nothing is written until the charge goes through,
/// and then only in the same transaction as the booking.
struct ResolvedCustomer {
    customer: Customer,
    write: CustomerWrite,
}

impl BookingService {
    pub fn new(
        customers: Arc<dyn CustomerRepository>,
        bookings: Arc<dyn BookingRepository>,
        availability: Arc<AvailabilityIndex>,
        quotes: Arc<QuoteCalculator>,
        payments: Arc<dyn PaymentGateway>,
        notifications: Arc<NotificationService>,
        settings: BookingSettings,
    ) -> Self {
        Self { customers, bookings, availability, quotes, payments, notifications, settings }
    }

    /// Runs one booking end to end: availability guard, customer resolution, pricing,
    /// payment, persistence, then notifications.
    ///
    /// Payment and the durable write decide the outcome. Mail delivery happens afterwards and
    /// never fails the request; an undelivered confirmation stays queued in the outbox.
    pub async fn create(&self, request: BookingRequest) -> Result<BookingConfirmation, AppError> {
        request.validate(Utc::now().date_naive())?;

        let span = info_span!(
            "create_booking",
            tent_type = %request.tent_type,
            event_date = %request.event_date,
            event_end_date = %request.event_end_date
        );

        async move {
            self.ensure_available(&request).await?;

            let resolved = self.resolve_customer(&request).await?;

            let quote = self.quotes
                .quote(request.event_date, request.event_end_date, &request.event_address)
                .await;
            info!("Quoted {} days, total {}", quote.rental_days, quote.total_price);

            let amount_minor = to_minor_units(quote.total_price)?;
            let authorization = self.payments.authorize(&PaymentRequest {
                amount_minor,
                currency: self.settings.currency.clone(),
                payment_method_id: request.payment_method_id.clone(),
                description: format!("{} tent rental {} to {}", request.tent_type, request.event_date, request.event_end_date),
            }).await?;
            info!("Payment {} authorized for {} minor units", authorization.payment_intent_id, amount_minor);

            let persisted = self
                .persist(&request, resolved, &quote, &authorization.payment_intent_id)
                .await;

            let (booking, customer) = match persisted {
                Ok(saved) => saved,
                Err(e) => {
                    self.void_payment(&authorization.payment_intent_id).await;
                    return Err(self.explain_persist_failure(&request, e).await);
                }
            };

            info!("Booking {} confirmed for customer {}", booking.id, customer.id);

            self.notify_admin(&booking, &customer).await;

            Ok(BookingConfirmation { booking, customer })
        }
        .instrument(span)
        .await
    }

    async fn ensure_available(&self, request: &BookingRequest) -> Result<(), AppError> {
        let unavailable = self.availability
            .unavailable_dates(&request.tent_type, request.event_date, exclusive_end(request.event_end_date))
            .await?;

        if !unavailable.is_empty() {
            warn!("Booking rejected, {} unavailable dates in range", unavailable.len());
            return Err(AppError::BookingConflict(unavailable.into_iter().collect()));
        }
        Ok(())
    }

    async fn resolve_customer(&self, request: &BookingRequest) -> Result<ResolvedCustomer, AppError> {
        let contact = contact_address(&request.event_address, request.billing_address.as_ref());
        let email = request.customer_email.trim().to_string();

        match self.customers.find_by_email(&email).await? {
            Some(mut customer) => {
                let write = if customer.apply_contact_address(&contact) {
                    CustomerWrite::UpdateContact
                } else {
                    CustomerWrite::Unchanged
                };
                Ok(ResolvedCustomer { customer, write })
            }
            None => Ok(ResolvedCustomer {
                customer: Customer::new(&request.customer_name, email, &contact),
                write: CustomerWrite::Insert,
            }),
        }
    }

    async fn persist(
        &self,
        request: &BookingRequest,
        resolved: ResolvedCustomer,
        quote: &Quote,
        payment_intent_id: &str,
    ) -> Result<(Booking, Customer), AppError> {
        let ResolvedCustomer { customer, write } = resolved;
        if write == CustomerWrite::UpdateContact {
            info!("Updating contact address for customer {}", customer.id);
        }

        let booking = Booking::new(NewBookingParams {
            customer_id: customer.id.clone(),
            tent_type: request.tent_type.trim().to_string(),
            event_date: request.event_date,
            event_end_date: request.event_end_date,
            event_address: &request.event_address,
            quote,
            payment_intent_id: payment_intent_id.to_string(),
            special_requests: request.special_requests.clone().filter(|s| !s.trim().is_empty()),
        })?;

        let confirmation = self.notifications.compose(NotificationKind::Confirmation, &booking, &customer)?;
        let booking = self.bookings.create_confirmed(&customer, write, &booking, &confirmation).await?;

        match self.notifications.deliver(&confirmation).await {
            Ok(true) => {}
            Ok(false) => warn!("Confirmation for booking {} left queued for retry", booking.id),
            Err(e) => warn!("Confirmation for booking {} could not be delivered: {:?}", booking.id, e),
        }

        Ok((booking, customer))
    }

    /// A lost race against a concurrent booking surfaces as the regular date conflict.
    async fn explain_persist_failure(&self, request: &BookingRequest, err: AppError) -> AppError {
        if !matches!(err, AppError::Conflict(_)) {
            return err;
        }

        match self.availability
            .unavailable_dates(&request.tent_type, request.event_date, exclusive_end(request.event_end_date))
            .await
        {
            Ok(dates) if !dates.is_empty() => AppError::BookingConflict(dates.into_iter().collect()),
            _ => err,
        }
    }

    async fn void_payment(&self, payment_intent_id: &str) {
        match self.payments.void(payment_intent_id).await {
            Ok(()) => warn!("Payment {} voided after booking could not be saved", payment_intent_id),
            Err(e) => error!("Payment {} could not be voided, manual refund required: {:?}", payment_intent_id, e),
        }
    }

    async fn notify_admin(&self, booking: &Booking, customer: &Customer) {
        let Some(admin_email) = self.settings.admin_email.as_deref() else {
            return;
        };

        let context = booking_context(booking, customer, &self.settings.frontend_base_url);
        if let Err(e) = self.notifications
            .send_direct(admin_email, ADMIN_NOTICE_SUBJECT, "admin_new_booking.html", &context)
            .await
        {
            warn!("Admin notice for booking {} failed: {:?}", booking.id, e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2030, 5, 1).unwrap()
    }

    fn request() -> BookingRequest {
        BookingRequest {
            customer_name: "Jane Doe".into(),
            customer_email: "jane@example.com".into(),
            event_address: Address::new("1 Field Rd", "Darlington", "IN", "47940"),
            billing_address: None,
            event_date: NaiveDate::from_ymd_opt(2030, 6, 10).unwrap(),
            event_end_date: NaiveDate::from_ymd_opt(2030, 6, 12).unwrap(),
            tent_type: "Standard".into(),
            special_requests: None,
            payment_method_id: "pm_card_visa".into(),
        }
    }

    #[test]
    fn accepts_well_formed_request() {
        assert!(request().validate(today()).is_ok());
    }

    #[test]
    fn rejects_past_and_same_day_events() {
        let mut r = request();
        r.event_date = today();
        r.event_end_date = today();
        assert!(matches!(r.validate(today()), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_events_beyond_two_years() {
        let mut r = request();
        r.event_date = NaiveDate::from_ymd_opt(2032, 5, 2).unwrap();
        r.event_end_date = r.event_date;
        assert!(matches!(r.validate(today()), Err(AppError::Validation(_))));

        r.event_date = NaiveDate::from_ymd_opt(2032, 5, 1).unwrap();
        r.event_end_date = r.event_date;
        assert!(r.validate(today()).is_ok());
    }

    #[test]
    fn rejects_inverted_range() {
        let mut r = request();
        r.event_end_date = NaiveDate::from_ymd_opt(2030, 6, 9).unwrap();
        assert!(matches!(r.validate(today()), Err(AppError::Validation(_))));
    }

    #[test]
    fn rejects_missing_fields() {
        let mut r = request();
        r.customer_email = "not-an-email".into();
        assert!(r.validate(today()).is_err());

        let mut r = request();
        r.payment_method_id = "  ".into();
        assert!(r.validate(today()).is_err());

        let mut r = request();
        r.event_address.zip_code.clear();
        assert!(r.validate(today()).is_err());
    }
}
