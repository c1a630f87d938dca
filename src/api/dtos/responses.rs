use crate::domain::models::{booking::Booking, customer::Customer, quote::Quote};
use crate::domain::services::login_service::PortalData;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
    #[serde(with = "rust_decimal::serde::float")]
    pub rental_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub delivery_fee: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub security_deposit: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
    pub rental_days: i64,
}

impl From<Quote> for QuoteResponse {
    fn from(q: Quote) -> Self {
        Self {
            rental_fee: q.rental_fee,
            delivery_fee: q.delivery_fee,
            security_deposit: q.security_deposit,
            total_price: q.total_price,
            rental_days: q.rental_days,
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: String,
    pub event_date: NaiveDate,
    pub event_end_date: NaiveDate,
    pub status: String,
    pub tent_type: String,
    pub customer_name: String,
    pub customer_email: String,
    pub stripe_payment_intent_id: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub total_price: Decimal,
}

impl BookingResponse {
    pub fn new(booking: &Booking, customer: &Customer) -> Self {
        Self {
            id: booking.id.clone(),
            event_date: booking.event_date,
            event_end_date: booking.event_end_date,
            status: booking.status.clone(),
            tent_type: booking.tent_type.clone(),
            customer_name: customer.full_name(),
            customer_email: customer.email.clone(),
            stripe_payment_intent_id: booking.stripe_payment_intent_id.clone(),
            total_price: booking.total_price(),
        }
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PortalDataResponse {
    pub customer_name: String,
    pub customer_email: String,
    pub bookings: Vec<BookingResponse>,
}

impl From<PortalData> for PortalDataResponse {
    fn from(data: PortalData) -> Self {
        Self {
            customer_name: data.customer.full_name(),
            customer_email: data.customer.email.clone(),
            bookings: data.bookings.iter().map(|b| BookingResponse::new(b, &data.customer)).collect(),
        }
    }
}

#[derive(Serialize)]
pub struct MessageResponse {
    pub message: &'static str,
}
