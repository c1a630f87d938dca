use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use sqlx::FromRow;
use crate::domain::models::{address::Address, money::{from_minor_units, to_minor_units}, quote::Quote};
use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookingStatus {
    Pending,
    Confirmed,
    Cancelled,
    Completed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Pending => "Pending",
            BookingStatus::Confirmed => "Confirmed",
            BookingStatus::Cancelled => "Cancelled",
            BookingStatus::Completed => "Completed",
        }
    }
}

/// One reservation. Money is persisted as integer cents so both SQLite and Postgres keep it exact.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct Booking {
    pub id: String,
    pub customer_id: String,
    pub event_date: NaiveDate,
    pub event_end_date: NaiveDate,
    pub tent_type: String,
    pub event_address: String,
    pub event_city: String,
    pub event_state: String,
    pub event_zip_code: String,
    pub status: String,
    pub rental_fee_cents: i64,
    pub delivery_fee_cents: i64,
    pub security_deposit_cents: i64,
    pub total_price_cents: i64,
    pub stripe_payment_intent_id: String,
    pub special_requests: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewBookingParams<'a> {
    pub customer_id: String,
    pub tent_type: String,
    pub event_date: NaiveDate,
    pub event_end_date: NaiveDate,
    pub event_address: &'a Address,
    pub quote: &'a Quote,
    pub payment_intent_id: String,
    pub special_requests: Option<String>,
}

impl Booking {
    pub fn new(params: NewBookingParams<'_>) -> Result<Self, AppError> {
        let now = Utc::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            customer_id: params.customer_id,
            event_date: params.event_date,
            event_end_date: params.event_end_date,
            tent_type: params.tent_type,
            event_address: params.event_address.address.clone(),
            event_city: params.event_address.city.clone(),
            event_state: params.event_address.state.clone(),
            event_zip_code: params.event_address.zip_code.clone(),
            status: BookingStatus::Confirmed.as_str().to_string(),
            rental_fee_cents: to_minor_units(params.quote.rental_fee)?,
            delivery_fee_cents: to_minor_units(params.quote.delivery_fee)?,
            security_deposit_cents: to_minor_units(params.quote.security_deposit)?,
            total_price_cents: to_minor_units(params.quote.total_price)?,
            stripe_payment_intent_id: params.payment_intent_id,
            special_requests: params.special_requests,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn event_location(&self) -> Address {
        Address {
            address: self.event_address.clone(),
            city: self.event_city.clone(),
            state: self.event_state.clone(),
            zip_code: self.event_zip_code.clone(),
        }
    }

    /// First day after the rental. Event dates are inclusive, so this is `event_end_date + 1`.
    pub fn exclusive_end(&self) -> NaiveDate {
        exclusive_end(self.event_end_date)
    }

    /// Every calendar day the tent is out, `event_date..=event_end_date`.
    pub fn occupied_dates(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.event_date.iter_days().take_while(move |d| *d <= self.event_end_date)
    }

    pub fn rental_fee(&self) -> Decimal { from_minor_units(self.rental_fee_cents) }
    pub fn delivery_fee(&self) -> Decimal { from_minor_units(self.delivery_fee_cents) }
    pub fn security_deposit(&self) -> Decimal { from_minor_units(self.security_deposit_cents) }
    pub fn total_price(&self) -> Decimal { from_minor_units(self.total_price_cents) }
}

pub fn exclusive_end(inclusive_end: NaiveDate) -> NaiveDate {
    inclusive_end.checked_add_days(Days::new(1)).unwrap_or(NaiveDate::MAX)
}
