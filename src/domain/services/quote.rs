use std::sync::Arc;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use crate::domain::models::{address::Address, quote::Quote};
use crate::domain::services::delivery_fee::DeliveryFeeEstimator;

pub const MINIMUM_RENTAL_DAYS: i64 = 2;
pub const BASE_RENTAL_FEE: Decimal = Decimal::from_parts(40000, 0, 0, false, 2);
pub const EXTRA_DAY_FEE: Decimal = Decimal::from_parts(10000, 0, 0, false, 2);
pub const SECURITY_DEPOSIT: Decimal = Decimal::from_parts(10000, 0, 0, false, 2);

pub struct QuoteCalculator {
    delivery: Arc<DeliveryFeeEstimator>,
}

impl QuoteCalculator {
    pub fn new(delivery: Arc<DeliveryFeeEstimator>) -> Self {
        Self { delivery }
    }

    pub async fn quote(&self, start_date: NaiveDate, end_date: NaiveDate, event_address: &Address) -> Quote {
        let delivery_fee = self.delivery.estimate(event_address).await;
        assemble_quote(start_date, end_date, delivery_fee)
    }
}

/// Whole days between the dates, never less than two.
pub fn rental_days(start_date: NaiveDate, end_date: NaiveDate) -> i64 {
    (end_date - start_date).num_days().max(MINIMUM_RENTAL_DAYS)
}

/// $400 covers the first two days, then a flat $100 per extra day.
pub fn rental_fee(rental_days: i64) -> Decimal {
    let extra_days = (rental_days - MINIMUM_RENTAL_DAYS).max(0);
    BASE_RENTAL_FEE + Decimal::from(extra_days) * EXTRA_DAY_FEE
}

pub fn assemble_quote(start_date: NaiveDate, end_date: NaiveDate, delivery_fee: Decimal) -> Quote {
    let rental_days = rental_days(start_date, end_date);
    let rental_fee = rental_fee(rental_days);

    Quote {
        rental_days,
        rental_fee,
        delivery_fee,
        security_deposit: SECURITY_DEPOSIT,
        total_price: rental_fee + SECURITY_DEPOSIT + delivery_fee,
    }
}
