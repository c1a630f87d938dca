use rust_decimal::Decimal;

/// Non-binding price breakdown for a rental. Frozen onto the booking at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    pub rental_days: i64,
    pub rental_fee: Decimal,
    pub delivery_fee: Decimal,
    pub security_deposit: Decimal,
    pub total_price: Decimal,
}
