use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use crate::error::AppError;

/// Converts a dollar amount to integer cents, rounding half away from zero.
pub fn to_minor_units(amount: Decimal) -> Result<i64, AppError> {
    (amount * Decimal::ONE_HUNDRED)
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or_else(|| AppError::InternalWithMsg(format!("Amount {} does not fit in minor units", amount)))
}

pub fn from_minor_units(cents: i64) -> Decimal {
    Decimal::new(cents, 2)
}
