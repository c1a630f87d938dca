use std::sync::Arc;
use rust_decimal::{Decimal, RoundingStrategy};
use tracing::{debug, warn};
use crate::domain::models::address::Address;
use crate::domain::ports::GeocodingClient;
use crate::domain::services::distance::haversine_miles;
use crate::error::AppError;

pub const RATE_PER_MILE: Decimal = Decimal::from_parts(200, 0, 0, false, 2);
pub const MINIMUM_DELIVERY_FEE: Decimal = Decimal::from_parts(500, 0, 0, false, 2);
pub const MAXIMUM_DELIVERY_FEE: Decimal = Decimal::from_parts(50000, 0, 0, false, 2);
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(2500, 0, 0, false, 2);

/// Prices delivery from the yard to an event site.
///
/// Estimation never fails the caller: any geocoding problem yields `DEFAULT_DELIVERY_FEE`.
/// A flat fallback keeps quoting and booking available while the geocoder is down, at the
/// cost of occasionally under- or over-charging delivery.
pub struct DeliveryFeeEstimator {
    geocoder: Arc<dyn GeocodingClient>,
    origin_address: String,
}

impl DeliveryFeeEstimator {
    pub fn new(geocoder: Arc<dyn GeocodingClient>, origin_address: String) -> Self {
        Self { geocoder, origin_address }
    }

    pub async fn estimate(&self, destination: &Address) -> Decimal {
        match self.distance_to(destination).await {
            Ok(miles) => {
                let fee = fee_for_distance(miles);
                debug!("Delivery to '{}': {:.2} miles, fee {}", destination.formatted(), miles, fee);
                fee
            }
            Err(e) => {
                warn!("Geocoding failed for '{}', using default delivery fee: {}", destination.formatted(), e);
                DEFAULT_DELIVERY_FEE
            }
        }
    }

    async fn distance_to(&self, destination: &Address) -> Result<f64, AppError> {
        let origin = self.geocoder.geocode(&self.origin_address).await?;
        let target = self.geocoder.geocode(&destination.formatted()).await?;
        Ok(haversine_miles(origin, target))
    }
}

/// `max(floor(miles) * $2.00, $5.00)`; anything above $500 is treated as a geocoding anomaly.
pub fn fee_for_distance(miles: f64) -> Decimal {
    if !miles.is_finite() || miles < 0.0 {
        warn!("Distance {} is not usable, using default delivery fee", miles);
        return DEFAULT_DELIVERY_FEE;
    }

    let whole_miles = Decimal::from(miles.floor() as i64);
    let fee = (whole_miles * RATE_PER_MILE)
        .max(MINIMUM_DELIVERY_FEE)
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);

    if fee > MAXIMUM_DELIVERY_FEE {
        warn!("Delivery fee {} for {:.1} miles exceeds ceiling, using default", fee, miles);
        return DEFAULT_DELIVERY_FEE;
    }

    fee
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::geo::Coordinates;
    use async_trait::async_trait;
    use std::str::FromStr;

    fn dec(s: &str) -> Decimal {
        Decimal::from_str(s).unwrap()
    }

    struct FixedGeocoder(Option<Coordinates>);

    #[async_trait]
    impl GeocodingClient for FixedGeocoder {
        async fn geocode(&self, address: &str) -> Result<Coordinates, AppError> {
            if address.starts_with("Darlington") {
                return Ok(Coordinates::new(40.101, -87.105));
            }
            self.0.ok_or(AppError::Dependency("ZERO_RESULTS".into()))
        }
    }

    fn site() -> Address {
        Address::new("1 Field Rd", "Somewhere", "IN", "47000")
    }

    #[test]
    fn short_distances_hit_the_minimum() {
        assert_eq!(fee_for_distance(0.0), dec("5.00"));
        assert_eq!(fee_for_distance(0.74), dec("5.00"));
        assert_eq!(fee_for_distance(2.99), dec("5.00"));
    }

    #[test]
    fn distance_is_floored_before_rating() {
        assert_eq!(fee_for_distance(7.5), dec("14.00"));
        assert_eq!(fee_for_distance(7.99), dec("14.00"));
        assert_eq!(fee_for_distance(50.2), dec("100.00"));
    }

    #[test]
    fn ceiling_falls_back_to_default() {
        assert_eq!(fee_for_distance(250.0), dec("500.00"));
        assert_eq!(fee_for_distance(250.5), dec("500.00"));
        assert_eq!(fee_for_distance(251.0), DEFAULT_DELIVERY_FEE);
        assert_eq!(fee_for_distance(3000.0), DEFAULT_DELIVERY_FEE);
    }

    #[test]
    fn fee_matches_formula_across_distances() {
        for tenths in 0..3000 {
            let miles = tenths as f64 / 10.0;
            let expected = (Decimal::from(miles.floor() as i64) * dec("2.00")).max(dec("5.00"));
            let expected = if expected > dec("500") { dec("25.00") } else { expected };
            assert_eq!(fee_for_distance(miles), expected, "miles = {}", miles);
        }
    }

    #[test]
    fn non_finite_distance_uses_default() {
        assert_eq!(fee_for_distance(f64::NAN), DEFAULT_DELIVERY_FEE);
        assert_eq!(fee_for_distance(f64::INFINITY), DEFAULT_DELIVERY_FEE);
    }

    #[tokio::test]
    async fn geocoding_failure_uses_default() {
        let estimator = DeliveryFeeEstimator::new(Arc::new(FixedGeocoder(None)), "Darlington, IN 47940".into());
        assert_eq!(estimator.estimate(&site()).await, dec("25.00"));
    }

    #[tokio::test]
    async fn geocoded_distance_is_rated() {
        let estimator = DeliveryFeeEstimator::new(
            Arc::new(FixedGeocoder(Some(Coordinates::new(39.9612, -86.1581)))),
            "Darlington, IN 47940".into(),
        );
        // ~51.02 miles -> 51 * 2.00
        assert_eq!(estimator.estimate(&site()).await, dec("102.00"));
    }
}
