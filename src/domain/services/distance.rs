use std::f64::consts::PI;
use crate::domain::models::geo::Coordinates;

pub const EARTH_RADIUS_MILES: f64 = 3959.0;

/// Great-circle distance in miles (haversine).
pub fn haversine_miles(from: Coordinates, to: Coordinates) -> f64 {
    let d_lat = to_radians(to.latitude - from.latitude);
    let d_lon = to_radians(to.longitude - from.longitude);

    let a = (d_lat / 2.0).sin() * (d_lat / 2.0).sin()
        + to_radians(from.latitude).cos() * to_radians(to.latitude).cos()
        * (d_lon / 2.0).sin() * (d_lon / 2.0).sin();

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_MILES * c
}

fn to_radians(degrees: f64) -> f64 {
    PI * degrees / 180.0
}
