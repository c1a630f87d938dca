use crate::domain::{models::geo::Coordinates, ports::GeocodingClient};
use crate::error::AppError;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;

pub struct GoogleMapsClient {
    client: Client,
    api_base: String,
    api_key: String,
}

impl GoogleMapsClient {
    pub fn new(client: Client, api_base: String, api_key: String) -> Self {
        Self { client, api_base: api_base.trim_end_matches('/').to_string(), api_key }
    }
}

#[derive(Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

fn first_location(response: GeocodeResponse) -> Result<Coordinates, AppError> {
    if response.status != "OK" {
        return Err(AppError::Dependency(format!(
            "Geocoding status {}: {}",
            response.status,
            response.error_message.unwrap_or_default()
        )));
    }

    response.results.into_iter().next()
        .map(|r| Coordinates::new(r.geometry.location.lat, r.geometry.location.lng))
        .ok_or(AppError::Dependency("Geocoding returned no results".into()))
}

#[async_trait]
impl GeocodingClient for GoogleMapsClient {
    async fn geocode(&self, address: &str) -> Result<Coordinates, AppError> {
        let res = self.client
            .get(format!("{}/maps/api/geocode/json", self.api_base))
            .query(&[("address", address), ("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| AppError::Dependency(format!("Geocoding connection error: {}", e)))?;

        if !res.status().is_success() {
            return Err(AppError::Dependency(format!("Geocoding returned HTTP {}", res.status())));
        }

        let body: GeocodeResponse = res.json().await
            .map_err(|e| AppError::Dependency(format!("Unreadable geocoding response: {}", e)))?;

        first_location(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn takes_first_result() {
        let body: GeocodeResponse = serde_json::from_str(r#"{
            "status": "OK",
            "results": [
                {"geometry": {"location": {"lat": 40.1, "lng": -87.1}}},
                {"geometry": {"location": {"lat": 1.0, "lng": 1.0}}}
            ]
        }"#).unwrap();

        let c = first_location(body).unwrap();
        assert_eq!(c.latitude, 40.1);
        assert_eq!(c.longitude, -87.1);
    }

    #[test]
    fn zero_results_is_an_error() {
        let body: GeocodeResponse = serde_json::from_str(r#"{"status": "ZERO_RESULTS", "results": []}"#).unwrap();
        assert!(matches!(first_location(body), Err(AppError::Dependency(_))));
    }

    #[test]
    fn denied_request_is_an_error() {
        let body: GeocodeResponse = serde_json::from_str(
            r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#
        ).unwrap();
        assert!(first_location(body).is_err());
    }
}
