use crate::models::GeoPoint;
use crate::services::provider::{GeocodingService, ProviderError};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;

/// Google Maps Geocoding API client
pub struct GoogleGeocoder {
    base_url: String,
    api_key: String,
    client: Client,
}

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    status: String,
    #[serde(default)]
    results: Vec<GeocodeResult>,
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

impl GoogleGeocoder {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, ProviderError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
        })
    }
}

#[async_trait]
impl GeocodingService for GoogleGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        let url = format!(
            "{}/geocode/json?address={}&key={}",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address),
            urlencoding::encode(&self.api_key)
        );

        let response = self.client.get(&url).send().await?;

        let status = response.status();
        if status == StatusCode::TOO_MANY_REQUESTS {
            return Err(ProviderError::RateLimited);
        }
        if !status.is_success() {
            return Err(ProviderError::Api(format!("Geocoding failed: {}", status)));
        }

        let body: GeocodeResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::InvalidResponse(format!("Failed to parse geocode: {}", e)))?;

        match body.status.as_str() {
            "OK" => body
                .results
                .into_iter()
                .next()
                .map(|r| GeoPoint::new(r.geometry.location.lat, r.geometry.location.lng))
                .ok_or_else(|| ProviderError::NoResult(address.to_string())),
            "ZERO_RESULTS" => Err(ProviderError::NoResult(address.to_string())),
            "OVER_QUERY_LIMIT" => Err(ProviderError::RateLimited),
            other => Err(ProviderError::Api(format!(
                "Geocoding status {}: {}",
                other,
                body.error_message.unwrap_or_default()
            ))),
        }
    }
}
