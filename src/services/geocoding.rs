use crate::core::Geocoder;
use crate::models::{Coordinate, ResolutionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GeocodingError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Geocoder returned error: {0}")]
    ApiError(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<GeocodingError> for ResolutionError {
    fn from(err: GeocodingError) -> Self {
        ResolutionError::ProviderError(err.to_string())
    }
}

/// Nominatim returns coordinates as strings
#[derive(Debug, Deserialize)]
struct SearchHit {
    lat: String,
    lon: String,
}

/// Address lookup against a Nominatim-compatible `/search` endpoint
pub struct HttpGeocoder {
    base_url: String,
    client: Client,
}

impl HttpGeocoder {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("nyoom/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { base_url, client })
    }

    pub async fn search(&self, address: &str) -> Result<Option<Coordinate>, GeocodingError> {
        let url = format!(
            "{}/search?q={}&format=json&limit=1",
            self.base_url.trim_end_matches('/'),
            urlencoding::encode(address)
        );

        tracing::debug!("Geocoding address: {}", address);

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(GeocodingError::ApiError(format!("Failed to geocode: {}", response.status())));
        }

        let hits: Vec<SearchHit> = response.json().await?;

        let Some(hit) = hits.first() else {
            return Ok(None);
        };

        let latitude = hit
            .lat
            .parse::<f64>()
            .map_err(|e| GeocodingError::InvalidResponse(format!("bad latitude '{}': {}", hit.lat, e)))?;
        let longitude = hit
            .lon
            .parse::<f64>()
            .map_err(|e| GeocodingError::InvalidResponse(format!("bad longitude '{}': {}", hit.lon, e)))?;

        let coordinate = Coordinate::new(latitude, longitude);
        if !coordinate.is_valid() {
            return Err(GeocodingError::InvalidResponse(format!("coordinate out of range: {}", coordinate)));
        }

        Ok(Some(coordinate))
    }
}

#[async_trait]
impl Geocoder for HttpGeocoder {
    async fn geocode(&self, address: &str) -> Result<Option<Coordinate>, ResolutionError> {
        self.search(address).await.map_err(ResolutionError::from)
    }
}
