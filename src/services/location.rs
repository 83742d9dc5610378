use crate::core::{LocationProvider, PermissionGate};
use crate::models::{Coordinate, ResolutionError};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Errors from the device location lookup
#[derive(Debug, Error)]
pub enum LocationError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("Location service returned error: {0}")]
    ApiError(String),
}

impl From<LocationError> for ResolutionError {
    fn from(err: LocationError) -> Self {
        ResolutionError::ProviderError(err.to_string())
    }
}

/// Permission decided once at startup from configuration
#[derive(Debug, Clone, Copy)]
pub struct StaticPermission {
    granted: bool,
}

impl StaticPermission {
    pub fn new(granted: bool) -> Self {
        Self { granted }
    }
}

#[async_trait]
impl PermissionGate for StaticPermission {
    async fn request(&self) -> bool {
        tracing::debug!("Location permission requested: granted={}", self.granted);
        self.granted
    }
}

/// Answer from an IP geolocation service
///
/// Accepts both `lat`/`lon` and `latitude`/`longitude` field names.
#[derive(Debug, Deserialize)]
struct GeolocationAnswer {
    status: Option<String>,
    #[serde(alias = "latitude")]
    lat: Option<f64>,
    #[serde(alias = "longitude")]
    lon: Option<f64>,
}

impl GeolocationAnswer {
    fn coordinate(&self) -> Option<Coordinate> {
        if self.status.as_deref().is_some_and(|s| s.eq_ignore_ascii_case("fail")) {
            return None;
        }
        match (self.lat, self.lon) {
            (Some(lat), Some(lon)) => Some(Coordinate::new(lat, lon)).filter(Coordinate::is_valid),
            _ => None,
        }
    }
}

/// Device location backed by an HTTP geolocation endpoint
pub struct HttpLocationProvider {
    endpoint: String,
    client: Client,
}

impl HttpLocationProvider {
    pub fn new(endpoint: String, timeout: Duration) -> Result<Self, LocationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { endpoint, client })
    }

    pub async fn lookup(&self) -> Result<Option<Coordinate>, LocationError> {
        tracing::debug!("Fetching device location from: {}", self.endpoint);

        let response = self.client.get(&self.endpoint).send().await?;

        if !response.status().is_success() {
            return Err(LocationError::ApiError(format!(
                "Failed to fetch location: {}",
                response.status()
            )));
        }

        let answer: GeolocationAnswer = response.json().await?;
        Ok(answer.coordinate())
    }
}

#[async_trait]
impl LocationProvider for HttpLocationProvider {
    async fn last_known(&self) -> Result<Option<Coordinate>, ResolutionError> {
        self.lookup().await.map_err(ResolutionError::from)
    }
}

/// Provider used when no location endpoint is configured; never has a fix
#[derive(Debug, Clone, Copy, Default)]
pub struct NoLocationProvider;

#[async_trait]
impl LocationProvider for NoLocationProvider {
    async fn last_known(&self) -> Result<Option<Coordinate>, ResolutionError> {
        Ok(None)
    }
}
