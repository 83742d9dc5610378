use crate::core::{NearbySearch, PlaceSearch};
use crate::models::{Coordinate, ResolutionError, VenueCandidate};
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Fields requested from the provider
pub const FIELD_MASK: &str = "places.id,places.displayName,places.formattedAddress,places.location,places.types";

/// Errors that can occur when talking to the places provider
#[derive(Debug, Error)]
pub enum PlacesError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Unauthorized: places API key missing or rejected")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl From<PlacesError> for ResolutionError {
    fn from(err: PlacesError) -> Self {
        match err {
            PlacesError::Unauthorized => ResolutionError::PermissionDenied,
            PlacesError::RequestError(e) if e.is_timeout() => ResolutionError::Timeout,
            other => ResolutionError::ProviderError(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchNearbyResponse {
    #[serde(default)]
    places: Vec<PlaceRecord>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PlaceRecord {
    id: Option<String>,
    display_name: Option<LocalizedText>,
    formatted_address: Option<String>,
    location: Option<LatLng>,
    #[serde(default)]
    types: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct LocalizedText {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    latitude: f64,
    longitude: f64,
}

impl From<PlaceRecord> for VenueCandidate {
    fn from(record: PlaceRecord) -> Self {
        VenueCandidate {
            id: record.id,
            name: record.display_name.and_then(|n| n.text),
            address: record.formatted_address,
            coordinate: record.location.map(|l| Coordinate::new(l.latitude, l.longitude)),
            category_tags: record.types.into_iter().collect(),
            maps_url: None,
        }
    }
}

/// Places API (New) client
///
/// Only the nearby search endpoint is used.
pub struct PlacesClient {
    base_url: String,
    api_key: String,
    language_code: Option<String>,
    client: Client,
}

impl PlacesClient {
    pub fn new(base_url: String, api_key: String, timeout: Duration) -> Result<Self, PlacesError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            language_code: None,
            client,
        })
    }

    pub fn with_language(mut self, language_code: Option<String>) -> Self {
        self.language_code = language_code;
        self
    }

    fn search_url(&self) -> String {
        format!("{}/v1/places:searchNearby", self.base_url.trim_end_matches('/'))
    }

    fn request_body(&self, request: &NearbySearch) -> serde_json::Value {
        let mut body = json!({
            "includedTypes": request.included_types,
            "maxResultCount": request.max_results,
            "locationRestriction": {
                "circle": {
                    "center": {
                        "latitude": request.center.latitude,
                        "longitude": request.center.longitude,
                    },
                    "radius": request.radius_meters,
                }
            }
        });

        if let (Some(language), Some(obj)) = (&self.language_code, body.as_object_mut()) {
            obj.insert("languageCode".to_string(), json!(language));
        }

        body
    }

    /// Run a nearby search and return the raw candidates
    pub async fn nearby(&self, request: &NearbySearch) -> Result<Vec<VenueCandidate>, PlacesError> {
        if self.api_key.is_empty() {
            return Err(PlacesError::Unauthorized);
        }

        let url = self.search_url();
        tracing::debug!("Searching nearby places: {} types={:?}", url, request.included_types);

        let response = self
            .client
            .post(&url)
            .header("X-Goog-Api-Key", &self.api_key)
            .header("X-Goog-FieldMask", FIELD_MASK)
            .json(&self.request_body(request))
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(PlacesError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Nearby search failed: {} - {}", status, body);
            return Err(PlacesError::ApiError(format!("Nearby search failed: {}", status)));
        }

        let parsed: SearchNearbyResponse = response
            .json()
            .await
            .map_err(|e| PlacesError::InvalidResponse(format!("Failed to parse places: {}", e)))?;

        tracing::debug!("Nearby search returned {} places", parsed.places.len());

        Ok(parsed.places.into_iter().map(VenueCandidate::from).collect())
    }
}

#[async_trait]
impl PlaceSearch for PlacesClient {
    async fn search_nearby(&self, request: &NearbySearch) -> Result<Vec<VenueCandidate>, ResolutionError> {
        self.nearby(request).await.map_err(ResolutionError::from)
    }
}
