use serde::{Deserialize, Serialize};
use crate::models::domain::{Coordinate, LocationState, RetryAction, SuggestionCategory};

/// One rendered suggestion
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionView {
    pub id: Option<String>,
    pub name: String,
    pub address: String,
    pub coordinate: Option<Coordinate>,
    #[serde(rename = "distanceKm")]
    pub distance_km: Option<f64>,
    #[serde(rename = "deepLink")]
    pub deep_link: String,
}

/// Where the suggestions came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionSource {
    Places,
    Fallback,
}

/// Response for the suggestions endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuggestionsResponse {
    pub category: SuggestionCategory,
    pub source: SuggestionSource,
    pub suggestions: Vec<SuggestionView>,
}

/// Response for the location endpoints
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    #[serde(flatten)]
    pub state: LocationState,
    pub message: Option<String>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(rename = "statusCode")]
    pub status_code: u16,
    pub retry: Option<RetryAction>,
}
