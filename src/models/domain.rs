use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;

/// Placeholder shown for a candidate the provider returned without a name
pub const UNKNOWN_NAME: &str = "Unknown Restaurant";

/// Placeholder shown for a candidate the provider returned without an address
pub const UNKNOWN_ADDRESS: &str = "Unknown Address";

/// The user's saved taste preferences, stored as canonical identifiers
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PreferenceSet {
    #[serde(default)]
    pub cuisines: BTreeSet<String>,
    #[serde(default)]
    pub atmospheres: BTreeSet<String>,
    #[serde(rename = "favoriteDishes", default)]
    pub favorite_dishes: BTreeSet<String>,
}

impl PreferenceSet {
    pub fn is_empty(&self) -> bool {
        self.cuisines.is_empty() && self.atmospheres.is_empty() && self.favorite_dishes.is_empty()
    }
}

/// A point on Earth in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }

    /// Whether both components fall inside their valid ranges
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-90.0..=90.0).contains(&self.latitude)
            && (-180.0..=180.0).contains(&self.longitude)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// A suggested restaurant or bar
///
/// Produced by the places provider or drawn from the fallback catalog.
/// Display fields are optional because providers do not always return them;
/// use [`VenueCandidate::display_name`] and [`VenueCandidate::display_address`]
/// when rendering.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct VenueCandidate {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default)]
    pub coordinate: Option<Coordinate>,
    #[serde(rename = "categoryTags", default)]
    pub category_tags: BTreeSet<String>,
    #[serde(rename = "mapsUrl", default)]
    pub maps_url: Option<String>,
}

impl VenueCandidate {
    pub fn display_name(&self) -> &str {
        non_blank(self.name.as_deref()).unwrap_or(UNKNOWN_NAME)
    }

    pub fn display_address(&self) -> &str {
        non_blank(self.address.as_deref()).unwrap_or(UNKNOWN_ADDRESS)
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Which kind of outing the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SuggestionCategory {
    Food,
    Drinks,
}

impl SuggestionCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuggestionCategory::Food => "food",
            SuggestionCategory::Drinks => "drinks",
        }
    }
}

impl std::str::FromStr for SuggestionCategory {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "food" => Ok(SuggestionCategory::Food),
            "drinks" | "drink" => Ok(SuggestionCategory::Drinks),
            other => Err(format!("unknown suggestion category: {}", other)),
        }
    }
}

/// Why a location or suggestion could not be resolved
///
/// Every variant is recoverable at the presentation boundary.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
#[serde(tag = "reason", content = "message", rename_all = "snake_case")]
pub enum ResolutionError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("request timed out")]
    Timeout,

    #[error("provider error: {0}")]
    ProviderError(String),

    #[error("no results found")]
    NoResultsFound,
}

/// Follow-up action a client can offer after a failed resolution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryAction {
    RequestPermission,
    RetryFetch,
}

impl ResolutionError {
    /// Text suitable for showing to the user
    pub fn user_message(&self) -> &'static str {
        match self {
            ResolutionError::PermissionDenied => {
                "Location permission denied. Please try again or enter location manually."
            }
            ResolutionError::Timeout => "Failed to fetch location, try again or input location",
            ResolutionError::ProviderError(_) => "Something went wrong while looking for places. Please try again.",
            ResolutionError::NoResultsFound => "No places matched your preferences nearby.",
        }
    }

    pub fn retry_action(&self) -> Option<RetryAction> {
        match self {
            ResolutionError::PermissionDenied => Some(RetryAction::RequestPermission),
            ResolutionError::Timeout | ResolutionError::ProviderError(_) => Some(RetryAction::RetryFetch),
            ResolutionError::NoResultsFound => None,
        }
    }
}

/// Where the location resolver currently is
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum LocationState {
    Idle,
    RequestingPermission,
    Fetching,
    Resolved { coordinate: Coordinate },
    Failed { error: ResolutionError },
}

impl LocationState {
    pub fn coordinate(&self) -> Option<Coordinate> {
        match self {
            LocationState::Resolved { coordinate } => Some(*coordinate),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, LocationState::RequestingPermission | LocationState::Fetching)
    }
}
