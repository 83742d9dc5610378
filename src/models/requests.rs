use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to save preferences, given as display names
///
/// Names are normalized to internal identifiers before storage; unknown
/// names are kept as entered.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SavePreferencesRequest {
    #[serde(default)]
    #[validate(length(max = 32))]
    pub cuisines: Vec<String>,
    #[serde(default)]
    #[validate(length(max = 32))]
    pub atmospheres: Vec<String>,
    #[serde(default)]
    #[serde(alias = "favorite_dishes", rename = "favoriteDishes")]
    #[validate(length(max = 32))]
    pub favorite_dishes: Vec<String>,
}

/// Manual location entry
///
/// Either a coordinate pair or a free-form address. An empty body falls
/// back to the configured default coordinate.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct ManualLocationRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: Option<f64>,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: Option<f64>,
    #[validate(length(min = 1, max = 256))]
    pub address: Option<String>,
}

/// Query parameters for a fallback re-roll
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RerollQuery {
    #[serde(default)]
    pub roll: u32,
}
