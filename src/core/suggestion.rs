use crate::core::vocabulary::provider_tag;
use crate::models::{Coordinate, ResolutionError, VenueCandidate};
use async_trait::async_trait;
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;

pub const DEFAULT_RADIUS_METERS: f64 = 5000.0;
pub const DEFAULT_MAX_RESULTS: u32 = 1;
pub const DEFAULT_SEARCH_TIMEOUT: Duration = Duration::from_secs(10);

/// One nearby search against the places provider
#[derive(Debug, Clone, PartialEq)]
pub struct NearbySearch {
    pub center: Coordinate,
    pub radius_meters: f64,
    pub included_types: Vec<String>,
    pub max_results: u32,
}

/// External place-search capability
#[async_trait]
pub trait PlaceSearch: Send + Sync {
    async fn search_nearby(&self, request: &NearbySearch) -> Result<Vec<VenueCandidate>, ResolutionError>;
}

/// Tunables for [`SuggestionResolver`]
#[derive(Debug, Clone, Copy)]
pub struct SuggestionOptions {
    pub radius_meters: f64,
    pub max_results: u32,
    pub timeout: Duration,
}

impl Default for SuggestionOptions {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            max_results: DEFAULT_MAX_RESULTS,
            timeout: DEFAULT_SEARCH_TIMEOUT,
        }
    }
}

/// Turns a location plus cuisine preferences into venue candidates
///
/// Results come back in provider order; nothing is re-ranked here.
#[derive(Clone)]
pub struct SuggestionResolver {
    search: Arc<dyn PlaceSearch>,
    options: SuggestionOptions,
}

impl SuggestionResolver {
    pub fn new(search: Arc<dyn PlaceSearch>, options: SuggestionOptions) -> Self {
        Self { search, options }
    }

    pub fn options(&self) -> &SuggestionOptions {
        &self.options
    }

    /// Build the provider request for a set of cuisine identifiers
    ///
    /// Returns `None` when no usable category is left after mapping.
    pub fn build_request(&self, coordinate: Coordinate, cuisines: &BTreeSet<String>) -> Option<NearbySearch> {
        let included_types: Vec<String> = cuisines
            .iter()
            .filter_map(|c| provider_tag(c))
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();

        if included_types.is_empty() {
            return None;
        }

        Some(NearbySearch {
            center: coordinate,
            radius_meters: self.options.radius_meters,
            included_types,
            max_results: self.options.max_results.max(1),
        })
    }

    pub async fn resolve(
        &self,
        coordinate: Coordinate,
        cuisines: &BTreeSet<String>,
    ) -> Result<Vec<VenueCandidate>, ResolutionError> {
        let request = match self.build_request(coordinate, cuisines) {
            Some(request) => request,
            None => {
                tracing::debug!("No cuisine preferences set, skipping place search");
                return Err(ResolutionError::NoResultsFound);
            }
        };

        tracing::debug!(
            "Searching {:?} within {}m of {} (max {})",
            request.included_types,
            request.radius_meters,
            request.center,
            request.max_results
        );

        let candidates = tokio::time::timeout(self.options.timeout, self.search.search_nearby(&request))
            .await
            .map_err(|_| {
                tracing::warn!("Place search timed out after {:?}", self.options.timeout);
                ResolutionError::Timeout
            })??;

        if candidates.is_empty() {
            return Err(ResolutionError::NoResultsFound);
        }

        tracing::info!("Place search returned {} candidates", candidates.len());
        Ok(candidates)
    }
}
