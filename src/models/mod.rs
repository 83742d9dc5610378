// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Coordinate, LocationState, PreferenceSet, ResolutionError, RetryAction, SuggestionCategory, VenueCandidate,
    UNKNOWN_ADDRESS, UNKNOWN_NAME,
};
pub use requests::{ManualLocationRequest, RerollQuery, SavePreferencesRequest};
pub use responses::{ErrorResponse, HealthResponse, LocationResponse, SuggestionSource, SuggestionView, SuggestionsResponse};
