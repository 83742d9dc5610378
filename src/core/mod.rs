// Core suggestion flow exports
pub mod deeplink;
pub mod distance;
pub mod fallback;
pub mod location;
pub mod suggestion;
pub mod vocabulary;

pub use deeplink::deep_link;
pub use distance::{distance_km, haversine_distance};
pub use fallback::{CandidateSelector, FallbackCatalog, RandomSelector, ToggleSelector};
pub use location::{Geocoder, LocationProvider, LocationResolver, ManualLocation, PermissionGate};
pub use suggestion::{NearbySearch, PlaceSearch, SuggestionOptions, SuggestionResolver};
