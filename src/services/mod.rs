// Service exports
pub mod cache;
pub mod geocoding;
pub mod location;
pub mod places;
pub mod preferences;

pub use cache::{CacheKey, CacheStats, CachedPlaceSearch};
pub use geocoding::{GeocodingError, HttpGeocoder};
pub use location::{HttpLocationProvider, LocationError, NoLocationProvider, StaticPermission};
pub use places::{PlacesClient, PlacesError};
pub use preferences::{PreferenceStore, StoreError};
