use crate::core::{NearbySearch, PlaceSearch};
use crate::models::{ResolutionError, VenueCandidate};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

/// Place search wrapped in an in-memory TTL cache
///
/// Only successful, non-empty answers are cached so a transient provider
/// failure is retried on the next request.
pub struct CachedPlaceSearch {
    inner: Arc<dyn PlaceSearch>,
    cache: moka::future::Cache<String, Arc<Vec<VenueCandidate>>>,
}

impl CachedPlaceSearch {
    pub fn new(inner: Arc<dyn PlaceSearch>, capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, cache }
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            entries: self.cache.entry_count(),
        }
    }
}

#[async_trait]
impl PlaceSearch for CachedPlaceSearch {
    async fn search_nearby(&self, request: &NearbySearch) -> Result<Vec<VenueCandidate>, ResolutionError> {
        let key = CacheKey::nearby(request);

        if let Some(hit) = self.cache.get(&key).await {
            tracing::trace!("Place cache hit: {}", key);
            return Ok(hit.as_ref().clone());
        }

        let candidates = self.inner.search_nearby(request).await?;

        if !candidates.is_empty() {
            self.cache.insert(key.clone(), Arc::new(candidates.clone())).await;
            tracing::trace!("Place cache set: {}", key);
        }

        Ok(candidates)
    }
}

/// Cache statistics
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheStats {
    pub entries: u64,
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Key for a nearby search
    ///
    /// The center is rounded to about 100 m so small GPS jitter reuses the
    /// same entry.
    pub fn nearby(request: &NearbySearch) -> String {
        format!(
            "nearby:{:.3}:{:.3}:{}:{}:{}",
            request.center.latitude,
            request.center.longitude,
            request.radius_meters.round() as u64,
            request.max_results,
            request.included_types.join(",")
        )
    }
}
