use crate::models::GeoPoint;
use crate::services::provider::{GeocodingService, ProviderError};
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// In-memory geocode cache in front of another geocoding service
///
/// Only successful lookups are cached; misses and provider errors always go
/// back to the wrapped service on the next call.
pub struct CachedGeocoder {
    inner: Arc<dyn GeocodingService>,
    cache: moka::future::Cache<String, GeoPoint>,
}

impl CachedGeocoder {
    pub fn new(inner: Arc<dyn GeocodingService>, capacity: u64, ttl_secs: u64) -> Self {
        let cache = moka::future::CacheBuilder::new(capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self { inner, cache }
    }

    pub fn entry_count(&self) -> u64 {
        self.cache.entry_count()
    }
}

/// Cache key builder
pub struct CacheKey;

impl CacheKey {
    /// Addresses differing only in case or surrounding whitespace share a key
    pub fn address(address: &str) -> String {
        format!("geocode:{}", address.trim().to_lowercase())
    }
}

#[async_trait]
impl GeocodingService for CachedGeocoder {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError> {
        let key = CacheKey::address(address);

        if let Some(point) = self.cache.get(&key).await {
            tracing::trace!("Geocode cache hit: {}", key);
            return Ok(point);
        }

        let point = self.inner.geocode(address).await?;
        self.cache.insert(key, point).await;
        Ok(point)
    }
}
