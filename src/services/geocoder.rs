use crate::models::GeoPoint;
use crate::services::provider::GeocodingService;
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;

/// Geocoder adapter with failure isolation
///
/// Every failure (no result, provider error, timeout, invalid coordinates)
/// collapses to `None` so one bad address cannot abort a group's run. Rate
/// limited lookups are retried with a doubling delay first.
#[derive(Clone)]
pub struct GeocoderAdapter {
    service: Arc<dyn GeocodingService>,
    timeout: Duration,
    max_attempts: u32,
    base_delay: Duration,
}

impl GeocoderAdapter {
    /// Single attempt per address; see [`GeocoderAdapter::with_retry`]
    pub fn new(service: Arc<dyn GeocodingService>, timeout: Duration) -> Self {
        Self {
            service,
            timeout,
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts.max(1);
        self.base_delay = base_delay;
        self
    }

    /// Resolve one address, or `None` if it is unusable
    pub async fn resolve(&self, address: &str) -> Option<GeoPoint> {
        let address = address.trim();
        if address.is_empty() {
            tracing::warn!("Skipping geocode for empty address");
            return None;
        }

        let mut delay = self.base_delay;

        for attempt in 1..=self.max_attempts {
            let error = match tokio::time::timeout(self.timeout, self.service.geocode(address)).await {
                Ok(Ok(point)) if point.is_valid() => return Some(point),
                Ok(Ok(point)) => {
                    tracing::warn!("Geocoder returned invalid coordinates {} for {:?}", point, address);
                    return None;
                }
                Ok(Err(e)) => e,
                Err(_) => {
                    tracing::warn!("Geocoding timed out after {:?} for {:?}", self.timeout, address);
                    return None;
                }
            };

            if !error.is_retryable() || attempt == self.max_attempts {
                tracing::warn!("Geocoding failed for {:?} after {} attempt(s): {}", address, attempt, error);
                return None;
            }

            tracing::debug!(
                "Geocoding {:?} rate limited (attempt {}/{}), retrying in {:?}",
                address,
                attempt,
                self.max_attempts,
                delay
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        None
    }

    /// Resolve many addresses concurrently, preserving input order
    pub async fn resolve_all<S: AsRef<str>>(&self, addresses: &[S]) -> Vec<Option<GeoPoint>> {
        join_all(addresses.iter().map(|a| self.resolve(a.as_ref()))).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::provider::ProviderError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FixedGeocoder;

    #[async_trait]
    impl GeocodingService for FixedGeocoder {
        async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError> {
            match address {
                "boston" => Ok(GeoPoint::new(42.36, -71.06)),
                "broken" => Ok(GeoPoint::new(f64::NAN, 0.0)),
                "slow" => {
                    tokio::time::sleep(Duration::from_secs(5)).await;
                    Ok(GeoPoint::new(0.0, 0.0))
                }
                "limited" => Err(ProviderError::RateLimited),
                other => Err(ProviderError::NoResult(other.to_string())),
            }
        }
    }

    fn adapter() -> GeocoderAdapter {
        GeocoderAdapter::new(Arc::new(FixedGeocoder), Duration::from_millis(50))
    }

    #[tokio::test]
    async fn test_resolve_success() {
        assert_eq!(adapter().resolve(" boston ").await, Some(GeoPoint::new(42.36, -71.06)));
    }

    #[tokio::test]
    async fn test_failures_become_none() {
        let adapter = adapter();
        assert_eq!(adapter.resolve("nowhere").await, None);
        assert_eq!(adapter.resolve("limited").await, None);
        assert_eq!(adapter.resolve("broken").await, None);
        assert_eq!(adapter.resolve("   ").await, None);
        assert_eq!(adapter.resolve("slow").await, None);
    }

    /// Rate limited for the first `limited_calls` calls, then resolves
    struct QuotaGeocoder {
        limited_calls: usize,
        calls: AtomicUsize,
    }

    #[async_trait]
    impl GeocodingService for QuotaGeocoder {
        async fn geocode(&self, _address: &str) -> Result<GeoPoint, ProviderError> {
            if self.calls.fetch_add(1, Ordering::SeqCst) < self.limited_calls {
                Err(ProviderError::RateLimited)
            } else {
                Ok(GeoPoint::new(42.36, -71.06))
            }
        }
    }

    fn quota_adapter(limited_calls: usize) -> (Arc<QuotaGeocoder>, GeocoderAdapter) {
        let service = Arc::new(QuotaGeocoder { limited_calls, calls: AtomicUsize::new(0) });
        let adapter = GeocoderAdapter::new(service.clone(), Duration::from_millis(50))
            .with_retry(3, Duration::from_millis(1));
        (service, adapter)
    }

    #[tokio::test]
    async fn test_rate_limited_lookup_is_retried() {
        let (service, adapter) = quota_adapter(1);

        assert_eq!(adapter.resolve("boston").await, Some(GeoPoint::new(42.36, -71.06)));
        assert_eq!(service.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rate_limit_retries_are_bounded() {
        let (service, adapter) = quota_adapter(usize::MAX);

        assert_eq!(adapter.resolve("boston").await, None);
        assert_eq!(service.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_no_result_is_not_retried() {
        let adapter = GeocoderAdapter::new(Arc::new(FixedGeocoder), Duration::from_millis(50))
            .with_retry(3, Duration::from_millis(1));
        assert_eq!(adapter.resolve("nowhere").await, None);
    }

    #[test]
    fn test_resolve_all_keeps_order() {
        let results = tokio_test::block_on(adapter().resolve_all(&["nowhere", "boston"]));

        assert_eq!(results, vec![None, Some(GeoPoint::new(42.36, -71.06))]);
    }
}
