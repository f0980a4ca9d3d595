// Service exports
pub mod cache;
pub mod geocoder;
pub mod google;
pub mod postgres;
pub mod provider;
pub mod yelp;

pub use cache::{CacheKey, CachedGeocoder};
pub use geocoder::GeocoderAdapter;
pub use google::GoogleGeocoder;
pub use postgres::PgPreferenceStore;
pub use provider::{BusinessSearchProvider, GeocodingService, PreferenceStore, ProviderError, StoreError};
pub use yelp::YelpClient;
