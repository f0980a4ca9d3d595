use crate::models::{BusinessRecord, GeoPoint, MemberPreference, SearchFilters};
use async_trait::async_trait;
use thiserror::Error;

/// Errors returned by the external geocoding and business search providers
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("rate limited by provider")]
    RateLimited,

    #[error("no result for {0}")]
    NoResult(String),

    #[error("API returned error: {0}")]
    Api(String),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ProviderError {
    /// Only rate limiting is worth retrying
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderError::RateLimited)
    }
}

/// Errors returned by the preference store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("SQLx error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("Invalid record: {0}")]
    InvalidRecord(String),
}

/// Source of submitted member preferences
#[async_trait]
pub trait PreferenceStore: Send + Sync {
    /// All preferences for a group, in submission order
    async fn list_by_group(&self, group_id: &str) -> Result<Vec<MemberPreference>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Address to coordinate lookup
#[async_trait]
pub trait GeocodingService: Send + Sync {
    async fn geocode(&self, address: &str) -> Result<GeoPoint, ProviderError>;
}

/// Geo-area business search
#[async_trait]
pub trait BusinessSearchProvider: Send + Sync {
    async fn search(
        &self,
        center: GeoPoint,
        radius_meters: u32,
        filters: &SearchFilters,
    ) -> Result<Vec<BusinessRecord>, ProviderError>;
}
