use serde::{Deserialize, Serialize};
use crate::models::domain::{GroupProfileSummary, ScoredRecommendation};

/// Response for the recommend endpoint
#[derive(Debug, Clone, Serialize)]
pub struct RecommendResponse {
    pub message: String,
    pub recommendations: Vec<ScoredRecommendation>,
    pub preferences: GroupProfileSummary,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferences: Option<GroupProfileSummary>,
}
