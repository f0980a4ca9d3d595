//! GrubSync recommendation engine
//!
//! Turns a group's submitted dining preferences into a ranked list of nearby
//! restaurants: preferences are aggregated into a group profile, member
//! addresses are geocoded into a centroid, a zone plan around it is searched
//! through the business search provider, and the merged candidates are scored
//! and ranked.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{aggregate, calculate_match_score, plan_zones, rank, Recommendation, RecommendError, Recommender};
pub use crate::models::{GroupProfile, MemberPreference, RecommendRequest, RecommendResponse, ScoredRecommendation, ScoringWeights};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GeoPoint;

    #[test]
    fn test_library_exports() {
        let zones = plan_zones(GeoPoint::new(40.7128, -74.0060), 8.0, 4);
        assert_eq!(zones.len(), 13);
    }
}
