// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    Budget, BudgetConsensus, BusinessRecord, CandidateRestaurant, Category, DistanceBand, GeoPoint,
    GroupProfile, GroupProfileSummary, MemberPreference, ScoredRecommendation, ScoringWeights,
    SearchFilters, SearchZone, WeightedCuisine,
};
pub use requests::RecommendRequest;
pub use responses::{ErrorResponse, HealthResponse, RecommendResponse};
