// Core algorithm exports
pub mod aggregator;
pub mod distance;
pub mod ranker;
pub mod recommender;
pub mod scoring;
pub mod search;
pub mod taxonomy;
pub mod zones;

pub use aggregator::{aggregate, AggregateError};
pub use distance::{haversine_miles, meters_to_miles};
pub use ranker::rank;
pub use recommender::{Recommendation, RecommendError, Recommender};
pub use scoring::calculate_match_score;
pub use search::{SearchOrchestrator, SearchOutcome, SearchSettings};
pub use taxonomy::{categories_for, categories_for_all};
pub use zones::{centroid, plan_zones};
