use crate::core::{
    aggregator::aggregate,
    distance::{haversine_miles, meters_to_miles, round_tenth},
    ranker::rank,
    scoring::calculate_match_score,
    search::{SearchOrchestrator, SearchSettings},
    taxonomy::categories_for_all,
    zones::{centroid, plan_zones},
};
use crate::models::{
    CandidateRestaurant, GeoPoint, GroupProfile, GroupProfileSummary, ScoredRecommendation,
    ScoringWeights, SearchFilters,
};
use crate::services::{
    geocoder::GeocoderAdapter,
    provider::{BusinessSearchProvider, GeocodingService, PreferenceStore, StoreError},
};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::Instrument;

/// Failures surfaced to callers of [`Recommender::recommend`]
///
/// Every variant past the point where the group profile exists carries its
/// summary, so callers can explain why nothing was found.
#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("no preferences submitted for group {group_id}")]
    EmptyInput { group_id: String },

    #[error("no member location could be resolved")]
    NoLocation { profile: GroupProfileSummary },

    #[error("search provider rate limited every zone")]
    ProviderTransient { profile: GroupProfileSummary },

    #[error("no restaurants found near the group")]
    NoCandidates { profile: GroupProfileSummary },

    #[error("preference store error: {0}")]
    Store(#[source] StoreError),
}

impl RecommendError {
    pub fn profile(&self) -> Option<&GroupProfileSummary> {
        match self {
            RecommendError::NoLocation { profile }
            | RecommendError::ProviderTransient { profile }
            | RecommendError::NoCandidates { profile } => Some(profile),
            RecommendError::EmptyInput { .. } | RecommendError::Store(_) => None,
        }
    }
}

/// Result of one recommendation run
#[derive(Debug, Clone)]
pub struct Recommendation {
    pub recommendations: Vec<ScoredRecommendation>,
    pub profile: GroupProfileSummary,
    pub total_candidates: usize,
}

/// Group recommendation pipeline
///
/// # Pipeline Stages
/// 1. Aggregate stored preferences into a group profile
/// 2. Geocode member locations and take their centroid
/// 3. Plan search zones and query the business search provider
/// 4. Score, rank and truncate
#[derive(Clone)]
pub struct Recommender {
    store: Arc<dyn PreferenceStore>,
    geocoder: GeocoderAdapter,
    search: SearchOrchestrator,
    weights: ScoringWeights,
}

impl Recommender {
    pub fn new(
        store: Arc<dyn PreferenceStore>,
        geocoding: Arc<dyn GeocodingService>,
        provider: Arc<dyn BusinessSearchProvider>,
        settings: SearchSettings,
        weights: ScoringWeights,
    ) -> Self {
        let geocoder = GeocoderAdapter::new(geocoding, Duration::from_secs(settings.geocode_timeout_secs))
            .with_retry(settings.max_attempts, Duration::from_millis(settings.base_delay_ms));
        Self {
            store,
            geocoder,
            search: SearchOrchestrator::new(provider, settings),
            weights,
        }
    }

    pub fn settings(&self) -> &SearchSettings {
        self.search.settings()
    }

    /// Recommend restaurants for a group
    ///
    /// `limit` is capped at the configured maximum result count.
    pub async fn recommend(
        &self,
        group_id: &str,
        limit: Option<usize>,
    ) -> Result<Recommendation, RecommendError> {
        let run_id = uuid::Uuid::new_v4();
        let span = tracing::info_span!("recommend", %run_id, group_id);
        self.run(group_id, limit).instrument(span).await
    }

    async fn run(&self, group_id: &str, limit: Option<usize>) -> Result<Recommendation, RecommendError> {
        let settings = self.search.settings();
        let deadline = tokio::time::Instant::now() + Duration::from_secs(settings.run_deadline_secs);
        let limit = limit.unwrap_or(settings.max_results).min(settings.max_results);

        let preferences = match self.store.list_by_group(group_id).await {
            Ok(prefs) if !prefs.is_empty() => prefs,
            Ok(_) | Err(StoreError::NotFound(_)) => {
                return Err(RecommendError::EmptyInput { group_id: group_id.to_string() });
            }
            Err(e) => {
                tracing::error!("Failed to load preferences for group {}: {}", group_id, e);
                return Err(RecommendError::Store(e));
            }
        };

        let mut profile = aggregate(&preferences)
            .map_err(|_| RecommendError::EmptyInput { group_id: group_id.to_string() })?;

        tracing::info!(
            "Aggregated {} preferences: {} cuisines, budget {}",
            preferences.len(),
            profile.weighted_cuisines.len(),
            profile.consensus_budget.budget
        );

        // Members that fail to geocode still count toward the taste profile
        let addresses: Vec<&str> = preferences.iter().map(|p| p.location_text.as_str()).collect();
        let points: Vec<GeoPoint> = self.geocoder.resolve_all(&addresses).await.into_iter().flatten().collect();

        tracing::info!("Resolved {}/{} member locations", points.len(), addresses.len());

        let center = match centroid(&points) {
            Some(c) => c,
            None => {
                return Err(RecommendError::NoLocation { profile: profile.summary() });
            }
        };
        profile.centroid = Some(center);

        let zones = plan_zones(center, settings.base_radius_miles, settings.points_per_ring);
        let filters = self.build_filters(&profile, Utc::now());

        tracing::debug!("Searching {} zones around {} with {:?}", zones.len(), center, filters);

        let outcome = self.search.search(&zones, &filters, Some(deadline)).await;

        if outcome.candidates.is_empty() {
            return Err(if outcome.only_transient_failures() {
                RecommendError::ProviderTransient { profile: profile.summary() }
            } else {
                RecommendError::NoCandidates { profile: profile.summary() }
            });
        }

        let total_candidates = outcome.candidates.len();
        let scored = outcome
            .candidates
            .into_iter()
            .map(|candidate| self.score_candidate(candidate, &profile, center))
            .collect();

        let recommendations = rank(scored, self.weights.rank_band_miles, limit);

        tracing::info!(
            "Returning {} recommendations (from {} candidates, fallback: {})",
            recommendations.len(),
            total_candidates,
            outcome.used_fallback
        );

        Ok(Recommendation {
            recommendations,
            profile: profile.summary(),
            total_candidates,
        })
    }

    /// Provider filters for the primary pass
    pub fn build_filters(&self, profile: &GroupProfile, now: DateTime<Utc>) -> SearchFilters {
        let settings = self.search.settings();
        let cuisines = profile.cuisines();

        let term = match cuisines.first() {
            Some(top) => format!("{} restaurant", top),
            None => "restaurant".to_string(),
        };

        let open_at = profile
            .earliest_desired_time
            .filter(|t| *t > now)
            .map(|t| t.timestamp());

        // Indian-led groups search the bare `indian` category only
        let categories = match cuisines.first() {
            Some(top) if top.as_str() == "indian" => vec!["indian".to_string()],
            _ => categories_for_all(&cuisines).into_iter().collect(),
        };

        SearchFilters {
            term,
            categories,
            price: Some(profile.consensus_budget.budget.price_filter().to_string()),
            limit: settings.limit,
            sort_by: settings.sort_by.clone(),
            open_now: open_at.is_none(),
            open_at,
        }
    }

    fn score_candidate(
        &self,
        candidate: CandidateRestaurant,
        profile: &GroupProfile,
        center: GeoPoint,
    ) -> ScoredRecommendation {
        let distance = candidate_distance_miles(&candidate, center);
        let match_score = calculate_match_score(&candidate, profile, distance, &self.weights);

        ScoredRecommendation {
            restaurant: candidate,
            distance_miles: round_tenth(distance),
            match_score,
        }
    }
}

/// Distance from the group centroid, falling back to the provider's figure
fn candidate_distance_miles(candidate: &CandidateRestaurant, center: GeoPoint) -> f64 {
    match (candidate.coordinates, candidate.raw_distance_meters) {
        (Some(coords), _) => haversine_miles(center, coords),
        (None, Some(meters)) => meters_to_miles(meters),
        (None, None) => f64::INFINITY,
    }
}
