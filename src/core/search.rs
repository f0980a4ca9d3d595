use crate::models::{BusinessRecord, CandidateRestaurant, SearchFilters, SearchZone};
use crate::services::provider::BusinessSearchProvider;
use futures::stream::{self, Stream, StreamExt};
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;

/// Tunables for the zone search
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SearchSettings {
    pub base_radius_miles: f64,
    pub points_per_ring: usize,
    pub radius_meters: u32,
    /// Provider ceiling; every request radius is clamped to this
    pub max_radius_meters: u32,
    pub limit: u32,
    pub sort_by: String,
    pub target_candidates: usize,
    pub min_candidates: usize,
    pub fallback_zone_count: usize,
    pub fallback_radius_meters: u32,
    pub fallback_limit: u32,
    pub fallback_target: usize,
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub zone_timeout_secs: u64,
    pub concurrency: usize,
    pub run_deadline_secs: u64,
    pub geocode_timeout_secs: u64,
    pub max_results: usize,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            base_radius_miles: 8.0,
            points_per_ring: 4,
            radius_meters: 8000,
            max_radius_meters: 40000,
            limit: 20,
            sort_by: "distance".to_string(),
            target_candidates: 20,
            min_candidates: 5,
            fallback_zone_count: 2,
            fallback_radius_meters: 16000,
            fallback_limit: 50,
            fallback_target: 10,
            max_attempts: 3,
            base_delay_ms: 1000,
            zone_timeout_secs: 10,
            concurrency: 4,
            run_deadline_secs: 30,
            geocode_timeout_secs: 10,
            max_results: 10,
        }
    }
}

/// How a single zone query ended
#[derive(Debug)]
enum ZoneOutcome {
    Found(Vec<BusinessRecord>),
    /// Still rate limited after the last allowed attempt
    RateLimited,
    Failed,
}

/// Result of a full search run
#[derive(Debug, Default)]
pub struct SearchOutcome {
    pub candidates: Vec<CandidateRestaurant>,
    pub zones_queried: usize,
    pub zones_succeeded: usize,
    pub zones_rate_limited: usize,
    pub used_fallback: bool,
    pub deadline_hit: bool,
}

impl SearchOutcome {
    /// Every queried zone failed and at least one ran out of rate-limit retries
    pub fn only_transient_failures(&self) -> bool {
        self.zones_queried > 0 && self.zones_succeeded == 0 && self.zones_rate_limited > 0
    }
}

/// Single-writer merge of zone results, keyed by provider business id
#[derive(Debug, Default)]
struct CandidateSet {
    seen: HashSet<String>,
    candidates: Vec<CandidateRestaurant>,
}

impl CandidateSet {
    fn merge(&mut self, records: Vec<BusinessRecord>) -> usize {
        let before = self.candidates.len();
        for record in records {
            if self.seen.insert(record.id.clone()) {
                self.candidates.push(record.into());
            }
        }
        self.candidates.len() - before
    }

    fn len(&self) -> usize {
        self.candidates.len()
    }
}

/// Issues zone queries against the business search provider
///
/// Primary pass: every zone with the cuisine/price filters until the target
/// count is reached. Fallback pass: when the primary pass ends below the
/// floor, the first few zones are searched again with relaxed filters.
#[derive(Clone)]
pub struct SearchOrchestrator {
    provider: Arc<dyn BusinessSearchProvider>,
    settings: SearchSettings,
}

impl SearchOrchestrator {
    pub fn new(provider: Arc<dyn BusinessSearchProvider>, settings: SearchSettings) -> Self {
        Self { provider, settings }
    }

    pub fn settings(&self) -> &SearchSettings {
        &self.settings
    }

    /// Relaxed filters for the fallback pass: no category or price restriction
    pub fn relaxed_filters(&self, filters: &SearchFilters) -> SearchFilters {
        SearchFilters {
            term: filters.term.clone(),
            categories: Vec::new(),
            price: None,
            limit: self.settings.fallback_limit,
            sort_by: filters.sort_by.clone(),
            open_now: filters.open_now,
            open_at: filters.open_at,
        }
    }

    /// Run the primary pass and, if needed, the fallback pass
    pub async fn search(
        &self,
        zones: &[SearchZone],
        filters: &SearchFilters,
        deadline: Option<Instant>,
    ) -> SearchOutcome {
        let mut outcome = SearchOutcome::default();
        let mut merged = CandidateSet::default();

        self.run_pass(
            zones,
            filters,
            self.settings.radius_meters,
            self.settings.target_candidates,
            deadline,
            &mut merged,
            &mut outcome,
        )
        .await;

        tracing::info!(
            "Primary search found {} unique candidates across {} zones",
            merged.len(),
            outcome.zones_queried
        );

        if merged.len() < self.settings.min_candidates && !outcome.deadline_hit {
            tracing::info!(
                "Only {} candidates (floor {}), running fallback search",
                merged.len(),
                self.settings.min_candidates
            );
            outcome.used_fallback = true;

            let fallback_zones = &zones[..zones.len().min(self.settings.fallback_zone_count)];
            let relaxed = self.relaxed_filters(filters);
            self.run_pass(
                fallback_zones,
                &relaxed,
                self.settings.fallback_radius_meters,
                self.settings.fallback_target,
                deadline,
                &mut merged,
                &mut outcome,
            )
            .await;
        }

        outcome.candidates = merged.candidates;
        outcome
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_pass(
        &self,
        zones: &[SearchZone],
        filters: &SearchFilters,
        radius_meters: u32,
        target: usize,
        deadline: Option<Instant>,
        merged: &mut CandidateSet,
        outcome: &mut SearchOutcome,
    ) {
        if merged.len() >= target {
            return;
        }

        let radius = radius_meters.min(self.settings.max_radius_meters);
        let mut results = Box::pin(
            stream::iter(zones.iter().copied())
                .map(|zone| self.search_zone(zone, filters, radius, deadline))
                .buffered(self.settings.concurrency.max(1)),
        );

        while let Some(zone_outcome) = next_before(&mut results, deadline).await {
            outcome.zones_queried += 1;
            match zone_outcome {
                ZoneOutcome::Found(records) => {
                    outcome.zones_succeeded += 1;
                    let added = merged.merge(records);
                    tracing::debug!("Zone merged {} new candidates ({} total)", added, merged.len());
                }
                ZoneOutcome::RateLimited => outcome.zones_rate_limited += 1,
                ZoneOutcome::Failed => {}
            }

            if merged.len() >= target {
                tracing::debug!("Reached {} candidates, skipping remaining zones", target);
                return;
            }
        }

        if deadline.is_some_and(|d| Instant::now() >= d) {
            tracing::warn!("Search deadline reached, continuing with {} candidates", merged.len());
            outcome.deadline_hit = true;
        }
    }

    /// Query one zone with bounded retry on rate limiting
    async fn search_zone(
        &self,
        zone: SearchZone,
        filters: &SearchFilters,
        radius_meters: u32,
        deadline: Option<Instant>,
    ) -> ZoneOutcome {
        let max_attempts = self.settings.max_attempts.max(1);
        let zone_timeout = Duration::from_secs(self.settings.zone_timeout_secs);
        let mut delay = Duration::from_millis(self.settings.base_delay_ms);

        for attempt in 1..=max_attempts {
            let call = self.provider.search(zone.center, radius_meters, filters);
            let error = match tokio::time::timeout(zone_timeout, call).await {
                Ok(Ok(records)) => return ZoneOutcome::Found(records),
                Ok(Err(e)) => e,
                Err(_) => {
                    tracing::warn!("Zone search at {} timed out after {:?}", zone.center, zone_timeout);
                    return ZoneOutcome::Failed;
                }
            };

            if !error.is_retryable() {
                tracing::warn!("Zone search error ({}): {}", zone.center, error);
                return ZoneOutcome::Failed;
            }

            if attempt == max_attempts {
                tracing::warn!("Zone search at {} still rate limited after {} attempts", zone.center, attempt);
                return ZoneOutcome::RateLimited;
            }

            if deadline.is_some_and(|d| Instant::now() + delay >= d) {
                tracing::warn!("Zone search at {} rate limited, no time left to retry", zone.center);
                return ZoneOutcome::RateLimited;
            }

            tracing::debug!(
                "Zone search at {} rate limited (attempt {}/{}), retrying in {:?}",
                zone.center,
                attempt,
                max_attempts,
                delay
            );
            tokio::time::sleep(delay).await;
            delay *= 2;
        }

        ZoneOutcome::RateLimited
    }
}

/// Next stream item, or `None` once the deadline passes
async fn next_before<S>(stream: &mut S, deadline: Option<Instant>) -> Option<S::Item>
where
    S: Stream + Unpin,
{
    match deadline {
        Some(d) => tokio::time::timeout_at(d, stream.next()).await.ok().flatten(),
        None => stream.next().await,
    }
}
