use crate::core::taxonomy::normalize_cuisine;
use crate::models::{Budget, BudgetConsensus, GroupProfile, MemberPreference, WeightedCuisine};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AggregateError {
    #[error("no preferences to aggregate")]
    EmptyInput,
}

/// Reduce member preferences into one group profile
///
/// The returned profile has no centroid; that is filled in once member
/// locations have been geocoded.
pub fn aggregate(preferences: &[MemberPreference]) -> Result<GroupProfile, AggregateError> {
    if preferences.is_empty() {
        return Err(AggregateError::EmptyInput);
    }

    Ok(GroupProfile {
        weighted_cuisines: weighted_cuisines(preferences),
        dietary_restrictions: union_dietary_restrictions(preferences),
        average_spice_level: average_spice_level(preferences),
        consensus_budget: consensus_budget(preferences),
        earliest_desired_time: preferences.iter().filter_map(|p| p.desired_time).min(),
        centroid: None,
    })
}

/// Cuisine weights as a fraction of total members
///
/// Sorted by descending weight; equal weights keep first-seen order.
pub fn weighted_cuisines(preferences: &[MemberPreference]) -> Vec<WeightedCuisine> {
    let total = preferences.len();
    let mut order: Vec<String> = Vec::new();
    let mut counts: HashMap<String, usize> = HashMap::new();

    for pref in preferences {
        // A member listing the same cuisine twice still counts once
        let mut listed = HashSet::new();
        for raw in &pref.cuisine_types {
            let cuisine = normalize_cuisine(raw);
            if cuisine.is_empty() || !listed.insert(cuisine.clone()) {
                continue;
            }
            let count = counts.entry(cuisine.clone()).or_insert(0);
            if *count == 0 {
                order.push(cuisine);
            }
            *count += 1;
        }
    }

    let mut weighted: Vec<WeightedCuisine> = order
        .into_iter()
        .map(|cuisine| {
            let count = counts[&cuisine];
            WeightedCuisine {
                cuisine,
                weight: count as f64 / total as f64,
                count,
            }
        })
        .collect();

    // Stable sort on the integer count keeps insertion order for ties
    weighted.sort_by(|a, b| b.count.cmp(&a.count));
    weighted
}

/// Lowercased union of every member's restrictions, first-seen order
pub fn union_dietary_restrictions(preferences: &[MemberPreference]) -> Vec<String> {
    let mut seen = HashSet::new();
    preferences
        .iter()
        .flat_map(|p| p.dietary_restrictions.iter())
        .map(|r| r.trim().to_lowercase())
        .filter(|r| !r.is_empty() && seen.insert(r.clone()))
        .collect()
}

/// Mean spice level rounded half-up
pub fn average_spice_level(preferences: &[MemberPreference]) -> u8 {
    if preferences.is_empty() {
        return 0;
    }
    let n = preferences.len() as u64;
    let sum: u64 = preferences.iter().map(|p| p.spice_level as u64).sum();
    ((2 * sum + n) / (2 * n)) as u8
}

/// Plurality budget tier; ties resolved by `Budget::TIE_BREAK`
pub fn consensus_budget(preferences: &[MemberPreference]) -> BudgetConsensus {
    let total = preferences.len().max(1);
    let count_of = |tier: Budget| preferences.iter().filter(|p| p.budget == tier).count();

    let mut best = BudgetConsensus {
        budget: Budget::TIE_BREAK[0],
        weight: 0.0,
        count: count_of(Budget::TIE_BREAK[0]),
    };
    for tier in Budget::TIE_BREAK.iter().skip(1) {
        let count = count_of(*tier);
        if count > best.count {
            best = BudgetConsensus { budget: *tier, weight: 0.0, count };
        }
    }

    best.weight = best.count as f64 / total as f64;
    best
}
