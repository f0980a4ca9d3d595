use crate::models::{Budget, CandidateRestaurant, GroupProfile, ScoringWeights, WeightedCuisine};

/// Calculate a match score (0-100) for a restaurant against the group profile
///
/// Scoring formula (each term capped before summing):
/// score = (
///     distance_band +        # 60 / 45 / 25 / 10 / -10, dominates on purpose
///     cuisine_overlap +      # 25 * weight per matching cuisine, capped at 25
///     rating / 5 * 10 +
///     min(reviews / 200 * 5, 5) +
///     budget_fit             # 8 exact, 4 one tier away
/// )
pub fn calculate_match_score(
    candidate: &CandidateRestaurant,
    profile: &GroupProfile,
    distance_miles: f64,
    weights: &ScoringWeights,
) -> u8 {
    let total = distance_score(distance_miles, weights)
        + cuisine_score(candidate, &profile.weighted_cuisines, weights)
        + rating_score(candidate.rating, weights)
        + review_score(candidate.review_count, weights)
        + budget_score(candidate.price_tier, profile.consensus_budget.budget, weights);

    if total.is_nan() {
        return 0;
    }
    total.round().clamp(0.0, 100.0) as u8
}

/// Banded distance term; anything past the last band (or not finite) gets `beyond_bands`
#[inline]
pub fn distance_score(distance_miles: f64, weights: &ScoringWeights) -> f64 {
    weights
        .distance_bands
        .iter()
        .find(|band| distance_miles <= band.max_miles)
        .map(|band| band.points)
        .unwrap_or(weights.beyond_bands)
}

/// Sum of weights for cuisines found in the candidate's category aliases or titles
pub fn cuisine_score(
    candidate: &CandidateRestaurant,
    cuisines: &[WeightedCuisine],
    weights: &ScoringWeights,
) -> f64 {
    let categories: Vec<(String, String)> = candidate
        .categories
        .iter()
        .map(|c| (c.alias.to_lowercase(), c.title.to_lowercase()))
        .collect();

    let score: f64 = cuisines
        .iter()
        .filter(|wc| {
            let needle = wc.cuisine.to_lowercase();
            !needle.is_empty()
                && categories
                    .iter()
                    .any(|(alias, title)| alias.contains(&needle) || title.contains(&needle))
        })
        .map(|wc| weights.cuisine_cap * wc.weight)
        .sum();

    score.min(weights.cuisine_cap)
}

#[inline]
fn rating_score(rating: f64, weights: &ScoringWeights) -> f64 {
    if !rating.is_finite() {
        return 0.0;
    }
    (rating.clamp(0.0, 5.0) / 5.0) * weights.rating_max
}

#[inline]
fn review_score(review_count: u32, weights: &ScoringWeights) -> f64 {
    if weights.review_saturation <= 0.0 {
        return weights.review_max;
    }
    (review_count as f64 / weights.review_saturation * weights.review_max).min(weights.review_max)
}

#[inline]
fn budget_score(price: Option<Budget>, consensus: Budget, weights: &ScoringWeights) -> f64 {
    match price {
        Some(tier) if tier == consensus => weights.budget_exact,
        Some(tier) if tier.is_adjacent(consensus) => weights.budget_adjacent,
        _ => 0.0,
    }
}
