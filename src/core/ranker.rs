use crate::models::ScoredRecommendation;
use std::cmp::Ordering;

/// Order recommendations by distance, letting score win inside a distance band
///
/// Greedy pass over the distance-sorted list: the nearest remaining candidate
/// opens a window of `band_miles`, and the best-scoring candidate strictly
/// inside that window is emitted next (nearer first on equal scores). Two
/// candidates less than `band_miles` apart are therefore ordered by score,
/// while a candidate outside the window never jumps ahead of a nearer one.
pub fn rank(
    mut recommendations: Vec<ScoredRecommendation>,
    band_miles: f64,
    limit: usize,
) -> Vec<ScoredRecommendation> {
    recommendations.sort_by(|a, b| by_distance(a, b).then_with(|| b.match_score.cmp(&a.match_score)));

    let mut ranked = Vec::with_capacity(limit.min(recommendations.len()));
    while !recommendations.is_empty() && ranked.len() < limit {
        let anchor = recommendations[0].distance_miles;

        let mut best = 0;
        for (i, rec) in recommendations.iter().enumerate().skip(1) {
            if rec.distance_miles - anchor >= band_miles {
                break;
            }
            if rec.match_score > recommendations[best].match_score {
                best = i;
            }
        }

        ranked.push(recommendations.remove(best));
    }

    ranked
}

#[inline]
fn by_distance(a: &ScoredRecommendation, b: &ScoredRecommendation) -> Ordering {
    a.distance_miles.total_cmp(&b.distance_miles)
}
