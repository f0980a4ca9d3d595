// Unit tests for the GrubSync recommendation engine

use grubsync_engine::core::{
    aggregate,
    distance::{haversine_miles, offset_miles},
    rank,
    scoring::calculate_match_score,
    taxonomy::{categories_for, categories_for_all},
    zones::{centroid, plan_zones},
};
use grubsync_engine::models::{
    Budget, CandidateRestaurant, Category, GeoPoint, MemberPreference, ScoredRecommendation,
    ScoringWeights,
};

fn member(cuisines: &[&str], spice: u8, budget: Budget) -> MemberPreference {
    MemberPreference {
        member_id: format!("m{}", cuisines.len()),
        cuisine_types: cuisines.iter().map(|c| c.to_string()).collect(),
        dietary_restrictions: vec![],
        spice_level: spice,
        budget,
        location_text: "Boston, MA".to_string(),
        desired_time: None,
    }
}

fn candidate(id: &str, rating: f64, reviews: u32, price: Option<Budget>, cuisine: &str) -> CandidateRestaurant {
    CandidateRestaurant {
        id: id.to_string(),
        name: format!("Restaurant {}", id),
        rating,
        review_count: reviews,
        price_tier: price,
        categories: vec![Category {
            alias: cuisine.to_string(),
            title: cuisine.to_string(),
        }],
        coordinates: None,
        raw_distance_meters: None,
        image_url: None,
        url: None,
        address: String::new(),
        phone: None,
    }
}

fn scored(id: &str, distance: f64, score: u8) -> ScoredRecommendation {
    ScoredRecommendation {
        restaurant: candidate(id, 4.0, 10, None, "thai"),
        distance_miles: distance,
        match_score: score,
    }
}

#[test]
fn test_aggregate_group_profile() {
    let members = vec![
        member(&["Thai", "Korean"], 4, Budget::Pricey),
        member(&["thai"], 2, Budget::Pricey),
        member(&["korean", "thai"], 5, Budget::Inexpensive),
    ];

    let profile = aggregate(&members).unwrap();

    assert_eq!(profile.cuisines(), vec!["thai", "korean"]);
    assert_eq!(profile.weighted_cuisines[0].count, 3);
    assert!((profile.weighted_cuisines[1].weight - 2.0 / 3.0).abs() < 1e-9);
    assert_eq!(profile.consensus_budget.budget, Budget::Pricey);
    // (4 + 2 + 5) / 3 = 3.67
    assert_eq!(profile.average_spice_level, 4);
}

#[test]
fn test_three_member_weights() {
    let members = vec![
        member(&["italian"], 3, Budget::Moderate),
        member(&["italian"], 3, Budget::Moderate),
        member(&["mexican"], 3, Budget::Pricey),
    ];

    let profile = aggregate(&members).unwrap();

    assert_eq!(profile.cuisines(), vec!["italian", "mexican"]);
    assert!((profile.weighted_cuisines[0].weight - 2.0 / 3.0).abs() < 1e-9);
    assert!((profile.weighted_cuisines[1].weight - 1.0 / 3.0).abs() < 1e-9);
    assert_eq!(profile.consensus_budget.budget, Budget::Moderate);
    assert_eq!(profile.consensus_budget.count, 2);
}

#[test]
fn test_aggregate_rejects_empty_group() {
    assert!(aggregate(&[]).is_err());
}

#[test]
fn test_budget_tie_prefers_moderate() {
    let members = vec![
        member(&["thai"], 3, Budget::Inexpensive),
        member(&["thai"], 3, Budget::Moderate),
    ];
    assert_eq!(aggregate(&members).unwrap().consensus_budget.budget, Budget::Moderate);
}

#[test]
fn test_category_lookup() {
    assert!(categories_for("Japanese").contains("sushi"));
    assert_eq!(categories_for("ethiopian").into_iter().collect::<Vec<_>>(), vec!["ethiopian"]);

    // Shared aliases appear once
    let all = categories_for_all(["mediterranean", "middle eastern"]);
    assert_eq!(all.iter().filter(|c| c.as_str() == "lebanese").count(), 1);
}

#[test]
fn test_haversine_boston_to_cambridge() {
    let boston = GeoPoint::new(42.3601, -71.0589);
    let cambridge = GeoPoint::new(42.3736, -71.1097);

    let distance = haversine_miles(boston, cambridge);
    assert!(distance > 2.0 && distance < 3.5);
}

#[test]
fn test_zone_plan_shape() {
    let center = GeoPoint::new(40.7128, -74.0060);

    assert_eq!(plan_zones(center, 8.0, 4).len(), 13);
    assert_eq!(plan_zones(center, 8.0, 6).len(), 19);

    let zones = plan_zones(center, 8.0, 4);
    assert_eq!(zones[0].center, center);
    for zone in &zones[1..] {
        let d = haversine_miles(center, zone.center);
        assert!(d > 1.5 && d < 6.5, "zone at {} is {} miles out", zone.center, d);
    }
}

#[test]
fn test_centroid_ignores_member_order() {
    let a = GeoPoint::new(42.0, -71.0);
    let b = GeoPoint::new(43.0, -72.0);
    let c = offset_miles(a, 10.0, 1.0);

    let forward = centroid(&[a, b, c]).unwrap();
    let backward = centroid(&[c, b, a]).unwrap();

    assert!((forward.lat - backward.lat).abs() < 1e-9);
    assert!((forward.lng - backward.lng).abs() < 1e-9);
    assert!(centroid(&[]).is_none());
}

#[test]
fn test_match_score_range() {
    let profile = aggregate(&[member(&["thai"], 3, Budget::Moderate)]).unwrap();
    let weights = ScoringWeights::default();

    let best = candidate("best", 5.0, 10_000, Some(Budget::Moderate), "thai");
    let worst = candidate("worst", 0.0, 0, Some(Budget::Luxury), "steak");

    let high = calculate_match_score(&best, &profile, 0.5, &weights);
    let low = calculate_match_score(&worst, &profile, 50.0, &weights);

    assert!(high > low);
    assert!(high <= 100);
    assert_eq!(low, 0);

    // Unknown distance scores like one past every band
    let unknown = calculate_match_score(&best, &profile, f64::NAN, &weights);
    assert_eq!(unknown, calculate_match_score(&best, &profile, f64::INFINITY, &weights));
}

#[test]
fn test_rank_orders_by_score_within_band() {
    let ranked = rank(
        vec![scored("near", 0.5, 40), scored("better", 1.5, 90), scored("far", 6.0, 100)],
        2.0,
        10,
    );

    let ids: Vec<_> = ranked.iter().map(|r| r.restaurant.id.as_str()).collect();
    assert_eq!(ids, vec!["better", "near", "far"]);
}

#[test]
fn test_rank_truncates() {
    let recs = (0..20).map(|i| scored(&i.to_string(), i as f64, 50)).collect();
    assert_eq!(rank(recs, 2.0, 10).len(), 10);
}
