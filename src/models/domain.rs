use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Price tier shared by member budgets and restaurant listings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Budget {
    #[serde(rename = "$")]
    Inexpensive,
    #[default]
    #[serde(rename = "$$")]
    Moderate,
    #[serde(rename = "$$$")]
    Pricey,
    #[serde(rename = "$$$$")]
    Luxury,
}

impl Budget {
    /// Canonical tier order, cheapest first
    pub const ALL: [Budget; 4] = [
        Budget::Inexpensive,
        Budget::Moderate,
        Budget::Pricey,
        Budget::Luxury,
    ];

    /// Order used to break plurality ties in the consensus vote
    pub const TIE_BREAK: [Budget; 4] = [
        Budget::Moderate,
        Budget::Inexpensive,
        Budget::Pricey,
        Budget::Luxury,
    ];

    /// Numeric tier, 1 for `$` through 4 for `$$$$`
    pub fn tier(self) -> u8 {
        match self {
            Budget::Inexpensive => 1,
            Budget::Moderate => 2,
            Budget::Pricey => 3,
            Budget::Luxury => 4,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Budget::Inexpensive => "$",
            Budget::Moderate => "$$",
            Budget::Pricey => "$$$",
            Budget::Luxury => "$$$$",
        }
    }

    /// Provider price filter: every tier up to and including this one
    pub fn price_filter(self) -> &'static str {
        match self {
            Budget::Inexpensive => "1",
            Budget::Moderate => "1,2",
            Budget::Pricey => "1,2,3",
            Budget::Luxury => "1,2,3,4",
        }
    }

    /// True when the two tiers are exactly one step apart
    pub fn is_adjacent(self, other: Budget) -> bool {
        self.tier().abs_diff(other.tier()) == 1
    }
}

impl fmt::Display for Budget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Budget {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "$" => Ok(Budget::Inexpensive),
            "$$" => Ok(Budget::Moderate),
            "$$$" => Ok(Budget::Pricey),
            "$$$$" => Ok(Budget::Luxury),
            other => Err(format!("unknown budget tier: {other:?}")),
        }
    }
}

fn default_spice_level() -> u8 { 3 }

/// One member's submitted dining preferences for a group
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberPreference {
    #[serde(rename = "memberId")]
    pub member_id: String,
    #[serde(rename = "cuisineTypes", default)]
    pub cuisine_types: Vec<String>,
    #[serde(rename = "dietaryRestrictions", default)]
    pub dietary_restrictions: Vec<String>,
    #[serde(rename = "spiceLevel", default = "default_spice_level")]
    pub spice_level: u8,
    #[serde(default)]
    pub budget: Budget,
    #[serde(rename = "location")]
    pub location_text: String,
    #[serde(rename = "dateTime", default)]
    pub desired_time: Option<DateTime<Utc>>,
}

/// Geographic coordinate in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

impl GeoPoint {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Finite and inside the valid latitude/longitude ranges
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    pub fn to_point(self) -> geo::Point<f64> {
        geo::Point::new(self.lng, self.lat)
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.lat, self.lng)
    }
}

/// A cuisine with its share of the group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeightedCuisine {
    pub cuisine: String,
    pub weight: f64,
    pub count: usize,
}

/// Plurality budget tier among members
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetConsensus {
    pub budget: Budget,
    pub weight: f64,
    pub count: usize,
}

/// Group consensus profile computed for one recommendation run
#[derive(Debug, Clone)]
pub struct GroupProfile {
    pub weighted_cuisines: Vec<WeightedCuisine>,
    pub dietary_restrictions: Vec<String>,
    pub average_spice_level: u8,
    pub consensus_budget: BudgetConsensus,
    /// Earliest desired time submitted by any member
    pub earliest_desired_time: Option<DateTime<Utc>>,
    pub centroid: Option<GeoPoint>,
}

impl GroupProfile {
    pub fn cuisines(&self) -> Vec<String> {
        self.weighted_cuisines.iter().map(|c| c.cuisine.clone()).collect()
    }

    pub fn summary(&self) -> GroupProfileSummary {
        GroupProfileSummary {
            cuisines: self.cuisines(),
            dietary_restrictions: self.dietary_restrictions.clone(),
            spice_level: self.average_spice_level,
            budget: self.consensus_budget.budget,
            centroid_location: self.centroid.map(|c| c.to_string()),
        }
    }
}

/// Caller-facing digest of a group profile
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupProfileSummary {
    pub cuisines: Vec<String>,
    #[serde(rename = "dietaryRestrictions")]
    pub dietary_restrictions: Vec<String>,
    #[serde(rename = "spiceLevel")]
    pub spice_level: u8,
    pub budget: Budget,
    #[serde(rename = "centroidLocation")]
    pub centroid_location: Option<String>,
}

/// One search origin in a zone plan
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchZone {
    pub center: GeoPoint,
}

/// Provider business category
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub alias: String,
    pub title: String,
}

/// Filters sent with every business search call
#[derive(Debug, Clone, PartialEq)]
pub struct SearchFilters {
    pub term: String,
    pub categories: Vec<String>,
    pub price: Option<String>,
    pub limit: u32,
    pub sort_by: String,
    pub open_now: bool,
    /// Unix timestamp; takes precedence over `open_now` when set
    pub open_at: Option<i64>,
}

/// Raw business record as returned by the search provider
#[derive(Debug, Clone, PartialEq)]
pub struct BusinessRecord {
    pub id: String,
    pub name: String,
    pub rating: f64,
    pub review_count: u32,
    pub price: Option<String>,
    pub categories: Vec<Category>,
    pub coordinates: Option<GeoPoint>,
    pub distance_meters: Option<f64>,
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub address: Vec<String>,
    pub phone: Option<String>,
}

/// Unique restaurant candidate within one run
///
/// Serialized for display: categories as their titles, and a missing price
/// tier shown as `$$`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CandidateRestaurant {
    pub id: String,
    pub name: String,
    pub rating: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: u32,
    #[serde(rename = "price", serialize_with = "serialize_display_price")]
    pub price_tier: Option<Budget>,
    #[serde(serialize_with = "serialize_category_titles")]
    pub categories: Vec<Category>,
    pub coordinates: Option<GeoPoint>,
    #[serde(skip)]
    pub raw_distance_meters: Option<f64>,
    #[serde(rename = "imageUrl")]
    pub image_url: Option<String>,
    pub url: Option<String>,
    pub address: String,
    pub phone: Option<String>,
}

impl From<BusinessRecord> for CandidateRestaurant {
    fn from(record: BusinessRecord) -> Self {
        let price_tier = record.price.as_deref().and_then(|p| p.parse().ok());

        Self {
            id: record.id,
            name: record.name,
            rating: record.rating,
            review_count: record.review_count,
            price_tier,
            categories: record.categories,
            coordinates: record.coordinates.filter(GeoPoint::is_valid),
            raw_distance_meters: record.distance_meters.filter(|d| d.is_finite() && *d >= 0.0),
            image_url: record.image_url,
            url: record.url,
            address: record.address.join(", "),
            phone: record.phone,
        }
    }
}

fn serialize_display_price<S: Serializer>(price: &Option<Budget>, serializer: S) -> Result<S::Ok, S::Error> {
    price.unwrap_or_default().serialize(serializer)
}

fn serialize_category_titles<S: Serializer>(categories: &[Category], serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_seq(categories.iter().map(|c| c.title.as_str()))
}

/// Final ranked recommendation
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredRecommendation {
    #[serde(flatten)]
    pub restaurant: CandidateRestaurant,
    #[serde(rename = "distance")]
    pub distance_miles: f64,
    #[serde(rename = "matchScore")]
    pub match_score: u8,
}

/// Distance band: candidates at or under `max_miles` earn `points`
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct DistanceBand {
    pub max_miles: f64,
    pub points: f64,
}

/// Scoring weights
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScoringWeights {
    /// Checked in ascending `max_miles` order
    pub distance_bands: Vec<DistanceBand>,
    pub beyond_bands: f64,
    pub cuisine_cap: f64,
    pub rating_max: f64,
    pub review_max: f64,
    pub review_saturation: f64,
    pub budget_exact: f64,
    pub budget_adjacent: f64,
    /// Candidates closer together than this are ordered by score
    pub rank_band_miles: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            distance_bands: vec![
                DistanceBand { max_miles: 2.0, points: 60.0 },
                DistanceBand { max_miles: 5.0, points: 45.0 },
                DistanceBand { max_miles: 8.0, points: 25.0 },
                DistanceBand { max_miles: 12.0, points: 10.0 },
            ],
            beyond_bands: -10.0,
            cuisine_cap: 25.0,
            rating_max: 10.0,
            review_max: 5.0,
            review_saturation: 200.0,
            budget_exact: 8.0,
            budget_adjacent: 4.0,
            rank_band_miles: 2.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_budget_serde_symbols() {
        let json = serde_json::to_string(&Budget::Pricey).unwrap();
        assert_eq!(json, "\"$$$\"");

        let parsed: Budget = serde_json::from_str("\"$\"").unwrap();
        assert_eq!(parsed, Budget::Inexpensive);
    }

    #[test]
    fn test_budget_adjacency() {
        assert!(Budget::Moderate.is_adjacent(Budget::Inexpensive));
        assert!(Budget::Moderate.is_adjacent(Budget::Pricey));
        assert!(!Budget::Moderate.is_adjacent(Budget::Moderate));
        assert!(!Budget::Inexpensive.is_adjacent(Budget::Luxury));
    }

    #[test]
    fn test_candidate_from_record() {
        let record = BusinessRecord {
            id: "abc".to_string(),
            name: "Trattoria".to_string(),
            rating: 4.5,
            review_count: 120,
            price: Some("$$".to_string()),
            categories: vec![],
            coordinates: Some(GeoPoint::new(f64::NAN, 0.0)),
            distance_meters: Some(-3.0),
            image_url: None,
            url: None,
            address: vec!["1 Main St".to_string(), "Springfield".to_string()],
            phone: None,
        };

        let candidate = CandidateRestaurant::from(record);
        assert_eq!(candidate.price_tier, Some(Budget::Moderate));
        assert_eq!(candidate.address, "1 Main St, Springfield");
        assert!(candidate.coordinates.is_none());
        assert!(candidate.raw_distance_meters.is_none());
    }

    #[test]
    fn test_recommendation_display_shape() {
        let rec = ScoredRecommendation {
            restaurant: CandidateRestaurant {
                id: "thai-palace".to_string(),
                name: "Thai Palace".to_string(),
                rating: 4.5,
                review_count: 321,
                price_tier: None,
                categories: vec![
                    Category { alias: "thai".to_string(), title: "Thai".to_string() },
                    Category { alias: "noodles".to_string(), title: "Noodles".to_string() },
                ],
                coordinates: Some(GeoPoint::new(40.71, -74.0)),
                raw_distance_meters: Some(812.4),
                image_url: None,
                url: None,
                address: "12 Main St".to_string(),
                phone: None,
            },
            distance_miles: 0.5,
            match_score: 88,
        };

        let json = serde_json::to_value(&rec).unwrap();
        assert_eq!(json["categories"], serde_json::json!(["Thai", "Noodles"]));
        assert_eq!(json["price"], "$$");
        assert_eq!(json["reviewCount"], 321);
        assert_eq!(json["distance"], 0.5);
        assert_eq!(json["matchScore"], 88);
        assert!(json.get("raw_distance_meters").is_none());

        let mut priced = rec.clone();
        priced.restaurant.price_tier = Some(Budget::Inexpensive);
        assert_eq!(serde_json::to_value(&priced).unwrap()["price"], "$");
    }

    #[test]
    fn test_member_preference_defaults() {
        let pref: MemberPreference = serde_json::from_str(
            r#"{"memberId": "m1", "location": "Boston, MA"}"#,
        )
        .unwrap();

        assert_eq!(pref.spice_level, 3);
        assert_eq!(pref.budget, Budget::Moderate);
        assert!(pref.cuisine_types.is_empty());
    }
}
