use crate::models::GeoPoint;
use geo::HaversineDistance;

/// Meters in one statute mile
pub const METERS_PER_MILE: f64 = 1609.34;

/// Miles spanned by one degree of latitude
pub const MILES_PER_DEGREE_LAT: f64 = 69.0;

/// Great-circle distance between two points in miles
#[inline]
pub fn haversine_miles(a: GeoPoint, b: GeoPoint) -> f64 {
    meters_to_miles(a.to_point().haversine_distance(&b.to_point()))
}

#[inline]
pub fn meters_to_miles(meters: f64) -> f64 {
    meters / METERS_PER_MILE
}

/// Offset a point by a distance in miles along a bearing
///
/// Uses the flat-earth approximation: 69 miles per degree of latitude and
/// longitude degrees scaled by cos(latitude). Bearing 0 is north.
pub fn offset_miles(origin: GeoPoint, distance_miles: f64, bearing_radians: f64) -> GeoPoint {
    let lat_offset = distance_miles * bearing_radians.cos() / MILES_PER_DEGREE_LAT;
    let lng_offset = distance_miles * bearing_radians.sin()
        / (MILES_PER_DEGREE_LAT * origin.lat.to_radians().cos());

    GeoPoint {
        lat: origin.lat + lat_offset,
        lng: origin.lng + lng_offset,
    }
}

/// Round a distance to one decimal place for display and ranking
#[inline]
pub fn round_tenth(miles: f64) -> f64 {
    (miles * 10.0).round() / 10.0
}
