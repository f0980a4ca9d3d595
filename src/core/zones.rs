use crate::core::distance::offset_miles;
use crate::models::{GeoPoint, SearchZone};
use geo::{Centroid, MultiPoint};
use std::f64::consts::TAU;

/// Ring distances as fractions of the base radius
pub const RING_FRACTIONS: [f64; 3] = [0.25, 0.5, 0.75];

/// Unweighted mean of all valid points
///
/// Invalid (non-finite or out-of-range) points are dropped. Returns `None`
/// when nothing valid remains.
pub fn centroid(points: &[GeoPoint]) -> Option<GeoPoint> {
    let valid: MultiPoint<f64> = points
        .iter()
        .filter(|p| p.is_valid())
        .map(|p| p.to_point())
        .collect::<Vec<_>>()
        .into();

    valid
        .centroid()
        .map(|c| GeoPoint::new(c.y(), c.x()))
        .filter(GeoPoint::is_valid)
}

/// Concentric search plan around the centroid
///
/// Zone 0 is the centroid. Each ring at 1/4, 1/2 and 3/4 of the base radius
/// holds `points_per_ring` zones spaced evenly by angle, for
/// `1 + 3 * points_per_ring` zones in total.
pub fn plan_zones(centroid: GeoPoint, base_radius_miles: f64, points_per_ring: usize) -> Vec<SearchZone> {
    let mut zones = Vec::with_capacity(1 + RING_FRACTIONS.len() * points_per_ring);
    zones.push(SearchZone { center: centroid });

    if points_per_ring == 0 {
        return zones;
    }

    let angle_step = TAU / points_per_ring as f64;
    for fraction in RING_FRACTIONS {
        let ring_miles = base_radius_miles * fraction;
        for i in 0..points_per_ring {
            zones.push(SearchZone {
                center: offset_miles(centroid, ring_miles, i as f64 * angle_step),
            });
        }
    }

    zones
}
