//! Great-circle distance between two coordinates.

use crate::types::{Coordinate, DistanceUnit};

/// Earth radius used by the haversine formula, in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6378.0;

/// Kilometre to mile conversion factor.
pub const MILES_PER_KM: f64 = 0.62137;

/// Haversine distance from `origin` to `target` in the requested unit.
///
/// Symmetric in its two coordinates and zero when they are equal.
#[must_use]
pub fn distance(origin: Coordinate, target: Coordinate, unit: DistanceUnit) -> f64 {
    // Absolute deltas keep the result bit-identical when the arguments swap.
    let d_lat = (origin.lat - target.lat).abs().to_radians();
    let d_lng = (origin.lng - target.lng).abs().to_radians();

    let half_lat = (d_lat / 2.0).sin();
    let half_lng = (d_lng / 2.0).sin();
    let a = half_lat * half_lat
        + origin.lat.to_radians().cos() * target.lat.to_radians().cos() * half_lng * half_lng;
    let a = a.clamp(0.0, 1.0);

    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
    let km = EARTH_RADIUS_KM * c;

    match unit {
        DistanceUnit::Kilometres => km,
        DistanceUnit::Miles => km * MILES_PER_KM,
    }
}
