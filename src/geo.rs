//! Flat-earth conversions between geographic coordinates and metre offsets.
//!
//! Good to well under a metre across a residential lot; not meant for
//! anything spanning more than a few kilometres.

use crate::angles::{deg_to_rad, normalize_angle, rad_to_deg};
use crate::types::Coordinates;

pub const METERS_PER_DEGREE_LAT: f64 = 111_320.0;

/// Longitude scale never drops below this near the poles.
const MIN_LNG_SCALE: f64 = 1e-6;

pub fn meters_per_degree_lng(latitude: f64) -> f64 {
    METERS_PER_DEGREE_LAT * deg_to_rad(latitude).cos().max(MIN_LNG_SCALE)
}

/// Shortest signed eastward step from `from` to `to`, in [-180, 180].
pub fn longitude_delta(from: f64, to: f64) -> f64 {
    let delta = to - from;
    if (-180.0..=180.0).contains(&delta) {
        delta
    } else {
        (delta + 180.0).rem_euclid(360.0) - 180.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LocalFrame {
    pub origin: Coordinates,
    lng_scale: f64,
}

impl LocalFrame {
    pub fn new(origin: Coordinates) -> Self {
        let origin = origin.normalized();
        Self {
            origin,
            lng_scale: meters_per_degree_lng(origin.latitude),
        }
    }

    /// (east, north) in metres.
    pub fn to_local(&self, point: &Coordinates) -> (f64, f64) {
        (
            longitude_delta(self.origin.longitude, point.longitude) * self.lng_scale,
            (point.latitude - self.origin.latitude) * METERS_PER_DEGREE_LAT,
        )
    }

    pub fn to_geo(&self, east: f64, north: f64) -> Coordinates {
        Coordinates::new(
            self.origin.latitude + north / METERS_PER_DEGREE_LAT,
            self.origin.longitude + east / self.lng_scale,
        )
    }
}

/// Unit vector (east, north) for a compass bearing.
pub fn bearing_vector(bearing: f64) -> (f64, f64) {
    let rad = deg_to_rad(bearing);
    (rad.sin(), rad.cos())
}

pub fn bearing_of(east: f64, north: f64) -> f64 {
    normalize_angle(rad_to_deg(east.atan2(north)))
}

/// Bearing (degrees from north) and ground distance (metres) from `from` to `to`.
pub fn bearing_and_distance(from: &Coordinates, to: &Coordinates) -> (f64, f64) {
    let (east, north) = LocalFrame::new(*from).to_local(to);
    (bearing_of(east, north), east.hypot(north))
}
