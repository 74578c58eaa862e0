//! Ground footprints of obstacle shadows.
//!
//! Works in a local metre frame around the observer and converts the
//! vertices back to latitude/longitude. Points are tested against the
//! result with even-odd ray casting.

use crate::angles::{deg_to_rad, normalize_angle};
use crate::geo::{bearing_vector, longitude_delta, LocalFrame};
use crate::shadow::MIN_DIMENSION_METERS;
use crate::types::{Coordinates, Obstacle, ShadowPolygon, SolarPosition};

/// Grazing sun would otherwise stretch shadows past where the flat-earth
/// frame holds.
pub const MAX_SHADOW_LENGTH_METERS: f64 = 1000.0;

pub fn shadow_length(height: f64, altitude: f64) -> f64 {
    (height / deg_to_rad(altitude).tan()).min(MAX_SHADOW_LENGTH_METERS)
}

/// `None` when the sun is down or clears the obstacle as seen from `observer`.
pub fn project_shadow(
    observer: &Coordinates,
    obstacle: &Obstacle,
    sun: &SolarPosition,
) -> Option<ShadowPolygon> {
    if !sun.is_above_horizon() || sun.altitude > obstacle.angular_height() {
        return None;
    }

    let obstacle = obstacle.sanitized();
    let length = shadow_length(obstacle.height, sun.altitude);
    let (along_e, along_n) = bearing_vector(normalize_angle(sun.azimuth + 180.0));
    // Perpendicular, pointing to the right of the shadow direction.
    let (across_e, across_n) = (along_n, -along_e);
    let half_width = obstacle.width / 2.0;
    let (base_e, base_n) = obstacle.local_offset();

    let tip_e = base_e + along_e * length;
    let tip_n = base_n + along_n * length;

    let local: Vec<(f64, f64)> = if obstacle.kind.is_point_like() {
        vec![
            (base_e, base_n),
            (tip_e + across_e * half_width, tip_n + across_n * half_width),
            (tip_e - across_e * half_width, tip_n - across_n * half_width),
        ]
    } else {
        vec![
            (base_e - across_e * half_width, base_n - across_n * half_width),
            (base_e + across_e * half_width, base_n + across_n * half_width),
            (tip_e + across_e * half_width, tip_n + across_n * half_width),
            (tip_e - across_e * half_width, tip_n - across_n * half_width),
        ]
    };

    let frame = LocalFrame::new(*observer);
    Some(ShadowPolygon {
        obstacle_id: obstacle.id.clone(),
        vertices: local.iter().map(|&(e, n)| frame.to_geo(e, n)).collect(),
        shade_intensity: obstacle.shade_intensity(),
        length_meters: length,
    })
}

/// Even-odd ray casting with longitude as x and latitude as y. Longitudes
/// are unwrapped around the first vertex so footprints crossing the 180°
/// meridian stay contiguous.
pub fn point_in_polygon(point: &Coordinates, vertices: &[Coordinates]) -> bool {
    let n = vertices.len();
    if n < 3 {
        return false;
    }
    let anchor = vertices[0].longitude;
    let unwrapped = |v: &Coordinates| anchor + longitude_delta(anchor, v.longitude);
    let (x, y) = (unwrapped(point), point.latitude);
    let mut inside = false;
    let mut j = n - 1;
    for i in 0..n {
        let (xi, yi) = (unwrapped(&vertices[i]), vertices[i].latitude);
        let (xj, yj) = (unwrapped(&vertices[j]), vertices[j].latitude);
        if (yi > y) != (yj > y) && x < (xj - xi) * (y - yi) / (yj - yi) + xi {
            inside = !inside;
        }
        j = i;
    }
    inside
}

impl ShadowPolygon {
    pub fn contains(&self, point: &Coordinates) -> bool {
        point_in_polygon(point, &self.vertices)
    }

    /// Shoelace area in square metres, measured in a frame at the first vertex.
    pub fn area_square_meters(&self) -> f64 {
        let Some(first) = self.vertices.first() else {
            return 0.0;
        };
        let frame = LocalFrame::new(*first);
        let local: Vec<(f64, f64)> = self.vertices.iter().map(|v| frame.to_local(v)).collect();
        let twice_area: f64 = local
            .iter()
            .zip(local.iter().cycle().skip(1))
            .map(|(a, b)| a.0 * b.1 - b.0 * a.1)
            .sum();
        (twice_area / 2.0).abs()
    }
}

/// Shadows of every obstacle that casts one, for rendering.
pub fn project_shadows(
    observer: &Coordinates,
    obstacles: &[Obstacle],
    sun: &SolarPosition,
) -> Vec<ShadowPolygon> {
    obstacles
        .iter()
        .filter_map(|o| project_shadow(observer, o, sun))
        .collect()
}

/// Whether `observer` lies in the footprint of `obstacle`'s shadow, with the
/// obstacle's bearing and distance measured from `observer`.
pub fn footprint_covers(observer: &Coordinates, obstacle: &Obstacle, sun: &SolarPosition) -> bool {
    if !sun.is_above_horizon() {
        return false;
    }
    if obstacle.distance <= MIN_DIMENSION_METERS {
        return true;
    }
    project_shadow(observer, obstacle, sun).is_some_and(|shadow| shadow.contains(observer))
}

/// Like [`footprint_covers`] for an obstacle whose bearing is measured from `origin`.
pub fn point_in_shadow(
    origin: &Coordinates,
    point: &Coordinates,
    obstacle: &Obstacle,
    sun: &SolarPosition,
) -> bool {
    footprint_covers(point, &obstacle.relative_to(origin, point), sun)
}
