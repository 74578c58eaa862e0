//! External terrain/building shadow source consumed by the compositor.

use std::future::Future;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::angles::{normalize_angle, solar_position};
use crate::error::OracleError;
use crate::types::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: f64,
    pub y: f64,
}

/// An opaque "is this pixel lit" source with an internal time cursor.
///
/// Callers move the cursor with [`set_date`](Self::set_date) and then await
/// one query at a time; the compositor never has two queries in flight.
pub trait TerrainShadowOracle {
    fn set_date(&mut self, instant: DateTime<Utc>);

    fn to_pixel(&self, coords: &Coordinates) -> Option<PixelPoint>;

    fn is_position_in_sun(
        &mut self,
        pixel: PixelPoint,
    ) -> impl Future<Output = Result<bool, OracleError>>;
}

/// Terrain horizon as seen from one site: the elevation angle of the
/// skyline in equal azimuth bins clockwise from north.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonMask {
    site: Coordinates,
    elevations: Vec<f64>,
    sun_altitude: f64,
    sun_azimuth: f64,
}

impl HorizonMask {
    pub fn new(site: Coordinates, elevations: Vec<f64>) -> Self {
        Self {
            site: site.normalized(),
            elevations,
            sun_altitude: -90.0,
            sun_azimuth: 0.0,
        }
    }

    pub fn flat(site: Coordinates) -> Self {
        Self::new(site, Vec::new())
    }

    pub fn elevation_at(&self, azimuth: f64) -> f64 {
        if self.elevations.is_empty() {
            return 0.0;
        }
        let bin_width = 360.0 / self.elevations.len() as f64;
        let bin = (normalize_angle(azimuth) / bin_width) as usize;
        self.elevations[bin.min(self.elevations.len() - 1)]
    }
}

impl TerrainShadowOracle for HorizonMask {
    fn set_date(&mut self, instant: DateTime<Utc>) {
        let sun = solar_position(&self.site, &instant);
        self.sun_altitude = sun.altitude;
        self.sun_azimuth = sun.azimuth;
    }

    fn to_pixel(&self, _coords: &Coordinates) -> Option<PixelPoint> {
        Some(PixelPoint { x: 0.0, y: 0.0 })
    }

    async fn is_position_in_sun(&mut self, _pixel: PixelPoint) -> Result<bool, OracleError> {
        Ok(self.sun_altitude > self.elevation_at(self.sun_azimuth))
    }
}
