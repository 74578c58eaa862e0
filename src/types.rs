use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use ndarray::Array2;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Season {
    Summer,
    Winter,
    Spring,
    Fall,
}

impl Season {
    /// Meteorological season, flipped south of the equator.
    pub fn for_date(date: NaiveDate, latitude: f64) -> Season {
        let northern = match date.month() {
            3..=5 => Season::Spring,
            6..=8 => Season::Summer,
            9..=11 => Season::Fall,
            _ => Season::Winter,
        };
        if latitude < 0.0 {
            northern.opposite()
        } else {
            northern
        }
    }

    pub fn opposite(self) -> Season {
        match self {
            Season::Summer => Season::Winter,
            Season::Winter => Season::Summer,
            Season::Spring => Season::Fall,
            Season::Fall => Season::Spring,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    /// Latitude is clamped into [-90, 90], longitude wrapped into [-180, 180).
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude: latitude.clamp(-90.0, 90.0),
            longitude: (longitude + 180.0).rem_euclid(360.0) - 180.0,
        }
    }

    pub fn normalized(&self) -> Self {
        Self::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SolarPosition {
    pub day_of_year: u32,
    pub declination: f64,
    pub equation_of_time: f64,
    pub local_solar_time: f64,
    pub hour_angle: f64,
    pub zenith: f64,
    pub altitude: f64,
    pub azimuth: f64,
}

impl SolarPosition {
    pub fn is_above_horizon(&self) -> bool {
        self.altitude > 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PolarCondition {
    None,
    MidnightSun,
    PolarNight,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunTimes {
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub solar_noon: Option<DateTime<Utc>>,
    pub polar_condition: PolarCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailySunData {
    pub date: NaiveDate,
    pub sun_hours: f64,
    pub sun_times: SunTimes,
    pub polar_condition: PolarCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ObstacleKind {
    Building,
    Fence,
    EvergreenTree,
    DeciduousTree,
    Hedge,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Obstacle {
    pub id: String,
    pub kind: ObstacleKind,
    /// Bearing from the observation point, degrees clockwise from north.
    pub direction: f64,
    pub distance: f64,
    pub height: f64,
    pub width: f64,
    /// Explicit transparency; `None` falls back to the kind's default.
    pub transparency: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BlockResult {
    pub blocked: bool,
    pub shade_intensity: f64,
}

impl BlockResult {
    pub const CLEAR: BlockResult = BlockResult {
        blocked: false,
        shade_intensity: 0.0,
    };
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShadowPolygon {
    pub obstacle_id: String,
    pub vertices: Vec<Coordinates>,
    pub shade_intensity: f64,
    pub length_meters: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct SunHoursBreakdown {
    pub theoretical: f64,
    pub terrain_and_building_shadow: f64,
    pub tree_shadow: f64,
    pub overlap_shadow: f64,
    pub effective: f64,
}

impl SunHoursBreakdown {
    pub fn unobstructed(hours: f64) -> Self {
        Self {
            theoretical: hours,
            effective: hours,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CombinedResult {
    pub breakdown: SunHoursBreakdown,
    pub sunrise: Option<DateTime<Utc>>,
    pub sunset: Option<DateTime<Utc>>,
    pub polar_condition: PolarCondition,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SunExposure {
    FullSun,
    PartSun,
    PartShade,
    FullShade,
}

impl SunExposure {
    pub fn classify(effective_hours: f64) -> SunExposure {
        if effective_hours >= 6.0 {
            SunExposure::FullSun
        } else if effective_hours >= 4.0 {
            SunExposure::PartSun
        } else if effective_hours >= 2.0 {
            SunExposure::PartShade
        } else {
            SunExposure::FullShade
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AnalysisPeriod {
    FullYear,
    GrowingSeason,
    Summer,
    Winter,
    Custom(DateRange),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DailyResult {
    pub data: DailySunData,
    pub breakdown: SunHoursBreakdown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DayExtreme {
    pub date: NaiveDate,
    pub effective_hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalSummary {
    pub range: DateRange,
    pub average: SunHoursBreakdown,
    pub daily: Vec<DailyResult>,
    pub lowest: Option<DayExtreme>,
    pub highest: Option<DayExtreme>,
    pub midnight_sun_days: u32,
    pub polar_night_days: u32,
    pub exposure: SunExposure,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum ShadowMethod {
    #[default]
    Angular,
    Footprint,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SamplingConfig {
    pub interval_minutes: u32,
    pub tree_shade_threshold: f64,
    pub shadow_method: ShadowMethod,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            interval_minutes: 5,
            tree_shade_threshold: 0.5,
            shadow_method: ShadowMethod::Angular,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridRequest {
    pub bounds: GeoBounds,
    pub resolution_meters: f64,
    /// Point that obstacle bearings and distances are measured from.
    pub origin: Coordinates,
    pub obstacles: Vec<Obstacle>,
    pub date_range: DateRange,
    pub sample_day_count: usize,
    pub config: SamplingConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExposureGrid {
    pub bounds: GeoBounds,
    pub resolution_meters: f64,
    pub width: usize,
    pub height: usize,
    pub lat_step: f64,
    pub lng_step: f64,
    /// Shape `(height, width)`; row 0 is the southern edge.
    pub values: Array2<f64>,
    pub date_range: DateRange,
    pub sample_days: Vec<NaiveDate>,
    pub compute_time: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    pub min: f64,
    pub max: f64,
    pub mean: f64,
}
