pub mod angles;
pub mod compositor;
pub mod error;
pub mod geo;
pub mod grid;
pub mod projection;
pub mod seasonal;
pub mod shadow;
pub mod sun_hours;
pub mod terrain;
pub mod types;
pub mod worker;

pub use angles::{
    angular_difference, deg_to_rad, equation_of_time, fractional_year, hour_angle,
    local_day_start, normalize_angle, polar_condition, rad_to_deg, solar_altitude, solar_azimuth,
    solar_declination, solar_noon, solar_position, solar_zenith_angle, sun_times,
    DEGREES_PER_HOUR, MINUTES_PER_DEGREE,
};

pub use compositor::{
    combined_sun_hours, combined_sun_hours_with, combined_sun_hours_with_terrain, composite_day,
    ShadowTally,
};

pub use error::{OffloadError, OracleError};

pub use geo::{bearing_and_distance, LocalFrame, METERS_PER_DEGREE_LAT};

pub use grid::{
    exposure_grid, exposure_grid_with_progress, grid_layout, select_sample_days, GridLayout,
};

pub use projection::{point_in_polygon, point_in_shadow, project_shadow, project_shadows};

pub use seasonal::{monthly_summary, period_summary, seasonal_summary, yearly_summary};

pub use shadow::{combined_block, is_blocked, max_shade_intensity};

pub use sun_hours::{daily_sun_hours, daily_sun_hours_with, sample_day, DaySamples, SunSample};

pub use terrain::{HorizonMask, PixelPoint, TerrainShadowOracle};

pub use types::{
    AnalysisPeriod, BlockResult, CombinedResult, Coordinates, DailyResult, DailySunData,
    DateRange, DayExtreme, ExposureGrid, GeoBounds, GridRequest, GridStats, Obstacle,
    ObstacleKind, PolarCondition, SamplingConfig, Season, SeasonalSummary, ShadowMethod,
    ShadowPolygon, SolarPosition, SunExposure, SunHoursBreakdown, SunTimes,
};

pub use worker::{ExecutionMode, ExposureEngine, GridEvent, GridWorker, RequestId, WorkerMessage};
