use std::time::{Duration, Instant};

use chrono::{Days, NaiveDate};
use ndarray::Array2;
use tracing::debug;

use crate::compositor::composite_day;
use crate::geo::{meters_per_degree_lng, METERS_PER_DEGREE_LAT};
use crate::sun_hours::{sample_day, DaySamples};
use crate::types::{
    Coordinates, DateRange, ExposureGrid, GeoBounds, GridRequest, GridStats, Obstacle,
    SamplingConfig, SunExposure,
};

pub const MIN_RESOLUTION_METERS: f64 = 0.1;

impl GeoBounds {
    /// Swaps inverted latitudes and clamps them. A west edge east of the
    /// east edge means the box crosses the 180° meridian.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> Self {
        let (south, north) = if south <= north { (south, north) } else { (north, south) };
        Self {
            south: south.clamp(-90.0, 90.0),
            west: wrap_longitude(west),
            north: north.clamp(-90.0, 90.0),
            east: wrap_longitude(east),
        }
    }

    pub fn normalized(&self) -> Self {
        Self::new(self.south, self.west, self.north, self.east)
    }

    pub fn crosses_antimeridian(&self) -> bool {
        self.west > self.east
    }

    /// Degrees of longitude from the west edge eastwards to the east edge.
    pub fn lng_span(&self) -> f64 {
        self.lng_offset(self.east)
    }

    /// Degrees east of the west edge, in [0, 360).
    pub fn lng_offset(&self, longitude: f64) -> f64 {
        if longitude >= self.west {
            longitude - self.west
        } else {
            (longitude - self.west).rem_euclid(360.0)
        }
    }

    pub fn center(&self) -> Coordinates {
        Coordinates::new(
            (self.south + self.north) / 2.0,
            self.west + self.lng_span() / 2.0,
        )
    }

    pub fn contains(&self, point: &Coordinates) -> bool {
        (self.south..=self.north).contains(&point.latitude)
            && self.lng_offset(point.longitude) <= self.lng_span()
    }
}

/// Out-of-range longitudes are wrapped; ±180 themselves are kept so a
/// whole-globe box stays 360° wide.
fn wrap_longitude(longitude: f64) -> f64 {
    if (-180.0..=180.0).contains(&longitude) {
        longitude
    } else {
        Coordinates::new(0.0, longitude).longitude
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub width: usize,
    pub height: usize,
    pub lat_step: f64,
    pub lng_step: f64,
}

/// Longitude steps are widened by 1/cos(latitude) so cells are roughly
/// square on the ground. Never fewer than one cell per axis.
pub fn grid_layout(bounds: &GeoBounds, resolution_meters: f64) -> GridLayout {
    let bounds = bounds.normalized();
    let resolution = resolution_meters.max(MIN_RESOLUTION_METERS);
    let lat_step = resolution / METERS_PER_DEGREE_LAT;
    let lng_step = resolution / meters_per_degree_lng((bounds.south + bounds.north) / 2.0);
    let cells = |span: f64, step: f64| ((span / step).ceil() as usize).max(1);
    GridLayout {
        width: cells(bounds.lng_span(), lng_step),
        height: cells(bounds.north - bounds.south, lat_step),
        lat_step,
        lng_step,
    }
}

/// Evenly spread over the range with both ends included.
pub fn select_sample_days(range: &DateRange, count: usize) -> Vec<NaiveDate> {
    let range = DateRange::new(range.start, range.end);
    let total = range.len_days();
    let count = count.max(1);
    if count >= total {
        return range.days().collect();
    }
    let offset = |days: usize| range.start.checked_add_days(Days::new(days as u64));
    if count == 1 {
        return offset((total - 1) / 2).into_iter().collect();
    }

    let step = (total - 1) as f64 / (count - 1) as f64;
    let mut days: Vec<NaiveDate> = (0..count)
        .filter_map(|i| offset((i as f64 * step).round() as usize))
        .collect();
    days.dedup();
    days
}

impl GridRequest {
    /// Obstacle bearings are measured from the bounds' centre unless
    /// [`with_origin`](Self::with_origin) says otherwise.
    pub fn new(
        bounds: GeoBounds,
        resolution_meters: f64,
        obstacles: Vec<Obstacle>,
        date_range: DateRange,
        sample_day_count: usize,
    ) -> Self {
        let bounds = bounds.normalized();
        Self {
            bounds,
            resolution_meters,
            origin: bounds.center(),
            obstacles,
            date_range,
            sample_day_count,
            config: SamplingConfig::default(),
        }
    }

    pub fn with_origin(mut self, origin: Coordinates) -> Self {
        self.origin = origin;
        self
    }

    pub fn with_config(mut self, config: SamplingConfig) -> Self {
        self.config = config;
        self
    }
}

pub fn exposure_grid(request: &GridRequest) -> ExposureGrid {
    exposure_grid_with_progress(request, |_| {})
}

/// Cells are visited row by row from the south-west corner. `on_progress`
/// gets the completed fraction after each row, ending at exactly 1.0.
pub fn exposure_grid_with_progress<F>(request: &GridRequest, mut on_progress: F) -> ExposureGrid
where
    F: FnMut(f64),
{
    let started = Instant::now();
    let bounds = request.bounds.normalized();
    let layout = grid_layout(&bounds, request.resolution_meters);
    let sample_days = select_sample_days(&request.date_range, request.sample_day_count);
    let origin = request.origin.normalized();
    let config = request.config;

    // Sun positions are shared by every cell; a lot is far too small for
    // them to differ.
    let days: Vec<DaySamples> = sample_days
        .iter()
        .map(|date| sample_day(&origin, *date, &config))
        .collect();

    let mut values = Array2::<f64>::zeros((layout.height, layout.width));
    let total = layout.width * layout.height;
    for row in 0..layout.height {
        for col in 0..layout.width {
            let center = cell_center_of(&bounds, &layout, row, col);
            let sum: f64 = days
                .iter()
                .map(|day| composite_day(day, &origin, &center, &request.obstacles, &config).effective)
                .sum();
            values[[row, col]] = sum / days.len().max(1) as f64;
        }
        on_progress(((row + 1) * layout.width) as f64 / total as f64);
    }

    let compute_time = started.elapsed();
    debug!(
        width = layout.width,
        height = layout.height,
        sample_days = days.len(),
        obstacles = request.obstacles.len(),
        elapsed_ms = compute_time.as_millis() as u64,
        "exposure grid computed"
    );

    ExposureGrid {
        bounds,
        resolution_meters: request.resolution_meters.max(MIN_RESOLUTION_METERS),
        width: layout.width,
        height: layout.height,
        lat_step: layout.lat_step,
        lng_step: layout.lng_step,
        values,
        date_range: DateRange::new(request.date_range.start, request.date_range.end),
        sample_days,
        compute_time,
    }
}

fn cell_center_of(bounds: &GeoBounds, layout: &GridLayout, row: usize, col: usize) -> Coordinates {
    Coordinates::new(
        bounds.south + (row as f64 + 0.5) * layout.lat_step,
        bounds.west + (col as f64 + 0.5) * layout.lng_step,
    )
}

impl ExposureGrid {
    fn layout(&self) -> GridLayout {
        GridLayout {
            width: self.width,
            height: self.height,
            lat_step: self.lat_step,
            lng_step: self.lng_step,
        }
    }

    pub fn cell_count(&self) -> usize {
        self.width * self.height
    }

    pub fn sample_days_used(&self) -> usize {
        self.sample_days.len()
    }

    pub fn compute_time_ms(&self) -> u128 {
        self.compute_time.as_millis()
    }

    pub fn compute_duration(&self) -> Duration {
        self.compute_time
    }

    pub fn cell_center(&self, row: usize, col: usize) -> Coordinates {
        cell_center_of(&self.bounds, &self.layout(), row, col)
    }

    /// (row, col) of the cell holding `point`, `None` outside the bounds.
    pub fn cell_at(&self, point: &Coordinates) -> Option<(usize, usize)> {
        if !self.bounds.contains(point) {
            return None;
        }
        let row = ((point.latitude - self.bounds.south) / self.lat_step).floor() as usize;
        let col = (self.bounds.lng_offset(point.longitude) / self.lng_step).floor() as usize;
        Some((row.min(self.height - 1), col.min(self.width - 1)))
    }

    pub fn value_at(&self, point: &Coordinates) -> Option<f64> {
        self.cell_at(point).map(|(row, col)| self.values[[row, col]])
    }

    pub fn exposure_at(&self, point: &Coordinates) -> Option<SunExposure> {
        self.value_at(point).map(SunExposure::classify)
    }

    /// Row-major copy, southern row first.
    pub fn row_major(&self) -> Vec<f64> {
        self.values.iter().copied().collect()
    }

    pub fn stats(&self) -> GridStats {
        let n = self.values.len().max(1) as f64;
        GridStats {
            min: self.values.iter().copied().fold(f64::INFINITY, f64::min),
            max: self.values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
            mean: self.values.sum() / n,
        }
    }
}
