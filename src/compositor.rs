use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::angles::sun_times_for;
use crate::projection::footprint_covers;
use crate::shadow::max_shade_intensity;
use crate::sun_hours::{sample_day, samples_to_hours, DaySamples};
use crate::terrain::TerrainShadowOracle;
use crate::types::{
    CombinedResult, Coordinates, Obstacle, PolarCondition, SamplingConfig, Season,
    ShadowMethod, SolarPosition, SunHoursBreakdown,
};

/// Sun-up samples split into four mutually exclusive buckets so that a
/// sample shaded by both sources is subtracted once.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ShadowTally {
    pub theoretical: usize,
    pub terrain_only: usize,
    pub tree_only: usize,
    pub both: usize,
}

impl ShadowTally {
    pub fn record(&mut self, terrain_blocked: bool, tree_blocked: bool) {
        self.theoretical += 1;
        match (terrain_blocked, tree_blocked) {
            (true, true) => self.both += 1,
            (true, false) => self.terrain_only += 1,
            (false, true) => self.tree_only += 1,
            (false, false) => {}
        }
    }

    pub fn unblocked(&self) -> usize {
        self.theoretical - self.terrain_only - self.tree_only - self.both
    }

    pub fn breakdown(&self, samples_per_day: u32) -> SunHoursBreakdown {
        let hours = |count: usize| samples_to_hours(count, samples_per_day);
        SunHoursBreakdown {
            theoretical: hours(self.theoretical),
            terrain_and_building_shadow: hours(self.terrain_only + self.both),
            tree_shadow: hours(self.tree_only + self.both),
            overlap_shadow: hours(self.both),
            effective: hours(self.unblocked()),
        }
    }
}

/// `obstacles` resolved for the day's season and re-measured from `point`.
pub fn obstacles_seen_from(
    origin: &Coordinates,
    point: &Coordinates,
    obstacles: &[Obstacle],
    season: Season,
) -> Vec<Obstacle> {
    obstacles
        .iter()
        .map(|o| o.for_season(season).relative_to(origin, point))
        .collect()
}

/// `seen` must already be measured from `point`.
pub fn tree_blocked(
    sun: &SolarPosition,
    point: &Coordinates,
    seen: &[Obstacle],
    config: &SamplingConfig,
) -> bool {
    let intensity = match config.shadow_method {
        ShadowMethod::Angular => max_shade_intensity(sun, seen),
        ShadowMethod::Footprint => seen
            .iter()
            .filter(|o| footprint_covers(point, o, sun))
            .map(|o| o.shade_intensity())
            .fold(0.0, f64::max),
    };
    intensity > config.tree_shade_threshold
}

/// Tree-only compositing of one pre-sampled day at `point`.
pub fn composite_day(
    day: &DaySamples,
    origin: &Coordinates,
    point: &Coordinates,
    obstacles: &[Obstacle],
    config: &SamplingConfig,
) -> SunHoursBreakdown {
    if day.polar_condition == PolarCondition::PolarNight {
        return SunHoursBreakdown::default();
    }
    let seen = obstacles_seen_from(
        origin,
        point,
        obstacles,
        Season::for_date(day.date, origin.latitude),
    );
    let mut tally = ShadowTally::default();
    for sample in &day.sun_up {
        tally.record(false, tree_blocked(&sample.position, point, &seen, config));
    }
    tally.breakdown(day.samples_per_day)
}

fn result_for(
    coords: &Coordinates,
    day: &DaySamples,
    breakdown: SunHoursBreakdown,
) -> CombinedResult {
    let times = sun_times_for(coords, day.date, day.polar_condition);
    CombinedResult {
        breakdown,
        sunrise: times.sunrise,
        sunset: times.sunset,
        polar_condition: times.polar_condition,
    }
}

/// Obstacle bearings are measured from `coords`, the site the sun is
/// computed for; `point` is where exposure is wanted.
pub fn combined_sun_hours(
    point: &Coordinates,
    obstacles: &[Obstacle],
    coords: &Coordinates,
    date: NaiveDate,
) -> CombinedResult {
    combined_sun_hours_with(point, obstacles, coords, date, &SamplingConfig::default())
}

pub fn combined_sun_hours_with(
    point: &Coordinates,
    obstacles: &[Obstacle],
    coords: &Coordinates,
    date: NaiveDate,
    config: &SamplingConfig,
) -> CombinedResult {
    let day = sample_day(coords, date, config);
    let breakdown = composite_day(&day, coords, point, obstacles, config);
    result_for(coords, &day, breakdown)
}

/// Adds the terrain/building oracle. Samples are queried strictly in
/// order, each awaited before the next, so the oracle's time cursor always
/// matches the query in flight. A failed query counts as lit.
pub async fn combined_sun_hours_with_terrain<O>(
    point: &Coordinates,
    obstacles: &[Obstacle],
    coords: &Coordinates,
    date: NaiveDate,
    oracle: &mut O,
    config: &SamplingConfig,
) -> CombinedResult
where
    O: TerrainShadowOracle,
{
    let day = sample_day(coords, date, config);
    if day.polar_condition == PolarCondition::PolarNight {
        return result_for(coords, &day, SunHoursBreakdown::default());
    }

    let seen = obstacles_seen_from(
        coords,
        point,
        obstacles,
        Season::for_date(date, coords.latitude),
    );
    let pixel = oracle.to_pixel(point);
    if pixel.is_none() {
        warn!(
            latitude = point.latitude,
            longitude = point.longitude,
            "point outside terrain raster, ignoring terrain shadow"
        );
    }

    let mut tally = ShadowTally::default();
    let mut failures = 0usize;
    for sample in &day.sun_up {
        let tree = tree_blocked(&sample.position, point, &seen, config);
        let terrain = match pixel {
            Some(pixel) => {
                oracle.set_date(sample.instant);
                match oracle.is_position_in_sun(pixel).await {
                    Ok(lit) => !lit,
                    Err(err) => {
                        failures += 1;
                        warn!(instant = %sample.instant, error = %err, "terrain query failed, counting sample as lit");
                        false
                    }
                }
            }
            None => false,
        };
        tally.record(terrain, tree);
    }

    debug!(
        %date,
        samples = tally.theoretical,
        failures,
        "composited terrain and tree shadow"
    );
    result_for(coords, &day, tally.breakdown(day.samples_per_day))
}
