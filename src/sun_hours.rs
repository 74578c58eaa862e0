use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::angles::{self, minutes};
use crate::types::{Coordinates, DailySunData, PolarCondition, SamplingConfig, SolarPosition};

pub const MINUTES_PER_DAY: u32 = 1440;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SunSample {
    pub instant: DateTime<Utc>,
    pub position: SolarPosition,
}

/// The sun-up samples of one local day. On a midnight-sun day every
/// sample counts as sun-up; on a polar-night day none do.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySamples {
    pub date: NaiveDate,
    pub polar_condition: PolarCondition,
    pub samples_per_day: u32,
    pub sun_up: Vec<SunSample>,
}

impl DaySamples {
    pub fn sun_hours(&self) -> f64 {
        samples_to_hours(self.sun_up.len(), self.samples_per_day)
    }
}

pub fn clamp_interval(interval_minutes: u32) -> u32 {
    interval_minutes.clamp(1, MINUTES_PER_DAY)
}

pub fn samples_per_day(interval_minutes: u32) -> u32 {
    MINUTES_PER_DAY.div_ceil(clamp_interval(interval_minutes))
}

/// A full day of samples is exactly 24.0 whatever the interval.
pub fn samples_to_hours(count: usize, samples_per_day: u32) -> f64 {
    if samples_per_day == 0 {
        return 0.0;
    }
    count as f64 / samples_per_day as f64 * 24.0
}

pub fn sample_instants(
    coords: &Coordinates,
    date: NaiveDate,
    interval_minutes: u32,
) -> impl Iterator<Item = DateTime<Utc>> {
    let start = angles::local_day_start(coords, date);
    let interval = clamp_interval(interval_minutes);
    (0..samples_per_day(interval)).map(move |i| start + minutes((i * interval) as f64))
}

/// Every sample of the day is computed; the day's polar condition is read
/// off the same samples, so a midnight-sun day always counts 24 h and a
/// polar-night day 0 h.
pub fn sample_day(coords: &Coordinates, date: NaiveDate, config: &SamplingConfig) -> DaySamples {
    let coords = coords.normalized();
    let per_day = samples_per_day(config.interval_minutes);

    let sun_up: Vec<SunSample> = sample_instants(&coords, date, config.interval_minutes)
        .map(|instant| SunSample {
            instant,
            position: angles::solar_position(&coords, &instant),
        })
        .filter(|s| s.position.is_above_horizon())
        .collect();

    DaySamples {
        date,
        polar_condition: classify_day(sun_up.len(), per_day),
        samples_per_day: per_day,
        sun_up,
    }
}

fn classify_day(sun_up: usize, samples_per_day: u32) -> PolarCondition {
    if sun_up == 0 {
        PolarCondition::PolarNight
    } else if sun_up >= samples_per_day as usize {
        PolarCondition::MidnightSun
    } else {
        PolarCondition::None
    }
}

pub fn daily_sun_hours(coords: &Coordinates, date: NaiveDate) -> DailySunData {
    daily_sun_hours_with(coords, date, &SamplingConfig::default())
}

pub fn daily_sun_hours_with(
    coords: &Coordinates,
    date: NaiveDate,
    config: &SamplingConfig,
) -> DailySunData {
    let day = sample_day(coords, date, config);
    let sun_hours = match day.polar_condition {
        PolarCondition::MidnightSun => 24.0,
        PolarCondition::PolarNight => 0.0,
        PolarCondition::None => day.sun_hours(),
    };
    DailySunData {
        date,
        sun_hours,
        sun_times: angles::sun_times_for(coords, date, day.polar_condition),
        polar_condition: day.polar_condition,
    }
}
