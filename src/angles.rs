use std::f64::consts::PI;

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveTime, TimeZone, Timelike, Utc};

use crate::sun_hours::sample_day;
use crate::types::{Coordinates, PolarCondition, SamplingConfig, SolarPosition, SunTimes};

pub const DEGREES_PER_HOUR: f64 = 15.0;
pub const MINUTES_PER_DEGREE: f64 = 4.0;

pub fn deg_to_rad(deg: f64) -> f64 {
    deg * (PI / 180.0)
}

pub fn rad_to_deg(rad: f64) -> f64 {
    rad * (180.0 / PI)
}

/// Wraps into [0, 360). `rem_euclid` can round tiny negatives up to 360.0.
pub fn normalize_angle(angle: f64) -> f64 {
    let wrapped = angle.rem_euclid(360.0);
    if wrapped >= 360.0 {
        0.0
    } else {
        wrapped
    }
}

/// Smallest separation between two bearings, in [0, 180].
pub fn angular_difference(a: f64, b: f64) -> f64 {
    let diff = normalize_angle(a - b);
    if diff > 180.0 {
        360.0 - diff
    } else {
        diff
    }
}

pub fn leap_year(year: i32) -> bool {
    (year % 400 == 0) || (year % 4 == 0 && year % 100 != 0)
}

pub fn days_in_year(year: i32) -> u32 {
    if leap_year(year) {
        366
    } else {
        365
    }
}

pub fn days_in_months(year: i32) -> [u32; 12] {
    [
        31,
        if leap_year(year) { 29 } else { 28 },
        31, 30, 31, 30, 31, 31, 30, 31, 30, 31,
    ]
}

/// Fractional year in radians (NOAA convention).
pub fn fractional_year(day_of_year: u32, utc_hours: f64, year_length: u32) -> f64 {
    2.0 * PI / year_length as f64 * (day_of_year as f64 - 1.0 + (utc_hours - 12.0) / 24.0)
}

/// Minutes.
pub fn equation_of_time(gamma: f64) -> f64 {
    229.18
        * (0.000075
            + 0.001868 * gamma.cos()
            - 0.032077 * gamma.sin()
            - 0.014615 * (2.0 * gamma).cos()
            - 0.040849 * (2.0 * gamma).sin())
}

/// Degrees.
pub fn solar_declination(gamma: f64) -> f64 {
    rad_to_deg(
        0.006918 - 0.399912 * gamma.cos() + 0.070257 * gamma.sin()
            - 0.006758 * (2.0 * gamma).cos()
            + 0.000907 * (2.0 * gamma).sin()
            - 0.002697 * (3.0 * gamma).cos()
            + 0.00148 * (3.0 * gamma).sin(),
    )
}

pub fn utc_lst_correction(longitude: f64, eot: f64) -> f64 {
    (MINUTES_PER_DEGREE * longitude + eot) / 60.0
}

pub fn hour_angle(local_solar_time: f64) -> f64 {
    DEGREES_PER_HOUR * (local_solar_time - 12.0)
}

pub fn solar_zenith_angle(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let lat_rad = deg_to_rad(latitude);
    let dec_rad = deg_to_rad(declination);
    let ha_rad = deg_to_rad(hour_angle);
    let cos_zenith =
        lat_rad.sin() * dec_rad.sin() + lat_rad.cos() * dec_rad.cos() * ha_rad.cos();
    rad_to_deg(cos_zenith.clamp(-1.0, 1.0).acos())
}

pub fn solar_altitude(zenith_angle: f64) -> f64 {
    90.0 - zenith_angle
}

pub fn solar_azimuth(latitude: f64, declination: f64, hour_angle: f64) -> f64 {
    let lat_rad = deg_to_rad(latitude);
    let dec_rad = deg_to_rad(declination);
    let ha_rad = deg_to_rad(hour_angle);
    let sin_az = -dec_rad.cos() * ha_rad.sin();
    let cos_az = dec_rad.sin() * lat_rad.cos() - dec_rad.cos() * lat_rad.sin() * ha_rad.cos();
    normalize_angle(rad_to_deg(sin_az.atan2(cos_az)))
}

fn utc_hours(instant: &DateTime<Utc>) -> f64 {
    instant.hour() as f64
        + instant.minute() as f64 / 60.0
        + (instant.second() as f64 + instant.nanosecond() as f64 / 1e9) / 3600.0
}

fn fractional_year_at(instant: &DateTime<Utc>) -> f64 {
    fractional_year(instant.ordinal(), utc_hours(instant), days_in_year(instant.year()))
}

pub fn utc_midnight(date: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&date.and_time(NaiveTime::MIN))
}

/// Mean local midnight of `date` at the given longitude, as a UTC instant.
pub fn local_day_start(coords: &Coordinates, date: NaiveDate) -> DateTime<Utc> {
    utc_midnight(date) - minutes(MINUTES_PER_DEGREE * coords.normalized().longitude)
}

pub(crate) fn minutes(value: f64) -> Duration {
    Duration::milliseconds((value * 60_000.0).round() as i64)
}

pub fn solar_position(coords: &Coordinates, instant: &DateTime<Utc>) -> SolarPosition {
    let coords = coords.normalized();
    let gamma = fractional_year_at(instant);
    let eot = equation_of_time(gamma);
    let decl = solar_declination(gamma);
    let correction = utc_lst_correction(coords.longitude, eot);
    let lst = (utc_hours(instant) + correction).rem_euclid(24.0);
    let ha = hour_angle(lst);
    let zenith = solar_zenith_angle(coords.latitude, decl, ha);
    SolarPosition {
        day_of_year: instant.ordinal(),
        declination: decl,
        equation_of_time: eot,
        local_solar_time: lst,
        hour_angle: ha,
        zenith,
        altitude: solar_altitude(zenith),
        azimuth: solar_azimuth(coords.latitude, decl, ha),
    }
}

pub fn solar_noon(coords: &Coordinates, date: NaiveDate) -> DateTime<Utc> {
    let coords = coords.normalized();
    let midnight = utc_midnight(date);
    let mean_noon = 720.0 - MINUTES_PER_DEGREE * coords.longitude;
    let mut noon_minutes = mean_noon;
    // EoT drifts by seconds per day, two passes settle it.
    for _ in 0..2 {
        let eot = equation_of_time(fractional_year_at(&(midnight + minutes(noon_minutes))));
        noon_minutes = mean_noon - eot;
    }
    midnight + minutes(noon_minutes)
}

/// Decided from the same altitude samples the day integrator counts, at
/// the default interval: every sample up is midnight sun, none up is
/// polar night.
pub fn polar_condition(coords: &Coordinates, date: NaiveDate) -> PolarCondition {
    sample_day(coords, date, &SamplingConfig::default()).polar_condition
}

/// Half the daylight arc in degrees of hour angle, for a 0° horizon.
pub fn sunset_hour_angle(latitude: f64, declination: f64) -> f64 {
    let lat_rad = deg_to_rad(latitude);
    let dec_rad = deg_to_rad(declination);
    let cos_h = -(lat_rad.sin() * dec_rad.sin()) / (lat_rad.cos() * dec_rad.cos());
    if cos_h.is_nan() {
        return 90.0;
    }
    rad_to_deg(cos_h.clamp(-1.0, 1.0).acos())
}

pub fn sun_times(coords: &Coordinates, date: NaiveDate) -> SunTimes {
    sun_times_for(coords, date, polar_condition(coords, date))
}

/// Sun times for a day whose polar condition is already known.
pub(crate) fn sun_times_for(
    coords: &Coordinates,
    date: NaiveDate,
    condition: PolarCondition,
) -> SunTimes {
    if condition != PolarCondition::None {
        return SunTimes {
            sunrise: None,
            sunset: None,
            solar_noon: None,
            polar_condition: condition,
        };
    }

    let coords = coords.normalized();
    let noon = solar_noon(&coords, date);
    let decl = solar_declination(fractional_year_at(&noon));
    let half_day = minutes(sunset_hour_angle(coords.latitude, decl) * MINUTES_PER_DEGREE);
    SunTimes {
        sunrise: Some(noon - half_day),
        sunset: Some(noon + half_day),
        solar_noon: Some(noon),
        polar_condition: condition,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_never_returns_full_turn() {
        assert_eq!(normalize_angle(-1e-18), 0.0);
        assert_eq!(normalize_angle(360.0), 0.0);
    }

    #[test]
    fn sunset_hour_angle_at_equinox_is_quarter_turn() {
        assert!((sunset_hour_angle(45.0, 0.0) - 90.0).abs() < 1e-9);
        assert!((sunset_hour_angle(90.0, 0.0) - 90.0).abs() < 1e-9);
    }
}
