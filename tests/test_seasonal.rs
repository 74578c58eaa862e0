use chrono::{Datelike, NaiveDate};

use sun_exposure::seasonal::*;
use sun_exposure::sun_hours::daily_sun_hours;
use sun_exposure::types::{
    AnalysisPeriod, Coordinates, DateRange, Obstacle, ObstacleKind, SamplingConfig, SunExposure,
};

macro_rules! assert_approx {
    ($left:expr, $right:expr, $tol:expr) => {
        let (l, r) = ($left as f64, $right as f64);
        assert!(
            (l - r).abs() <= $tol,
            "assert_approx failed: left={}, right={}, diff={}, tol={}",
            l, r, (l - r).abs(), $tol
        );
    };
}

fn portland() -> Coordinates {
    Coordinates::new(45.5152, -122.6784)
}

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

// ── Date ranges ──

#[test]
fn test_date_range_days_inclusive() {
    let r = DateRange::new(date(2026, 2, 26), date(2026, 3, 2));
    let days: Vec<_> = r.days().collect();
    assert_eq!(days.len(), 5);
    assert_eq!(r.len_days(), 5);
    assert_eq!(days[0], date(2026, 2, 26));
    assert_eq!(days[4], date(2026, 3, 2));
}

#[test]
fn test_date_range_swaps_inverted_endpoints() {
    let r = DateRange::new(date(2026, 9, 30), date(2026, 4, 1));
    assert_eq!(r.start, date(2026, 4, 1));
    assert_eq!(r.end, date(2026, 9, 30));
    assert!(r.contains(date(2026, 6, 21)));
    assert!(!r.contains(date(2026, 10, 1)));
}

#[test]
fn test_month_ranges_follow_calendar() {
    assert_eq!(DateRange::month(2024, 2).len_days(), 29);
    assert_eq!(DateRange::month(2026, 2).len_days(), 28);
    assert_eq!(DateRange::month(2026, 12).end, date(2026, 12, 31));
    assert_eq!(DateRange::year(2024).len_days(), 366);
    assert_eq!(DateRange::single(date(2026, 5, 5)).len_days(), 1);
}

#[test]
fn test_days_of_year_are_clamped() {
    let r = DateRange::from_days_of_year(2026, 0, 400);
    assert_eq!(r.start, date(2026, 1, 1));
    assert_eq!(r.end, date(2026, 12, 31));
    let r = DateRange::from_days_of_year(2026, 172, 172);
    assert_eq!(r.start, date(2026, 6, 21));
}

#[test]
fn test_calendar_date_clamps() {
    assert_eq!(calendar_date(2026, 2, 31), date(2026, 2, 28));
    assert_eq!(calendar_date(2026, 13, 1), date(2026, 12, 1));
    assert_eq!(last_day_of_month(2024, 2), date(2024, 2, 29));
}

#[test]
fn test_unrepresentable_years_clamp_to_calendar_limits() {
    let far = calendar_date(i32::MAX, 6, 15);
    assert_eq!(far.year(), NaiveDate::MAX.year());
    assert_eq!(far.month(), 6);
    assert_eq!(calendar_date(i32::MIN, 1, 1), NaiveDate::MIN);

    assert_eq!(DateRange::from_days_of_year(i32::MIN, 1, 1).start, NaiveDate::MIN);
    assert_eq!(DateRange::from_days_of_year(i32::MAX, 400, 400).end, NaiveDate::MAX);

    let far_year = DateRange::year(i32::MAX);
    assert_eq!(far_year.end, NaiveDate::MAX);
    assert!(far_year.start.year() != 1970);
}

// ── Analysis periods ──

#[test]
fn test_growing_season_by_hemisphere() {
    let north = AnalysisPeriod::GrowingSeason.date_range(2026, 45.0);
    assert_eq!((north.start, north.end), (date(2026, 4, 1), date(2026, 9, 30)));
    let south = AnalysisPeriod::GrowingSeason.date_range(2026, -33.9);
    assert_eq!((south.start, south.end), (date(2026, 10, 1), date(2027, 3, 31)));
}

#[test]
fn test_summer_and_winter_flip_south() {
    let north_summer = AnalysisPeriod::Summer.date_range(2026, 45.0);
    let south_winter = AnalysisPeriod::Winter.date_range(2026, -33.9);
    assert_eq!(north_summer, south_winter);
    let north_winter = AnalysisPeriod::Winter.date_range(2026, 45.0);
    assert_eq!(north_winter.start, date(2026, 12, 1));
    assert_eq!(north_winter.end, date(2027, 2, 28));
}

#[test]
fn test_custom_period_passes_through() {
    let r = DateRange::new(date(2026, 5, 1), date(2026, 5, 10));
    assert_eq!(AnalysisPeriod::Custom(r).date_range(2030, -10.0), r);
    assert_eq!(AnalysisPeriod::FullYear.date_range(2026, 0.0), DateRange::year(2026));
}

// ── Exposure classes ──

#[test]
fn test_classify_thresholds() {
    assert_eq!(SunExposure::classify(8.0), SunExposure::FullSun);
    assert_eq!(SunExposure::classify(6.0), SunExposure::FullSun);
    assert_eq!(SunExposure::classify(5.9), SunExposure::PartSun);
    assert_eq!(SunExposure::classify(4.0), SunExposure::PartSun);
    assert_eq!(SunExposure::classify(2.0), SunExposure::PartShade);
    assert_eq!(SunExposure::classify(1.9), SunExposure::FullShade);
    assert_eq!(SunExposure::classify(0.0), SunExposure::FullShade);
}

// ── Summaries ──

#[test]
fn test_june_summary_for_open_site() {
    let s = monthly_summary(&portland(), &[], 2026, 6, &SamplingConfig::default());
    assert_eq!(s.daily.len(), 30);
    let mean = s.daily.iter().map(|d| d.data.sun_hours).sum::<f64>() / 30.0;
    assert_approx!(s.average.effective, mean, 1e-9);
    assert_approx!(s.average.theoretical, s.average.effective, 1e-9);
    assert!((15.0..=15.6).contains(&s.average.effective), "{}", s.average.effective);
    assert_eq!(s.exposure, SunExposure::FullSun);

    let lowest = s.lowest.unwrap();
    let highest = s.highest.unwrap();
    assert_eq!(lowest.date, date(2026, 6, 1));
    assert!(highest.date > date(2026, 6, 10), "{}", highest.date);
    assert!(highest.effective_hours > lowest.effective_hours);
    assert_eq!(lowest.effective_hours, daily_sun_hours(&portland(), lowest.date).sun_hours);
}

#[test]
fn test_obstructed_summary_is_darker() {
    let house = Obstacle::new("house", ObstacleKind::Building, 180.0, 3.0, 8.0, 30.0);
    let range = DateRange::new(date(2026, 12, 1), date(2026, 12, 10));
    let open = seasonal_summary(&portland(), &[], range, &SamplingConfig::default());
    let shaded = seasonal_summary(&portland(), &[house], range, &SamplingConfig::default());
    assert!(shaded.average.effective < open.average.effective);
    assert_eq!(shaded.average.theoretical, open.average.theoretical);
    assert_eq!(shaded.exposure, SunExposure::FullShade);
}

#[test]
fn test_arctic_year_counts_polar_days() {
    let tromso = Coordinates::new(69.6, 18.96);
    let s = yearly_summary(&tromso, &[], 2026, &SamplingConfig::default());
    assert_eq!(s.daily.len(), 365);
    assert!((50..=70).contains(&s.midnight_sun_days), "{}", s.midnight_sun_days);
    assert!((45..=65).contains(&s.polar_night_days), "{}", s.polar_night_days);
    assert_eq!(s.lowest.unwrap().effective_hours, 0.0);
    assert_eq!(s.highest.unwrap().effective_hours, 24.0);
}

#[test]
fn test_period_summary_uses_hemisphere() {
    let sydney = Coordinates::new(-33.87, 151.21);
    let s = period_summary(
        &sydney,
        &[],
        AnalysisPeriod::Summer,
        2026,
        &SamplingConfig::default(),
    );
    assert_eq!(s.range.start, date(2026, 12, 1));
    assert!(s.average.effective > 13.0, "{}", s.average.effective);
}
