use chrono::{Datelike, NaiveDate};
use tracing::debug;

use crate::angles::{days_in_months, days_in_year};
use crate::compositor::composite_day;
use crate::sun_hours::{daily_sun_hours_with, sample_day};
use crate::types::{
    AnalysisPeriod, Coordinates, DailyResult, DateRange, DayExtreme, Obstacle, PolarCondition,
    SamplingConfig, SeasonalSummary, SunExposure, SunHoursBreakdown,
};

/// Years chrono cannot represent are pulled to its first or last year.
fn representable_year(year: i32) -> i32 {
    year.clamp(NaiveDate::MIN.year(), NaiveDate::MAX.year())
}

fn nearest_limit(year: i32) -> NaiveDate {
    if year < 0 {
        NaiveDate::MIN
    } else {
        NaiveDate::MAX
    }
}

/// Clamps year, month and day into the calendar instead of failing.
pub fn calendar_date(year: i32, month: u32, day: u32) -> NaiveDate {
    let year = representable_year(year);
    let month = month.clamp(1, 12);
    let day = day.clamp(1, days_in_months(year)[(month - 1) as usize]);
    NaiveDate::from_ymd_opt(year, month, day).unwrap_or_else(|| nearest_limit(year))
}

pub fn last_day_of_month(year: i32, month: u32) -> NaiveDate {
    let month = month.clamp(1, 12);
    calendar_date(year, month, days_in_months(year)[(month - 1) as usize])
}

impl DateRange {
    /// Endpoints are swapped if given backwards.
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        if start <= end {
            Self { start, end }
        } else {
            Self { start: end, end: start }
        }
    }

    pub fn single(date: NaiveDate) -> Self {
        Self::new(date, date)
    }

    pub fn from_days_of_year(year: i32, start: u32, end: u32) -> Self {
        let year = representable_year(year);
        let last = days_in_year(year);
        let date = |doy: u32| {
            NaiveDate::from_yo_opt(year, doy.clamp(1, last)).unwrap_or_else(|| nearest_limit(year))
        };
        Self::new(date(start), date(end))
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self::new(calendar_date(year, month, 1), last_day_of_month(year, month))
    }

    pub fn year(year: i32) -> Self {
        Self::new(calendar_date(year, 1, 1), calendar_date(year, 12, 31))
    }

    pub fn len_days(&self) -> usize {
        ((self.end - self.start).num_days() + 1).max(1) as usize
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Every calendar day, inclusive, stepped on the calendar rather than
    /// by a fixed duration.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        std::iter::successors(Some(self.start), |d| d.succ_opt()).take_while(move |d| *d <= end)
    }
}

impl AnalysisPeriod {
    /// Southern-hemisphere seasons that straddle new year end in `year + 1`.
    pub fn date_range(&self, year: i32, latitude: f64) -> DateRange {
        let southern = latitude < 0.0;
        let span = |from: (i32, u32, u32), to: (i32, u32)| {
            DateRange::new(calendar_date(from.0, from.1, from.2), last_day_of_month(to.0, to.1))
        };
        match (self, southern) {
            (AnalysisPeriod::FullYear, _) => DateRange::year(year),
            (AnalysisPeriod::GrowingSeason, false) => span((year, 4, 1), (year, 9)),
            (AnalysisPeriod::GrowingSeason, true) => span((year, 10, 1), (year + 1, 3)),
            (AnalysisPeriod::Summer, false) | (AnalysisPeriod::Winter, true) => {
                span((year, 6, 1), (year, 8))
            }
            (AnalysisPeriod::Summer, true) | (AnalysisPeriod::Winter, false) => {
                span((year, 12, 1), (year + 1, 2))
            }
            (AnalysisPeriod::Custom(range), _) => *range,
        }
    }
}

#[derive(Default)]
struct BreakdownSum {
    theoretical: f64,
    terrain: f64,
    tree: f64,
    overlap: f64,
    effective: f64,
}

impl BreakdownSum {
    fn add(&mut self, b: &SunHoursBreakdown) {
        self.theoretical += b.theoretical;
        self.terrain += b.terrain_and_building_shadow;
        self.tree += b.tree_shadow;
        self.overlap += b.overlap_shadow;
        self.effective += b.effective;
    }

    fn average(&self, days: usize) -> SunHoursBreakdown {
        let n = days.max(1) as f64;
        SunHoursBreakdown {
            theoretical: self.theoretical / n,
            terrain_and_building_shadow: self.terrain / n,
            tree_shadow: self.tree / n,
            overlap_shadow: self.overlap / n,
            effective: self.effective / n,
        }
    }
}

pub fn daily_result(
    coords: &Coordinates,
    obstacles: &[Obstacle],
    date: NaiveDate,
    config: &SamplingConfig,
) -> DailyResult {
    let data = daily_sun_hours_with(coords, date, config);
    let breakdown = if obstacles.is_empty() {
        SunHoursBreakdown::unobstructed(data.sun_hours)
    } else {
        let day = sample_day(coords, date, config);
        composite_day(&day, coords, coords, obstacles, config)
    };
    DailyResult { data, breakdown }
}

/// Obstacle bearings are measured from `coords`, which is also the
/// observation point.
pub fn seasonal_summary(
    coords: &Coordinates,
    obstacles: &[Obstacle],
    range: DateRange,
    config: &SamplingConfig,
) -> SeasonalSummary {
    let range = DateRange::new(range.start, range.end);
    let mut daily = Vec::with_capacity(range.len_days());
    let mut sum = BreakdownSum::default();
    let mut lowest: Option<DayExtreme> = None;
    let mut highest: Option<DayExtreme> = None;
    let mut midnight_sun_days = 0;
    let mut polar_night_days = 0;

    for date in range.days() {
        let result = daily_result(coords, obstacles, date, config);
        sum.add(&result.breakdown);
        match result.data.polar_condition {
            PolarCondition::MidnightSun => midnight_sun_days += 1,
            PolarCondition::PolarNight => polar_night_days += 1,
            PolarCondition::None => {}
        }

        let today = DayExtreme {
            date,
            effective_hours: result.breakdown.effective,
        };
        if lowest.map_or(true, |l| today.effective_hours < l.effective_hours) {
            lowest = Some(today);
        }
        if highest.map_or(true, |h| today.effective_hours > h.effective_hours) {
            highest = Some(today);
        }
        daily.push(result);
    }

    let average = sum.average(daily.len());
    debug!(
        start = %range.start,
        end = %range.end,
        days = daily.len(),
        average_effective = average.effective,
        "seasonal summary"
    );
    SeasonalSummary {
        range,
        average,
        daily,
        lowest,
        highest,
        midnight_sun_days,
        polar_night_days,
        exposure: SunExposure::classify(average.effective),
    }
}

pub fn monthly_summary(
    coords: &Coordinates,
    obstacles: &[Obstacle],
    year: i32,
    month: u32,
    config: &SamplingConfig,
) -> SeasonalSummary {
    seasonal_summary(coords, obstacles, DateRange::month(year, month), config)
}

pub fn yearly_summary(
    coords: &Coordinates,
    obstacles: &[Obstacle],
    year: i32,
    config: &SamplingConfig,
) -> SeasonalSummary {
    seasonal_summary(coords, obstacles, DateRange::year(year), config)
}

pub fn period_summary(
    coords: &Coordinates,
    obstacles: &[Obstacle],
    period: AnalysisPeriod,
    year: i32,
    config: &SamplingConfig,
) -> SeasonalSummary {
    seasonal_summary(
        coords,
        obstacles,
        period.date_range(year, coords.latitude),
        config,
    )
}
