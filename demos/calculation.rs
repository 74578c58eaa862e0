use chrono::{NaiveDate, TimeZone, Utc};
use chrono_tz::America::Los_Angeles;

use sun_exposure::geo::LocalFrame;
use sun_exposure::{
    combined_sun_hours, daily_sun_hours, exposure_grid, period_summary, solar_position,
    AnalysisPeriod, Coordinates, DateRange, GeoBounds, GridRequest, Obstacle, ObstacleKind,
    SamplingConfig,
};

fn main() {
    let yard = Coordinates::new(45.5152, -122.6784);
    let date = NaiveDate::from_ymd_opt(2026, 6, 21).unwrap();
    let local = Los_Angeles.with_ymd_and_hms(2026, 6, 21, 13, 0, 0).unwrap();

    let pos = solar_position(&yard, &local.with_timezone(&Utc));
    let daily = daily_sun_hours(&yard, date);

    println!("=== Sun Exposure Example ===");
    println!("Location: Portland, OR ({:.4}°N, {:.4}°W)", yard.latitude, -yard.longitude);
    println!("Date/Time: {}", local);
    println!();
    println!("--- Solar Position ---");
    println!("Declination: {:.2}°", pos.declination);
    println!("Equation of Time: {:.2} minutes", pos.equation_of_time);
    println!("Altitude: {:.2}°", pos.altitude);
    println!("Azimuth: {:.2}° (0°=N, 90°=E, 180°=S)", pos.azimuth);
    println!();
    println!("--- Day ---");
    if let (Some(rise), Some(set)) = (daily.sun_times.sunrise, daily.sun_times.sunset) {
        println!("Sunrise: {}", rise.with_timezone(&Los_Angeles));
        println!("Sunset: {}", set.with_timezone(&Los_Angeles));
    }
    println!("Theoretical sun hours: {:.2}", daily.sun_hours);

    let obstacles = vec![
        Obstacle::new("house", ObstacleKind::Building, 170.0, 8.0, 7.0, 12.0),
        Obstacle::new("maple", ObstacleKind::DeciduousTree, 250.0, 6.0, 10.0, 7.0),
        Obstacle::new("fence", ObstacleKind::Fence, 90.0, 3.0, 1.8, 10.0),
    ];
    let result = combined_sun_hours(&yard, &obstacles, &yard, date);
    let b = result.breakdown;
    println!();
    println!("--- With Obstacles ---");
    println!("Shaded by obstacles: {:.2} h", b.tree_shadow);
    println!("Effective sun hours: {:.2}", b.effective);

    let season = period_summary(
        &yard,
        &obstacles,
        AnalysisPeriod::GrowingSeason,
        2026,
        &SamplingConfig::default(),
    );
    println!(
        "Growing season average: {:.2} h ({:?})",
        season.average.effective, season.exposure
    );

    let frame = LocalFrame::new(yard);
    let sw = frame.to_geo(-10.0, -10.0);
    let ne = frame.to_geo(10.0, 10.0);
    let request = GridRequest::new(
        GeoBounds::new(sw.latitude, sw.longitude, ne.latitude, ne.longitude),
        2.0,
        obstacles,
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 4, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 9, 30).unwrap(),
        ),
        12,
    )
    .with_origin(yard);
    let grid = exposure_grid(&request);
    let stats = grid.stats();
    println!();
    println!("--- Exposure Grid ---");
    println!("Cells: {} x {}", grid.width, grid.height);
    println!("Sample days: {}", grid.sample_days_used());
    println!(
        "Hours: min {:.2}, mean {:.2}, max {:.2}",
        stats.min, stats.mean, stats.max
    );
    println!("Computed in {} ms", grid.compute_time_ms());
}
