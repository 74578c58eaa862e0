use sun_exposure::geo::LocalFrame;
use sun_exposure::projection::*;
use sun_exposure::types::{Coordinates, Obstacle, ObstacleKind, SolarPosition};

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

fn sun(altitude: f64, azimuth: f64) -> SolarPosition {
    SolarPosition {
        day_of_year: 172,
        declination: 23.44,
        equation_of_time: 0.0,
        local_solar_time: 12.0,
        hour_angle: 0.0,
        zenith: 90.0 - altitude,
        altitude,
        azimuth,
    }
}

fn observer() -> Coordinates {
    Coordinates::new(45.5152, -122.6784)
}

fn south_building() -> Obstacle {
    Obstacle::new("house", ObstacleKind::Building, 180.0, 5.0, 20.0, 40.0)
}

fn south_tree() -> Obstacle {
    Obstacle::new("fir", ObstacleKind::EvergreenTree, 180.0, 10.0, 10.0, 6.0)
}

// ── Shadow length ──

#[test]
fn test_shadow_length() {
    assert_approx!(shadow_length(20.0, 45.0), 20.0, 1e-9);
    assert_approx!(shadow_length(10.0, 30.0), 17.3205, 1e-3);
    assert_eq!(shadow_length(10.0, 0.001), MAX_SHADOW_LENGTH_METERS);
}

// ── Footprints ──

#[test]
fn test_building_footprint_is_quadrilateral() {
    let shadow = project_shadow(&observer(), &south_building(), &sun(45.0, 180.0)).unwrap();
    assert_eq!(shadow.vertices.len(), 4);
    assert_eq!(shadow.obstacle_id, "house");
    assert_eq!(shadow.shade_intensity, 1.0);
    assert_approx!(shadow.length_meters, 20.0, 1e-9);
    assert_approx!(shadow.area_square_meters(), 800.0, 1.0);
}

#[test]
fn test_building_footprint_points_away_from_sun() {
    let shadow = project_shadow(&observer(), &south_building(), &sun(45.0, 180.0)).unwrap();
    let frame = LocalFrame::new(observer());
    assert!(shadow.contains(&observer()));
    assert!(shadow.contains(&frame.to_geo(0.0, 14.0)));
    assert!(shadow.contains(&frame.to_geo(-18.0, 10.0)));
    assert!(!shadow.contains(&frame.to_geo(0.0, 16.0)));
    assert!(!shadow.contains(&frame.to_geo(25.0, 0.0)));
    assert!(!shadow.contains(&frame.to_geo(0.0, -8.0)));
}

#[test]
fn test_tree_footprint_is_fan() {
    let shadow = project_shadow(&observer(), &south_tree(), &sun(30.0, 180.0)).unwrap();
    let frame = LocalFrame::new(observer());
    assert_eq!(shadow.vertices.len(), 3);
    assert_approx!(shadow.shade_intensity, 0.9, 1e-12);
    assert!(shadow.contains(&observer()));
    assert!(!shadow.contains(&frame.to_geo(2.5, 0.0)));
    assert!(shadow.contains(&frame.to_geo(2.5, 5.0)));
}

#[test]
fn test_evening_shadow_falls_east() {
    let tree = Obstacle::new("fir", ObstacleKind::EvergreenTree, 270.0, 10.0, 10.0, 6.0);
    let shadow = project_shadow(&observer(), &tree, &sun(30.0, 270.0)).unwrap();
    let frame = LocalFrame::new(observer());
    assert!(shadow.contains(&frame.to_geo(0.0, 0.0)));
    assert!(!shadow.contains(&frame.to_geo(-15.0, 0.0)));
}

// ── No shadow ──

#[test]
fn test_no_shadow_when_sun_down_or_above() {
    assert!(project_shadow(&observer(), &south_tree(), &sun(-1.0, 180.0)).is_none());
    assert!(project_shadow(&observer(), &south_tree(), &sun(0.0, 180.0)).is_none());
    assert!(project_shadow(&observer(), &south_tree(), &sun(50.0, 180.0)).is_none());
}

#[test]
fn test_project_shadows_skips_clear_obstacles() {
    let shadows = project_shadows(
        &observer(),
        &[south_building(), south_tree()],
        &sun(50.0, 180.0),
    );
    assert_eq!(shadows.len(), 1);
    assert_eq!(shadows[0].obstacle_id, "house");
}

// ── Points other than the observer ──

#[test]
fn test_point_in_shadow_from_origin() {
    let frame = LocalFrame::new(observer());
    let s = sun(45.0, 180.0);
    assert!(point_in_shadow(&observer(), &frame.to_geo(0.0, 14.0), &south_building(), &s));
    assert!(!point_in_shadow(&observer(), &frame.to_geo(0.0, 16.0), &south_building(), &s));
    assert!(!point_in_shadow(&observer(), &frame.to_geo(0.0, -30.0), &south_building(), &s));
}

#[test]
fn test_footprint_agrees_with_angular_test_behind_building() {
    let s = sun(40.0, 180.0);
    let b = south_building();
    assert_eq!(
        footprint_covers(&observer(), &b, &s),
        sun_exposure::shadow::is_blocked(&s, &b).blocked
    );
}

// ── Across the 180° meridian ──

#[test]
fn test_square_straddling_180_contains_both_sides() {
    let square = vec![
        Coordinates::new(-17.0, 179.9),
        Coordinates::new(-17.0, -179.9),
        Coordinates::new(-16.0, -179.9),
        Coordinates::new(-16.0, 179.9),
    ];
    assert!(point_in_polygon(&Coordinates::new(-16.5, 179.9999), &square));
    assert!(point_in_polygon(&Coordinates::new(-16.5, -179.9999), &square));
    assert!(!point_in_polygon(&Coordinates::new(-16.5, 0.0), &square));
    assert!(!point_in_polygon(&Coordinates::new(-16.5, 179.5), &square));
}

#[test]
fn test_tree_shadow_across_180_covers_observer() {
    let observer = Coordinates::new(-16.8, 179.99995);
    let tree = Obstacle::new("palm", ObstacleKind::EvergreenTree, 90.0, 10.0, 10.0, 6.0);
    let s = sun(30.0, 90.0);

    let shadow = project_shadow(&observer, &tree, &s).unwrap();
    assert!(shadow.vertices.iter().any(|v| v.longitude < 0.0));
    assert!(shadow.vertices.iter().any(|v| v.longitude > 0.0));
    assert!(shadow.contains(&observer));
    assert!(footprint_covers(&observer, &tree, &s));
    assert_approx!(shadow.area_square_meters(), 0.5 * 6.0 * 10.0 / 30f64.to_radians().tan(), 0.1);
}
