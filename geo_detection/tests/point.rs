//! Conversion laws for single points

use std::f64::consts::PI;

use geo_detection::{
    get_distance, get_interpolated_point, Collector, CoordinatesUnit, Error, GeoReferenceSystem,
    Notice, Point, Silent, EARTH_RADIUS_KM,
};

fn approx_eq(a: f64, b: f64, epsilon: f64) -> bool {
    (a - b).abs() < epsilon
}

#[test]
fn test_latlon_cartesian_round_trip() {
    for unit in [CoordinatesUnit::Radians, CoordinatesUnit::Degrees] {
        let scale = match unit {
            CoordinatesUnit::Radians => 1.0,
            CoordinatesUnit::Degrees => 180.0 / PI,
        };
        for (lon, lat) in [(0.0, 0.0), (-3.0, 1.2), (2.5, -0.9), (0.1, 0.05)] {
            let original = Point::latlon(lon * scale, lat * scale, unit);
            let back = original.to_cartesian(&Silent).to_latlon_in(unit, &Silent);
            assert_eq!(back.coordinates_unit(), Some(unit));
            assert!(approx_eq(back.x_lon(), original.x_lon(), 1e-9));
            assert!(approx_eq(back.y_lat(), original.y_lat(), 1e-9));
        }
    }
}

#[test]
fn test_to_latlon_defaults_to_radians() {
    let pt = Point::cartesian(100.0, 200.0).to_latlon(&Silent);
    assert_eq!(pt.geo_reference_system(), GeoReferenceSystem::LatLon);
    assert_eq!(pt.coordinates_unit(), Some(CoordinatesUnit::Radians));
    assert!(approx_eq(pt.x_lon(), 100.0 / EARTH_RADIUS_KM, 1e-12));
}

#[test]
fn test_to_latlon_on_degrees_gives_radians() {
    let collector = Collector::new();
    let pt = Point::latlon(180.0, 90.0, CoordinatesUnit::Degrees).to_latlon(&collector);
    assert_eq!(pt.coordinates_unit(), Some(CoordinatesUnit::Radians));
    assert!(approx_eq(pt.x_lon(), PI, 1e-12));
    assert!(approx_eq(pt.y_lat(), PI / 2.0, 1e-12));
    assert_eq!(
        collector.notices(),
        vec![Notice::RedundantReferenceConversion(GeoReferenceSystem::LatLon)]
    );
}

#[test]
fn test_in_place_conversions_chain() {
    let mut pt = Point::latlon(90.0, 45.0, CoordinatesUnit::Degrees);
    pt.to_radians_(&Silent).unwrap().to_cartesian_(&Silent).to_latlon_(&Silent);
    assert!(approx_eq(pt.x_lon(), PI / 2.0, 1e-9));
    assert!(approx_eq(pt.y_lat(), PI / 4.0, 1e-9));
}

#[test]
fn test_degrees_radians_identity() {
    let pt = Point::latlon(12.0, -33.0, CoordinatesUnit::Degrees);
    let back = pt.to_radians(&Silent).unwrap().to_degrees(&Silent).unwrap();
    assert!(approx_eq(back.x_lon(), 12.0, 1e-9));
    assert!(approx_eq(back.y_lat(), -33.0, 1e-9));
}

#[test]
fn test_cartesian_has_no_units() {
    let pt = Point::cartesian(1.0, 1.0);
    assert_eq!(pt.coordinates_unit(), None);
    assert_eq!(pt.to_radians(&Silent), Err(Error::UnitNotApplicable));
}

#[test]
fn test_haversine_known_value() {
    // London to Paris is roughly 344 km
    let london = Point::latlon(-0.1278, 51.5074, CoordinatesUnit::Degrees);
    let paris = Point::latlon(2.3522, 48.8566, CoordinatesUnit::Degrees);
    let d = get_distance(&london, &paris).unwrap();
    assert!(approx_eq(d, 343.5, 5.0));
    assert_eq!(get_distance(&paris, &paris), Ok(0.0));
}

#[test]
fn test_distance_across_systems_fails() {
    let a = Point::latlon(0.0, 0.0, CoordinatesUnit::Radians);
    let b = Point::cartesian(0.0, 0.0);
    assert_eq!(
        get_distance(&a, &b),
        Err(Error::ReferenceSystemMismatch {
            expected: GeoReferenceSystem::LatLon,
            found: GeoReferenceSystem::Cartesian,
        })
    );
}

#[test]
fn test_interpolated_point() {
    let pt = get_interpolated_point(&Point::cartesian(0.0, 0.0), &Point::cartesian(2.0, 2.0), 0.5)
        .unwrap();
    assert_eq!(pt, Point::cartesian(1.0, 1.0));

    // Extrapolation is allowed
    let pt = get_interpolated_point(&Point::cartesian(0.0, 0.0), &Point::cartesian(2.0, 2.0), 1.5)
        .unwrap();
    assert_eq!(pt.coordinates(), [3.0, 3.0]);
}
