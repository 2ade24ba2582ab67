use std::f64::consts::{FRAC_PI_2, FRAC_PI_4, PI};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::{
    Diagnostics, Error, Notice, Result, DEFAULT_COORDINATES_UNIT, DEFAULT_REFERENCE_SYSTEM,
    EARTH_RADIUS_KM,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeoReferenceSystem {
    /// Longitude and latitude on a sphere
    LatLon,
    /// Planar Euclidean space, in kilometers when projected from `LatLon`
    Cartesian,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordinatesUnit {
    Radians,
    Degrees,
}

impl fmt::Display for GeoReferenceSystem {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            GeoReferenceSystem::LatLon => write!(f, "latlon"),
            GeoReferenceSystem::Cartesian => write!(f, "cartesian"),
        }
    }
}

impl FromStr for GeoReferenceSystem {
    type Err = Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "latlon" => Ok(GeoReferenceSystem::LatLon),
            "cartesian" => Ok(GeoReferenceSystem::Cartesian),
            _ => Err(Error::UnknownReferenceSystem(x.to_string())),
        }
    }
}

impl fmt::Display for CoordinatesUnit {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            CoordinatesUnit::Radians => write!(f, "radians"),
            CoordinatesUnit::Degrees => write!(f, "degrees"),
        }
    }
}

impl FromStr for CoordinatesUnit {
    type Err = Error;

    fn from_str(x: &str) -> Result<Self> {
        match x {
            "radians" => Ok(CoordinatesUnit::Radians),
            "degrees" => Ok(CoordinatesUnit::Degrees),
            _ => Err(Error::UnknownCoordinatesUnit(x.to_string())),
        }
    }
}

/// The reference system of a point together with its unit. A unit only exists under `LatLon`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Reference {
    LatLon(CoordinatesUnit),
    Cartesian,
}

impl Reference {
    /// `unit` is ignored for `Cartesian`.
    pub fn new(system: GeoReferenceSystem, unit: CoordinatesUnit) -> Self {
        match system {
            GeoReferenceSystem::LatLon => Reference::LatLon(unit),
            GeoReferenceSystem::Cartesian => Reference::Cartesian,
        }
    }

    pub fn parse(system: &str, unit: &str) -> Result<Self> {
        Ok(Self::new(system.parse()?, unit.parse()?))
    }

    pub fn system(self) -> GeoReferenceSystem {
        match self {
            Reference::LatLon(_) => GeoReferenceSystem::LatLon,
            Reference::Cartesian => GeoReferenceSystem::Cartesian,
        }
    }

    pub fn unit(self) -> Option<CoordinatesUnit> {
        match self {
            Reference::LatLon(unit) => Some(unit),
            Reference::Cartesian => None,
        }
    }

    /// Checks that points in `other` could live next to points in `self`.
    pub fn check_matches(self, other: Reference) -> Result<()> {
        match (self, other) {
            (Reference::LatLon(expected), Reference::LatLon(found)) if expected != found => {
                Err(Error::CoordinatesUnitMismatch { expected, found })
            }
            _ if self.system() != other.system() => Err(Error::ReferenceSystemMismatch {
                expected: self.system(),
                found: other.system(),
            }),
            _ => Ok(()),
        }
    }
}

impl Default for Reference {
    fn default() -> Self {
        Reference::new(DEFAULT_REFERENCE_SYSTEM, DEFAULT_COORDINATES_UNIT)
    }
}

/// A single location, optionally carrying a measurement taken there.
///
/// Under `LatLon`, `x_lon` is the longitude and `y_lat` the latitude.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Point {
    x_lon: f64,
    y_lat: f64,
    reference: Reference,
    pub measurement_value: Option<f64>,
    pub measurement_type: Option<String>,
}

impl Point {
    pub fn new(x_lon: f64, y_lat: f64, reference: Reference) -> Self {
        Self {
            x_lon,
            y_lat,
            reference,
            measurement_value: None,
            measurement_type: None,
        }
    }

    pub fn latlon(lon: f64, lat: f64, unit: CoordinatesUnit) -> Self {
        Self::new(lon, lat, Reference::LatLon(unit))
    }

    pub fn cartesian(x: f64, y: f64) -> Self {
        Self::new(x, y, Reference::Cartesian)
    }

    /// Builds a point from a raw coordinate list, which must hold exactly two values.
    pub fn from_slice(coordinates: &[f64], reference: Reference) -> Result<Self> {
        match coordinates {
            [x, y] => Ok(Self::new(*x, *y, reference)),
            _ => Err(Error::InvalidCoordinates {
                len: coordinates.len(),
            }),
        }
    }

    pub fn with_measurement(mut self, value: f64, measurement_type: Option<String>) -> Self {
        self.measurement_value = Some(value);
        self.measurement_type = measurement_type;
        self
    }

    pub fn x_lon(&self) -> f64 {
        self.x_lon
    }

    pub fn y_lat(&self) -> f64 {
        self.y_lat
    }

    pub fn coordinates(&self) -> [f64; 2] {
        [self.x_lon, self.y_lat]
    }

    pub fn set_x_lon(&mut self, x_lon: f64) {
        self.x_lon = x_lon;
    }

    pub fn set_y_lat(&mut self, y_lat: f64) {
        self.y_lat = y_lat;
    }

    pub fn reference(&self) -> Reference {
        self.reference
    }

    pub fn geo_reference_system(&self) -> GeoReferenceSystem {
        self.reference.system()
    }

    /// None for cartesian points
    pub fn coordinates_unit(&self) -> Option<CoordinatesUnit> {
        self.reference.unit()
    }

    pub fn to_cartesian(&self, diagnostics: &dyn Diagnostics) -> Point {
        let mut copy = self.clone();
        copy.to_cartesian_(diagnostics);
        copy
    }

    /// Projects a `LatLon` point onto the plane with a spherical Mercator projection.
    /// Latitudes past the Mercator limit are clamped to it.
    pub fn to_cartesian_(&mut self, diagnostics: &dyn Diagnostics) -> &mut Self {
        let unit = match self.reference {
            Reference::LatLon(unit) => unit,
            Reference::Cartesian => {
                diagnostics.notice(Notice::RedundantReferenceConversion(
                    GeoReferenceSystem::Cartesian,
                ));
                return self;
            }
        };
        let lon = to_radians(self.x_lon, unit);
        let lat = to_radians(self.y_lat, unit).clamp(-MAX_MERCATOR_LAT, MAX_MERCATOR_LAT);
        self.x_lon = EARTH_RADIUS_KM * lon;
        self.y_lat = EARTH_RADIUS_KM * (FRAC_PI_4 + lat / 2.0).tan().ln();
        self.reference = Reference::Cartesian;
        self
    }

    /// The result is in radians.
    pub fn to_latlon(&self, diagnostics: &dyn Diagnostics) -> Point {
        self.to_latlon_in(CoordinatesUnit::Radians, diagnostics)
    }

    pub fn to_latlon_(&mut self, diagnostics: &dyn Diagnostics) -> &mut Self {
        self.to_latlon_in_(CoordinatesUnit::Radians, diagnostics)
    }

    pub fn to_latlon_in(&self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> Point {
        let mut copy = self.clone();
        copy.to_latlon_in_(unit, diagnostics);
        copy
    }

    /// Inverse of `to_cartesian_`. A point that's already `LatLon` is only brought into `unit`.
    pub fn to_latlon_in_(&mut self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> &mut Self {
        if let Reference::LatLon(current) = self.reference {
            diagnostics.notice(Notice::RedundantReferenceConversion(GeoReferenceSystem::LatLon));
            if current != unit {
                self.convert_unit(current, unit);
            }
            return self;
        }
        let lon = self.x_lon / EARTH_RADIUS_KM;
        let lat = 2.0 * (self.y_lat / EARTH_RADIUS_KM).exp().atan() - FRAC_PI_2;
        self.x_lon = from_radians(lon, unit);
        self.y_lat = from_radians(lat, unit);
        self.reference = Reference::LatLon(unit);
        self
    }

    pub fn to_radians(&self, diagnostics: &dyn Diagnostics) -> Result<Point> {
        let mut copy = self.clone();
        copy.to_radians_(diagnostics)?;
        Ok(copy)
    }

    pub fn to_radians_(&mut self, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        self.to_unit_(CoordinatesUnit::Radians, diagnostics)
    }

    pub fn to_degrees(&self, diagnostics: &dyn Diagnostics) -> Result<Point> {
        let mut copy = self.clone();
        copy.to_degrees_(diagnostics)?;
        Ok(copy)
    }

    pub fn to_degrees_(&mut self, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        self.to_unit_(CoordinatesUnit::Degrees, diagnostics)
    }

    fn to_unit_(&mut self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        match self.reference {
            Reference::Cartesian => Err(Error::UnitNotApplicable),
            Reference::LatLon(current) if current == unit => {
                diagnostics.notice(Notice::RedundantUnitConversion(unit));
                Ok(self)
            }
            Reference::LatLon(current) => {
                self.convert_unit(current, unit);
                Ok(self)
            }
        }
    }

    fn convert_unit(&mut self, from: CoordinatesUnit, to: CoordinatesUnit) {
        self.x_lon = from_radians(to_radians(self.x_lon, from), to);
        self.y_lat = from_radians(to_radians(self.y_lat, from), to);
        self.reference = Reference::LatLon(to);
    }

    /// See `get_distance`
    pub fn distance_to(&self, other: &Point) -> Result<f64> {
        get_distance(self, other)
    }

    /// (longitude, latitude) in radians, regardless of the stored unit
    fn radians(&self) -> Result<(f64, f64)> {
        match self.reference {
            Reference::LatLon(unit) => Ok((to_radians(self.x_lon, unit), to_radians(self.y_lat, unit))),
            Reference::Cartesian => Err(Error::UnitNotApplicable),
        }
    }
}

// atan(sinh(pi)), about 85.0511 degrees
const MAX_MERCATOR_LAT: f64 = 1.484_422_229_745_332_4;

fn to_radians(value: f64, unit: CoordinatesUnit) -> f64 {
    match unit {
        CoordinatesUnit::Radians => value,
        CoordinatesUnit::Degrees => value * PI / 180.0,
    }
}

fn from_radians(value: f64, unit: CoordinatesUnit) -> f64 {
    match unit {
        CoordinatesUnit::Radians => value,
        CoordinatesUnit::Degrees => value * 180.0 / PI,
    }
}

/// Great-circle (haversine) distance in kilometers for `LatLon` points, Euclidean distance for
/// `Cartesian` ones. Both points must share a reference system; their units may differ.
pub fn get_distance(a: &Point, b: &Point) -> Result<f64> {
    if a.geo_reference_system() != b.geo_reference_system() {
        return Err(Error::ReferenceSystemMismatch {
            expected: a.geo_reference_system(),
            found: b.geo_reference_system(),
        });
    }
    match a.geo_reference_system() {
        GeoReferenceSystem::Cartesian => {
            Ok((b.x_lon - a.x_lon).hypot(b.y_lat - a.y_lat))
        }
        GeoReferenceSystem::LatLon => {
            let (lon1, lat1) = a.radians()?;
            let (lon2, lat2) = b.radians()?;
            let h = ((lat2 - lat1) / 2.0).sin().powi(2)
                + lat1.cos() * lat2.cos() * ((lon2 - lon1) / 2.0).sin().powi(2);
            Ok(2.0 * EARTH_RADIUS_KM * h.sqrt().atan2((1.0 - h).sqrt()))
        }
    }
}

/// The point `ratio` of the way along the straight line from `start` to `end`, expressed in
/// `start`'s reference and keeping `start`'s measurement. Ratios outside [0, 1] extrapolate.
pub fn get_interpolated_point(start: &Point, end: &Point, ratio: f64) -> Result<Point> {
    if !ratio.is_finite() {
        return Err(Error::InvalidRatio(ratio));
    }
    if start.geo_reference_system() != end.geo_reference_system() {
        return Err(Error::ReferenceSystemMismatch {
            expected: start.geo_reference_system(),
            found: end.geo_reference_system(),
        });
    }
    let (end_x, end_y) = match (start.reference, end.reference) {
        (Reference::LatLon(want), Reference::LatLon(have)) if want != have => (
            from_radians(to_radians(end.x_lon, have), want),
            from_radians(to_radians(end.y_lat, have), want),
        ),
        _ => (end.x_lon, end.y_lat),
    };
    let mut result = start.clone();
    result.x_lon = start.x_lon + (end_x - start.x_lon) * ratio;
    result.y_lat = start.y_lat + (end_y - start.y_lat) * ratio;
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Collector, Silent};

    fn approx_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn parse_names() {
        assert_eq!(
            Reference::parse("latlon", "degrees").unwrap(),
            Reference::LatLon(CoordinatesUnit::Degrees)
        );
        assert_eq!(Reference::parse("cartesian", "radians").unwrap(), Reference::Cartesian);
        assert_eq!(
            "utm".parse::<GeoReferenceSystem>(),
            Err(Error::UnknownReferenceSystem("utm".to_string()))
        );
        assert!("gradians".parse::<CoordinatesUnit>().is_err());
    }

    #[test]
    fn from_slice_needs_a_pair() {
        assert!(Point::from_slice(&[1.0, 2.0], Reference::default()).is_ok());
        assert_eq!(
            Point::from_slice(&[1.0, 2.0, 3.0], Reference::default()),
            Err(Error::InvalidCoordinates { len: 3 })
        );
        assert!(Point::from_slice(&[], Reference::Cartesian).is_err());
    }

    #[test]
    fn equator_projects_to_zero_y() {
        let pt = Point::latlon(0.5, 0.0, CoordinatesUnit::Radians).to_cartesian(&Silent);
        assert_eq!(pt.geo_reference_system(), GeoReferenceSystem::Cartesian);
        assert_eq!(pt.coordinates_unit(), None);
        assert!(approx_eq(pt.x_lon(), 0.5 * EARTH_RADIUS_KM));
        assert!(approx_eq(pt.y_lat(), 0.0));
    }

    #[test]
    fn cartesian_round_trip() {
        let original = Point::latlon(13.4, 52.5, CoordinatesUnit::Degrees).with_measurement(3.0, None);
        let back = original
            .to_cartesian(&Silent)
            .to_latlon_in(CoordinatesUnit::Degrees, &Silent);
        assert!((back.x_lon() - 13.4).abs() < 1e-9);
        assert!((back.y_lat() - 52.5).abs() < 1e-9);
        assert_eq!(back.measurement_value, Some(3.0));
    }

    #[test]
    fn poles_are_clamped() {
        let pt = Point::latlon(0.0, 90.0, CoordinatesUnit::Degrees).to_cartesian(&Silent);
        assert!(pt.y_lat().is_finite());
    }

    #[test]
    fn redundant_conversions_notify() {
        let collector = Collector::new();
        let mut pt = Point::cartesian(1.0, 2.0);
        pt.to_cartesian_(&collector);
        assert_eq!(pt, Point::cartesian(1.0, 2.0));

        let mut pt = Point::latlon(1.0, 0.5, CoordinatesUnit::Radians);
        pt.to_radians_(&collector).unwrap();
        assert_eq!(pt.coordinates(), [1.0, 0.5]);

        assert_eq!(
            collector.notices(),
            vec![
                Notice::RedundantReferenceConversion(GeoReferenceSystem::Cartesian),
                Notice::RedundantUnitConversion(CoordinatesUnit::Radians)
            ]
        );
    }

    #[test]
    fn units_need_latlon() {
        let mut pt = Point::cartesian(1.0, 2.0);
        assert_eq!(pt.to_degrees_(&Silent).err(), Some(Error::UnitNotApplicable));
        assert_eq!(pt.coordinates(), [1.0, 2.0]);
    }

    #[test]
    fn degrees_round_trip() {
        let pt = Point::latlon(-2.1, 0.7, CoordinatesUnit::Radians);
        let degrees = pt.to_degrees(&Silent).unwrap();
        assert_eq!(degrees.coordinates_unit(), Some(CoordinatesUnit::Degrees));
        let back = degrees.to_radians(&Silent).unwrap();
        assert!(approx_eq(back.x_lon(), -2.1));
        assert!(approx_eq(back.y_lat(), 0.7));
    }

    #[test]
    fn distance_ignores_unit() {
        let a = Point::latlon(0.0, 0.0, CoordinatesUnit::Radians);
        let b = Point::latlon(1.0, 0.0, CoordinatesUnit::Degrees);
        let d = get_distance(&a, &b).unwrap();
        // One degree of longitude along the equator
        assert!((d - EARTH_RADIUS_KM * PI / 180.0).abs() < 1e-6);
    }

    #[test]
    fn cartesian_distance() {
        let d = Point::cartesian(0.0, 0.0).distance_to(&Point::cartesian(3.0, 4.0)).unwrap();
        assert!(approx_eq(d, 5.0));
        assert!(get_distance(&Point::cartesian(0.0, 0.0), &Point::latlon(0.0, 0.0, CoordinatesUnit::Radians)).is_err());
    }

    #[test]
    fn interpolate_midpoint() {
        let start = Point::cartesian(0.0, 0.0).with_measurement(7.0, Some("pm10".to_string()));
        let pt = get_interpolated_point(&start, &Point::cartesian(2.0, 2.0), 0.5).unwrap();
        assert_eq!(pt.coordinates(), [1.0, 1.0]);
        assert_eq!(pt.measurement_type.as_deref(), Some("pm10"));
    }

    #[test]
    fn interpolate_brings_end_into_start_unit() {
        let start = Point::latlon(0.0, 0.0, CoordinatesUnit::Degrees);
        let end = Point::latlon(PI, 0.0, CoordinatesUnit::Radians);
        let pt = get_interpolated_point(&start, &end, 0.25).unwrap();
        assert!(approx_eq(pt.x_lon(), 45.0));
        assert_eq!(pt.coordinates_unit(), Some(CoordinatesUnit::Degrees));
    }

    #[test]
    fn interpolate_rejects_bad_input() {
        let a = Point::cartesian(0.0, 0.0);
        let b = Point::latlon(0.0, 0.0, CoordinatesUnit::Radians);
        assert!(matches!(
            get_interpolated_point(&a, &b, 0.5),
            Err(Error::ReferenceSystemMismatch { .. })
        ));
        assert_eq!(
            get_interpolated_point(&a, &a, f64::NAN).err().map(|e| e.to_string()),
            Some("interpolation ratio must be finite, got NaN".to_string())
        );
        assert!(get_interpolated_point(&a, &Point::cartesian(1.0, 0.0), 2.0).is_ok());
    }
}
