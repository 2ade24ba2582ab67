//! Geographic points and routes that keep their reference system, coordinates unit and
//! timestamps consistent through every conversion and mutation.

#[macro_use]
extern crate log;

mod buffer;
mod diagnostics;
mod error;
mod point;
mod point_t;
mod route;

pub use self::buffer::RouteBuffer;
pub use self::diagnostics::{Collector, Diagnostics, LogDiagnostics, Notice, Silent};
pub use self::error::{Error, Result};
pub use self::point::{
    get_distance, get_interpolated_point, CoordinatesUnit, GeoReferenceSystem, Point, Reference,
};
pub use self::point_t::{total_seconds, PointT, TIMESTAMP_FORMAT};
pub use self::route::{Route, ScaleBounds, Waypoint};

pub const DEFAULT_REFERENCE_SYSTEM: GeoReferenceSystem = GeoReferenceSystem::LatLon;
pub const DEFAULT_COORDINATES_UNIT: CoordinatesUnit = CoordinatesUnit::Radians;

/// Distances on `LatLon` points, and the planar coordinates they project to, are in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;
