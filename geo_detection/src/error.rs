use thiserror::Error;

use crate::{CoordinatesUnit, GeoReferenceSystem};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    // Malformed input
    #[error("coordinates need exactly 2 values, got {len}")]
    InvalidCoordinates { len: usize },

    #[error("unknown geo reference system {0:?}, expected 'latlon' or 'cartesian'")]
    UnknownReferenceSystem(String),

    #[error("unknown coordinates unit {0:?}, expected 'radians' or 'degrees'")]
    UnknownCoordinatesUnit(String),

    #[error("a buffer of {len} values cannot have shape ({rows}, {columns})")]
    BufferShape {
        len: usize,
        rows: usize,
        columns: usize,
    },

    #[error("{timestamps} timestamps given for {points} points")]
    TimestampCountMismatch { points: usize, timestamps: usize },

    #[error("cannot parse timestamp {0:?}")]
    InvalidTimestamp(String),

    #[error("coordinates units are not defined for cartesian points")]
    UnitNotApplicable,

    #[error("scale bounds need a non-zero, finite extent: [{min}, {max}]")]
    InvalidScaleBounds { min: f64, max: f64 },

    #[error("the time between route points must be positive, got {seconds}s")]
    InvalidInterval { seconds: f64 },

    #[error("interpolation ratio must be finite, got {0}")]
    InvalidRatio(f64),

    // Homogeneity
    #[error("geo reference system mismatch: expected '{expected}', found '{found}'")]
    ReferenceSystemMismatch {
        expected: GeoReferenceSystem,
        found: GeoReferenceSystem,
    },

    #[error("coordinates unit mismatch: expected '{expected}', found '{found}'")]
    CoordinatesUnitMismatch {
        expected: CoordinatesUnit,
        found: CoordinatesUnit,
    },

    #[error("cannot add a point without a timestamp to a route that has timestamps")]
    MissingTimestamp,

    #[error("a route cannot mix points with and without timestamps")]
    MixedTimestamps,

    #[error("{0} only applies to routes of plain points without timestamps")]
    NotPlainPoints(&'static str),

    #[error("sort_by_time only applies to routes whose points have timestamps")]
    NotTimestamped,

    // Bounds
    #[error("index {index} is not valid, the route contains {len} points")]
    IndexOutOfBounds { index: usize, len: usize },
}
