use std::cmp::Ordering;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::point::get_interpolated_point;
use crate::{CoordinatesUnit, Diagnostics, Error, Point, Result};

/// The format accepted by `PointT::parse`, same as the AVL feeds we read.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The length of `duration` in seconds, keeping sub-millisecond precision.
pub fn total_seconds(duration: Duration) -> f64 {
    match duration.num_nanoseconds() {
        Some(ns) => ns as f64 / 1e9,
        None => duration.num_milliseconds() as f64 / 1e3,
    }
}

/// A point with the time it was recorded.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PointT {
    point: Point,
    pub timestamp: NaiveDateTime,
}

impl PointT {
    pub fn new(point: Point, timestamp: NaiveDateTime) -> Self {
        Self { point, timestamp }
    }

    /// Like `new`, but the timestamp comes as text, either in `TIMESTAMP_FORMAT` or RFC 3339
    /// without an offset.
    pub fn parse(point: Point, timestamp: &str) -> Result<Self> {
        let timestamp = NaiveDateTime::parse_from_str(timestamp, TIMESTAMP_FORMAT)
            .or_else(|_| timestamp.parse::<NaiveDateTime>())
            .map_err(|_| Error::InvalidTimestamp(timestamp.to_string()))?;
        Ok(Self::new(point, timestamp))
    }

    pub fn point(&self) -> &Point {
        &self.point
    }

    pub fn point_mut(&mut self) -> &mut Point {
        &mut self.point
    }

    pub fn into_point(self) -> Point {
        self.point
    }

    pub fn into_parts(self) -> (Point, NaiveDateTime) {
        (self.point, self.timestamp)
    }

    pub fn to_cartesian(&self, diagnostics: &dyn Diagnostics) -> PointT {
        self.with_point(self.point.to_cartesian(diagnostics))
    }

    pub fn to_cartesian_(&mut self, diagnostics: &dyn Diagnostics) -> &mut Self {
        self.point.to_cartesian_(diagnostics);
        self
    }

    pub fn to_latlon(&self, diagnostics: &dyn Diagnostics) -> PointT {
        self.with_point(self.point.to_latlon(diagnostics))
    }

    pub fn to_latlon_(&mut self, diagnostics: &dyn Diagnostics) -> &mut Self {
        self.point.to_latlon_(diagnostics);
        self
    }

    pub fn to_latlon_in(&self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> PointT {
        self.with_point(self.point.to_latlon_in(unit, diagnostics))
    }

    pub fn to_latlon_in_(&mut self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> &mut Self {
        self.point.to_latlon_in_(unit, diagnostics);
        self
    }

    pub fn to_radians(&self, diagnostics: &dyn Diagnostics) -> Result<PointT> {
        Ok(self.with_point(self.point.to_radians(diagnostics)?))
    }

    pub fn to_radians_(&mut self, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        self.point.to_radians_(diagnostics)?;
        Ok(self)
    }

    pub fn to_degrees(&self, diagnostics: &dyn Diagnostics) -> Result<PointT> {
        Ok(self.with_point(self.point.to_degrees(diagnostics)?))
    }

    pub fn to_degrees_(&mut self, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        self.point.to_degrees_(diagnostics)?;
        Ok(self)
    }

    /// Interpolates like `get_interpolated_point`. The result takes `start`'s timestamp.
    pub fn get_interpolated_point(start: &PointT, end: &PointT, ratio: f64) -> Result<PointT> {
        let point = get_interpolated_point(&start.point, &end.point, ratio)?;
        Ok(start.with_point(point))
    }

    fn with_point(&self, point: Point) -> PointT {
        PointT::new(point, self.timestamp)
    }
}

/// Timed points order by their timestamp alone.
impl PartialOrd for PointT {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.timestamp.cmp(&other.timestamp))
    }
}

impl AsRef<Point> for PointT {
    fn as_ref(&self) -> &Point {
        &self.point
    }
}

impl From<PointT> for Point {
    fn from(pt: PointT) -> Self {
        pt.point
    }
}
