use std::fmt;
use std::ops::Index;
use std::sync::Arc;

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::point::get_distance;
use crate::{
    CoordinatesUnit, Diagnostics, Error, GeoReferenceSystem, LogDiagnostics, Notice, Point,
    PointT, Reference, Result, RouteBuffer, Silent, DEFAULT_COORDINATES_UNIT,
};
use crate::point_t::total_seconds;

/// Anything that can be put into a route.
#[derive(Clone, Debug, PartialEq)]
pub enum Waypoint {
    /// A bare coordinate pair, taking whatever reference the route needs
    Coordinates([f64; 2]),
    Plain(Point),
    Timed(PointT),
}

impl From<[f64; 2]> for Waypoint {
    fn from(x: [f64; 2]) -> Self {
        Waypoint::Coordinates(x)
    }
}

impl From<(f64, f64)> for Waypoint {
    fn from((x, y): (f64, f64)) -> Self {
        Waypoint::Coordinates([x, y])
    }
}

impl From<Point> for Waypoint {
    fn from(x: Point) -> Self {
        Waypoint::Plain(x)
    }
}

impl From<PointT> for Waypoint {
    fn from(x: PointT) -> Self {
        Waypoint::Timed(x)
    }
}

// An empty route is always Untimed.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Points {
    Untimed(Vec<Point>),
    Timed(Vec<PointT>),
}

impl Points {
    fn singleton(value: Waypoint) -> Self {
        match value {
            Waypoint::Coordinates([x, y]) => {
                Points::Untimed(vec![Point::new(x, y, Reference::default())])
            }
            Waypoint::Plain(pt) => Points::Untimed(vec![pt]),
            Waypoint::Timed(pt) => Points::Timed(vec![pt]),
        }
    }

    fn len(&self) -> usize {
        match self {
            Points::Untimed(pts) => pts.len(),
            Points::Timed(pts) => pts.len(),
        }
    }

    fn iter(&self) -> impl Iterator<Item = &Point> {
        let (plain, timed): (&[Point], &[PointT]) = match self {
            Points::Untimed(pts) => (pts.as_slice(), &[][..]),
            Points::Timed(pts) => (&[][..], pts.as_slice()),
        };
        plain.iter().chain(timed.iter().map(|pt| pt.point()))
    }

    fn iter_mut(&mut self) -> impl Iterator<Item = &mut Point> {
        let (plain, timed): (&mut [Point], &mut [PointT]) = match self {
            Points::Untimed(pts) => (pts.as_mut_slice(), Default::default()),
            Points::Timed(pts) => (Default::default(), pts.as_mut_slice()),
        };
        plain
            .iter_mut()
            .chain(timed.iter_mut().map(|pt| pt.point_mut()))
    }

    fn check_homogeneous(&self) -> Result<()> {
        let mut pts = self.iter();
        if let Some(first) = pts.next() {
            for pt in pts {
                first.reference().check_matches(pt.reference())?;
            }
        }
        Ok(())
    }

    fn sort_by_time(&mut self) {
        if let Points::Timed(pts) = self {
            // Stable, so ties keep their insertion order
            pts.sort_by_key(|pt| pt.timestamp);
        }
    }
}

/// An ordered sequence of points sharing one reference system and unit. Either every point has a
/// timestamp and the route stays sorted by time, or no point has one.
#[derive(Clone)]
pub struct Route {
    points: Points,
    diagnostics: Arc<dyn Diagnostics>,
}

impl Serialize for Route {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.points.serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Route {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let points = Points::deserialize(deserializer)?;
        Route::validated(points).map_err(serde::de::Error::custom)
    }
}

impl Route {
    fn validated(mut points: Points) -> Result<Self> {
        points.check_homogeneous()?;
        if points.len() == 0 {
            points = Points::Untimed(Vec::new());
        }
        points.sort_by_time();
        Ok(Self {
            points,
            diagnostics: Arc::new(LogDiagnostics),
        })
    }

    pub fn new() -> Self {
        Self {
            points: Points::Untimed(Vec::new()),
            diagnostics: Arc::new(LogDiagnostics),
        }
    }

    /// Builds a route from points or raw coordinate pairs. Raw pairs become `LatLon` points in
    /// `coordinates_unit` (radians if not given). If `timestamps` are given, they're attached to
    /// the items positionally, replacing any timestamp an item already had.
    pub fn from_items<I, W>(
        items: I,
        timestamps: Option<Vec<NaiveDateTime>>,
        coordinates_unit: Option<CoordinatesUnit>,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = W>,
        W: Into<Waypoint>,
    {
        let items: Vec<Waypoint> = items.into_iter().map(Into::into).collect();
        if let Some(ref timestamps) = timestamps {
            if timestamps.len() != items.len() {
                return Err(Error::TimestampCountMismatch {
                    points: items.len(),
                    timestamps: timestamps.len(),
                });
            }
        }

        let raw_reference = Reference::LatLon(coordinates_unit.unwrap_or(DEFAULT_COORDINATES_UNIT));
        let mut untimed = Vec::new();
        let mut timed = Vec::new();
        for (idx, item) in items.into_iter().enumerate() {
            let (point, own_timestamp) = match item {
                Waypoint::Coordinates([x, y]) => (Point::new(x, y, raw_reference), None),
                Waypoint::Plain(pt) => (pt, None),
                Waypoint::Timed(pt) => {
                    let (pt, timestamp) = pt.into_parts();
                    (pt, Some(timestamp))
                }
            };
            if let Some(expected) = coordinates_unit {
                match point.reference() {
                    Reference::LatLon(found) if found != expected => {
                        return Err(Error::CoordinatesUnitMismatch { expected, found });
                    }
                    Reference::Cartesian => return Err(Error::UnitNotApplicable),
                    Reference::LatLon(_) => {}
                }
            }
            match timestamps.as_ref().map(|list| list[idx]).or(own_timestamp) {
                Some(timestamp) => timed.push(PointT::new(point, timestamp)),
                None => untimed.push(point),
            }
        }

        let points = match (untimed.is_empty(), timed.is_empty()) {
            (_, true) => Points::Untimed(untimed),
            (true, false) => Points::Timed(timed),
            (false, false) => return Err(Error::MixedTimestamps),
        };
        Self::validated(points)
    }

    pub fn from_points(points: Vec<Point>) -> Result<Self> {
        Self::validated(Points::Untimed(points))
    }

    pub fn from_timed_points(points: Vec<PointT>) -> Result<Self> {
        Self::validated(Points::Timed(points))
    }

    /// Every point becomes a plain point in the buffer's reference.
    pub fn from_buffer(buffer: &RouteBuffer) -> Self {
        let reference = buffer.reference();
        Self {
            points: Points::Untimed(
                buffer
                    .iter_rows()
                    .map(|[x, y]| Point::new(x, y, reference))
                    .collect(),
            ),
            diagnostics: Arc::new(LogDiagnostics),
        }
    }

    /// Replaces where notices about appended or reassigned points go.
    pub fn with_diagnostics(mut self, diagnostics: Arc<dyn Diagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    pub fn to_buffer(&self) -> RouteBuffer {
        RouteBuffer::from_rows(self.iter().map(Point::coordinates).collect(), self.reference())
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn has_timestamps(&self) -> bool {
        matches!(self.points, Points::Timed(ref pts) if !pts.is_empty())
    }

    /// The shared reference of all points, or the default for an empty route.
    pub fn reference(&self) -> Reference {
        self.iter()
            .next()
            .map(Point::reference)
            .unwrap_or_default()
    }

    pub fn get_geo_reference_system(&self) -> GeoReferenceSystem {
        self.reference().system()
    }

    /// None for cartesian routes
    pub fn get_coordinates_unit(&self) -> Option<CoordinatesUnit> {
        self.reference().unit()
    }

    pub fn get_timestamps(&self) -> Option<Vec<NaiveDateTime>> {
        match self.points {
            Points::Timed(ref pts) if !pts.is_empty() => {
                Some(pts.iter().map(|pt| pt.timestamp).collect())
            }
            _ => None,
        }
    }

    pub fn get(&self, idx: usize) -> Option<&Point> {
        self.iter().nth(idx)
    }

    pub fn get_timed(&self, idx: usize) -> Option<&PointT> {
        self.timed_points().and_then(|pts| pts.get(idx))
    }

    /// None unless the route has timestamps
    pub fn timed_points(&self) -> Option<&[PointT]> {
        match self.points {
            Points::Timed(ref pts) if !pts.is_empty() => Some(pts.as_slice()),
            _ => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Point> {
        self.points.iter()
    }

    pub fn start_time(&self) -> Option<NaiveDateTime> {
        self.timed_points()
            .and_then(|pts| pts.first())
            .map(|pt| pt.timestamp)
    }

    pub fn end_time(&self) -> Option<NaiveDateTime> {
        self.timed_points()
            .and_then(|pts| pts.last())
            .map(|pt| pt.timestamp)
    }

    pub fn sort_by_time(&mut self) -> Result<&mut Self> {
        if let Points::Untimed(ref pts) = self.points {
            if !pts.is_empty() {
                return Err(Error::NotTimestamped);
            }
        }
        self.points.sort_by_time();
        Ok(self)
    }

    /// Replaces the point at `idx`. A route with a single point takes on whatever the new value
    /// is; otherwise the value has to fit in the same way as for `append`.
    pub fn set<W: Into<Waypoint>>(&mut self, idx: usize, value: W) -> Result<&mut Self> {
        let value = value.into();
        if idx >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.len(),
            });
        }
        if self.len() == 1 {
            self.points = Points::singleton(value);
            return Ok(self);
        }

        let (point, timestamp) = self.admit(value)?;
        match (&mut self.points, timestamp) {
            (Points::Untimed(pts), None) => pts[idx] = point,
            (Points::Timed(pts), Some(timestamp)) => pts[idx] = PointT::new(point, timestamp),
            _ => unreachable!("admit keeps timestamps in line with the route"),
        }
        self.points.sort_by_time();
        Ok(self)
    }

    /// Appends a point. A timestamped point appended to a route without timestamps loses its
    /// timestamp; a point in another unit is converted into the route's unit first. Both cases
    /// raise a notice.
    pub fn append<W: Into<Waypoint>>(&mut self, value: W) -> Result<&mut Self> {
        let value = value.into();
        if self.is_empty() {
            self.points = Points::singleton(value);
            return Ok(self);
        }

        let (point, timestamp) = self.admit(value)?;
        match (&mut self.points, timestamp) {
            (Points::Untimed(pts), None) => pts.push(point),
            (Points::Timed(pts), Some(timestamp)) => pts.push(PointT::new(point, timestamp)),
            _ => unreachable!("admit keeps timestamps in line with the route"),
        }
        self.points.sort_by_time();
        Ok(self)
    }

    /// Brings a value in line with the points of this non-empty route. A timestamp is returned
    /// exactly when the route has timestamps.
    fn admit(&self, value: Waypoint) -> Result<(Point, Option<NaiveDateTime>)> {
        let reference = self.reference();
        let (mut point, timestamp) = match value {
            Waypoint::Coordinates([x, y]) => (Point::new(x, y, reference), None),
            Waypoint::Plain(pt) => (pt, None),
            Waypoint::Timed(pt) => {
                let (pt, timestamp) = pt.into_parts();
                (pt, Some(timestamp))
            }
        };

        if self.has_timestamps() && timestamp.is_none() {
            return Err(Error::MissingTimestamp);
        }
        if point.geo_reference_system() != reference.system() {
            return Err(Error::ReferenceSystemMismatch {
                expected: reference.system(),
                found: point.geo_reference_system(),
            });
        }

        let timestamp = if !self.has_timestamps() && timestamp.is_some() {
            self.diagnostics.notice(Notice::TimestampDropped);
            None
        } else {
            timestamp
        };

        if let (Reference::LatLon(to), Reference::LatLon(from)) = (reference, point.reference()) {
            if from != to {
                self.diagnostics.notice(Notice::UnitConverted { from, to });
                match to {
                    CoordinatesUnit::Radians => point.to_radians_(&Silent)?,
                    CoordinatesUnit::Degrees => point.to_degrees_(&Silent)?,
                };
            }
        }
        Ok((point, timestamp))
    }

    pub fn delete_point_at(&mut self, idx: usize) -> Result<&mut Self> {
        if idx >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index: idx,
                len: self.len(),
            });
        }
        match self.points {
            Points::Untimed(ref mut pts) => {
                pts.remove(idx);
            }
            Points::Timed(ref mut pts) => {
                pts.remove(idx);
            }
        }
        if self.is_empty() {
            self.points = Points::Untimed(Vec::new());
        }
        Ok(self)
    }

    /// Maps coordinates from `bounds` to [0, 1] on each axis. Only meaningful for planar routes.
    pub fn scale(&mut self, bounds: &ScaleBounds) -> &mut Self {
        for pt in self.points.iter_mut() {
            pt.set_x_lon((pt.x_lon() - bounds.x_min) / (bounds.x_max - bounds.x_min));
            pt.set_y_lat((pt.y_lat() - bounds.y_min) / (bounds.y_max - bounds.y_min));
        }
        self
    }

    /// Maps coordinates from [0, 1] back to `bounds` on each axis.
    pub fn inverse_scale(&mut self, bounds: &ScaleBounds) -> &mut Self {
        for pt in self.points.iter_mut() {
            pt.set_x_lon(pt.x_lon() * (bounds.x_max - bounds.x_min) + bounds.x_min);
            pt.set_y_lat(pt.y_lat() * (bounds.y_max - bounds.y_min) + bounds.y_min);
        }
        self
    }

    /// Appends (0, 0) points until the route has `target_len` points. Only works for routes
    /// without timestamps. Measurements don't survive padding.
    pub fn pad(&mut self, target_len: usize) -> Result<&mut Self> {
        if self.has_timestamps() {
            return Err(Error::NotPlainPoints("pad"));
        }
        if target_len > self.len() {
            let mut buffer = self.to_buffer();
            buffer.zero_pad_rows(target_len);
            self.points = Self::from_buffer(&buffer).points;
        }
        Ok(self)
    }

    pub fn to_cartesian(&self, diagnostics: &dyn Diagnostics) -> Route {
        let mut copy = self.clone();
        copy.to_cartesian_(diagnostics);
        copy
    }

    pub fn to_cartesian_(&mut self, diagnostics: &dyn Diagnostics) -> &mut Self {
        for pt in self.points.iter_mut() {
            pt.to_cartesian_(diagnostics);
        }
        self
    }

    pub fn to_latlon(&self, diagnostics: &dyn Diagnostics) -> Route {
        self.to_latlon_in(CoordinatesUnit::Radians, diagnostics)
    }

    pub fn to_latlon_(&mut self, diagnostics: &dyn Diagnostics) -> &mut Self {
        self.to_latlon_in_(CoordinatesUnit::Radians, diagnostics)
    }

    pub fn to_latlon_in(&self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> Route {
        let mut copy = self.clone();
        copy.to_latlon_in_(unit, diagnostics);
        copy
    }

    pub fn to_latlon_in_(&mut self, unit: CoordinatesUnit, diagnostics: &dyn Diagnostics) -> &mut Self {
        for pt in self.points.iter_mut() {
            pt.to_latlon_in_(unit, diagnostics);
        }
        self
    }

    pub fn to_radians(&self, diagnostics: &dyn Diagnostics) -> Result<Route> {
        let mut copy = self.clone();
        copy.to_radians_(diagnostics)?;
        Ok(copy)
    }

    /// Fails without changing anything on a cartesian route.
    pub fn to_radians_(&mut self, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        self.check_has_units()?;
        for pt in self.points.iter_mut() {
            pt.to_radians_(diagnostics)?;
        }
        Ok(self)
    }

    pub fn to_degrees(&self, diagnostics: &dyn Diagnostics) -> Result<Route> {
        let mut copy = self.clone();
        copy.to_degrees_(diagnostics)?;
        Ok(copy)
    }

    /// Fails without changing anything on a cartesian route.
    pub fn to_degrees_(&mut self, diagnostics: &dyn Diagnostics) -> Result<&mut Self> {
        self.check_has_units()?;
        for pt in self.points.iter_mut() {
            pt.to_degrees_(diagnostics)?;
        }
        Ok(self)
    }

    fn check_has_units(&self) -> Result<()> {
        if !self.is_empty() && self.get_geo_reference_system() == GeoReferenceSystem::Cartesian {
            return Err(Error::UnitNotApplicable);
        }
        Ok(())
    }

    /// The highest speed in km/h between consecutive points, assuming `time_between_points`
    /// passes from each point to the next.
    pub fn max_speed(&self, time_between_points: Duration) -> Result<f64> {
        if self.len() < 2 {
            return Ok(0.0);
        }
        let seconds = total_seconds(time_between_points);
        if seconds <= 0.0 {
            return Err(Error::InvalidInterval { seconds });
        }
        let mut max_kmh = 0.0;
        for (a, b) in self.iter().zip(self.iter().skip(1)) {
            let kmh = get_distance(a, b)? / seconds * 3600.0;
            if kmh > max_kmh {
                max_kmh = kmh;
            }
        }
        Ok(max_kmh)
    }

    /// Sum of the distances between consecutive points, in kilometers for `LatLon` routes.
    pub fn total_distance(&self) -> Result<f64> {
        let mut total = 0.0;
        for (a, b) in self.iter().zip(self.iter().skip(1)) {
            total += get_distance(a, b)?;
        }
        Ok(total)
    }

    /// The mean position of all points, ignoring timestamps and measurements. None if empty.
    pub fn get_average_point(&self) -> Option<Point> {
        if self.is_empty() {
            return None;
        }
        let n = self.len() as f64;
        let (sum_x, sum_y) = self
            .iter()
            .fold((0.0, 0.0), |(x, y), pt| (x + pt.x_lon(), y + pt.y_lat()));
        Some(Point::new(sum_x / n, sum_y / n, self.reference()))
    }

    /// Where the route was at `time`, interpolating linearly between the surrounding points.
    /// None if the route has no timestamps or isn't active at this time.
    pub fn position_at(&self, time: NaiveDateTime) -> Option<PointT> {
        let pts = self.timed_points()?;
        if time < self.start_time()? || time > self.end_time()? {
            return None;
        }

        // TODO Binary search, the points are sorted
        for pair in pts.windows(2) {
            let (t1, t2) = (pair[0].timestamp, pair[1].timestamp);
            if time >= t1 && time <= t2 {
                if t1 == t2 {
                    return Some(pair[0].clone());
                }
                let ratio = (time - t1).num_nanoseconds()? as f64
                    / (t2 - t1).num_nanoseconds()? as f64;
                let mut pt = PointT::get_interpolated_point(&pair[0], &pair[1], ratio).ok()?;
                pt.timestamp = time;
                return Some(pt);
            }
        }
        // A single point, exactly at its time
        pts.first().cloned()
    }
}

impl Default for Route {
    fn default() -> Self {
        Self::new()
    }
}

impl PartialEq for Route {
    fn eq(&self, other: &Self) -> bool {
        self.points == other.points
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Route").field("points", &self.points).finish()
    }
}

impl Index<usize> for Route {
    type Output = Point;

    fn index(&self, idx: usize) -> &Point {
        match self.points {
            Points::Untimed(ref pts) => &pts[idx],
            Points::Timed(ref pts) => pts[idx].point(),
        }
    }
}

/// The rectangle `scale` maps onto the unit square.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScaleBounds {
    x_min: f64,
    x_max: f64,
    y_min: f64,
    y_max: f64,
}

impl ScaleBounds {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self> {
        for (min, max) in [(x_min, x_max), (y_min, y_max)] {
            let extent = max - min;
            if !extent.is_finite() || extent == 0.0 {
                return Err(Error::InvalidScaleBounds { min, max });
            }
        }
        Ok(Self {
            x_min,
            x_max,
            y_min,
            y_max,
        })
    }

    /// The bounding box of a route. None if it's empty or flat along an axis.
    pub fn of_route(route: &Route) -> Option<Self> {
        let mut pts = route.iter();
        let first = pts.next()?;
        let (mut x_min, mut x_max) = (first.x_lon(), first.x_lon());
        let (mut y_min, mut y_max) = (first.y_lat(), first.y_lat());
        for pt in pts {
            x_min = x_min.min(pt.x_lon());
            x_max = x_max.max(pt.x_lon());
            y_min = y_min.min(pt.y_lat());
            y_max = y_max.max(pt.y_lat());
        }
        Self::new(x_min, x_max, y_min, y_max).ok()
    }
}
