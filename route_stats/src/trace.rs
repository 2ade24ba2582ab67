use anyhow::Result;
use chrono::NaiveDateTime;
use serde::Deserialize;

use geo_detection::{CoordinatesUnit, Point, PointT, Route, TIMESTAMP_FORMAT};

/// Reads a vehicle trace and sorts it into a timestamped route. Rows may come in any order.
pub fn load<R: std::io::Read>(reader: R, unit: CoordinatesUnit) -> Result<Route> {
    let mut points = Vec::new();
    for rec in csv::Reader::from_reader(reader).deserialize() {
        let rec: Record = rec?;
        let timestamp = NaiveDateTime::parse_from_str(&rec.datetime, TIMESTAMP_FORMAT)?;
        let mut pt = Point::latlon(rec.longitude, rec.latitude, unit);
        if let Some(value) = rec.measurement {
            pt = pt.with_measurement(value, rec.measurement_type);
        }
        points.push(PointT::new(pt, timestamp));
    }
    if points.is_empty() {
        bail!("The trace has no points");
    }
    Ok(Route::from_timed_points(points)?)
}

#[derive(Deserialize)]
struct Record {
    longitude: f64,
    latitude: f64,
    datetime: String,
    #[serde(default)]
    measurement: Option<f64>,
    #[serde(default)]
    measurement_type: Option<String>,
}
