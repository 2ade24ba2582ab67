#[macro_use]
extern crate anyhow;
#[macro_use]
extern crate log;

mod trace;

use anyhow::Result;
use chrono::Duration;
use structopt::StructOpt;

use geo_detection::{total_seconds, CoordinatesUnit, LogDiagnostics, Route};

#[derive(StructOpt)]
struct Args {
    /// The path to a CSV file with longitude, latitude and datetime columns
    #[structopt(long)]
    trace: String,
    /// The coordinates in the trace are in degrees, not radians
    #[structopt(long)]
    degrees: bool,
    /// Assume this many seconds between consecutive points when computing the max speed. By
    /// default, the mean sampling interval of the trace is used.
    #[structopt(long)]
    interval_secs: Option<f64>,
    /// Also report an untimed copy of the route, zero-padded to this many points
    #[structopt(long)]
    pad: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::from_args();

    let unit = if args.degrees {
        CoordinatesUnit::Degrees
    } else {
        CoordinatesUnit::Radians
    };
    let route = trace::load(fs_err::File::open(&args.trace)?, unit)?;
    info!("Loaded {} points from {}", route.len(), args.trace);

    let interval = match args.interval_secs {
        Some(secs) => Duration::microseconds((secs * 1e6).round() as i64),
        None => mean_interval(&route)?,
    };

    println!("points: {}", route.len());
    if let (Some(start), Some(end)) = (route.start_time(), route.end_time()) {
        println!("from {start} to {end}");
    }
    println!("total distance: {:.3} km", route.total_distance()?);
    if let Some(avg) = route.get_average_point() {
        println!("average point: ({}, {})", avg.x_lon(), avg.y_lat());
    }
    println!(
        "max speed: {:.1} km/h, assuming {}s between points",
        route.max_speed(interval)?,
        total_seconds(interval)
    );

    if let Some(target_len) = args.pad {
        let mut untimed = Route::from_points(route.iter().cloned().collect())?;
        untimed.pad(target_len)?;
        println!("padded to {} points", untimed.len());
    }

    // Reproject to show the extent in kilometers
    let cartesian = route.to_cartesian(&LogDiagnostics);
    if let Some(bounds) = geo_detection::ScaleBounds::of_route(&cartesian) {
        debug!("Planar extent: {:?}", bounds);
    }
    Ok(())
}

fn mean_interval(route: &Route) -> Result<Duration> {
    match (route.start_time(), route.end_time()) {
        (Some(start), Some(end)) if route.len() > 1 && end > start => {
            Ok((end - start) / (route.len() as i32 - 1))
        }
        _ => bail!("Can't infer the time between points; pass --interval-secs"),
    }
}
