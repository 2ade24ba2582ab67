//! Non-fatal notices raised while converting points or mutating routes.
//!
//! Nothing here aborts an operation. The core hands a [`Notice`] to whatever
//! [`Diagnostics`] sink the caller supplied and carries on.

use std::fmt;
use std::sync::Mutex;

use crate::{CoordinatesUnit, GeoReferenceSystem};

#[derive(Clone, Debug, PartialEq)]
pub enum Notice {
    /// A reference system conversion was asked for, but the point was already there.
    RedundantReferenceConversion(GeoReferenceSystem),
    /// A unit conversion was asked for, but the point was already in that unit.
    RedundantUnitConversion(CoordinatesUnit),
    /// A point appended to a route had a different unit and was converted first.
    UnitConverted {
        from: CoordinatesUnit,
        to: CoordinatesUnit,
    },
    /// A timestamped point went into an untimestamped route and lost its timestamp.
    TimestampDropped,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Notice::RedundantReferenceConversion(system) => {
                write!(f, "geo reference system is already '{system}', nothing converted")
            }
            Notice::RedundantUnitConversion(unit) => {
                write!(f, "coordinates unit is already '{unit}', nothing converted")
            }
            Notice::UnitConverted { from, to } => write!(
                f,
                "point had coordinates unit '{from}' differing from the route; converted to '{to}' before appending"
            ),
            Notice::TimestampDropped => write!(
                f,
                "a point with timestamp was added onto a route without timestamps; the timestamp is removed"
            ),
        }
    }
}

pub trait Diagnostics: Send + Sync {
    fn notice(&self, notice: Notice);
}

/// Forwards every notice to the `log` facade at warn level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogDiagnostics;

impl Diagnostics for LogDiagnostics {
    fn notice(&self, notice: Notice) {
        warn!("{notice}");
    }
}

/// Drops every notice.
#[derive(Clone, Copy, Debug, Default)]
pub struct Silent;

impl Diagnostics for Silent {
    fn notice(&self, _: Notice) {}
}

/// Keeps every notice in memory, in the order received.
#[derive(Debug, Default)]
pub struct Collector {
    notices: Mutex<Vec<Notice>>,
}

impl Collector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<Notice> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.notices().is_empty()
    }
}

impl Diagnostics for Collector {
    fn notice(&self, notice: Notice) {
        match self.notices.lock() {
            Ok(mut notices) => notices.push(notice),
            Err(poisoned) => poisoned.into_inner().push(notice),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collector_keeps_order() {
        let collector = Collector::new();
        assert!(collector.is_empty());
        collector.notice(Notice::TimestampDropped);
        collector.notice(Notice::RedundantUnitConversion(CoordinatesUnit::Degrees));
        assert_eq!(
            collector.notices(),
            vec![
                Notice::TimestampDropped,
                Notice::RedundantUnitConversion(CoordinatesUnit::Degrees)
            ]
        );
    }

    #[test]
    fn display() {
        let notice = Notice::UnitConverted {
            from: CoordinatesUnit::Degrees,
            to: CoordinatesUnit::Radians,
        };
        assert!(notice.to_string().contains("converted to 'radians'"));
    }
}
