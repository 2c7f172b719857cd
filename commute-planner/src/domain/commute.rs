//! Two-leg commute estimates.
//!
//! A commute is a drive between home and a station plus a transit ride
//! between that station and the fixed destination. Which leg comes first
//! depends on the direction of travel.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::{Address, LegEstimate, Station, TravelMode};

/// Direction of a commute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CommuteDirection {
    /// Home → station (drive) → destination (transit).
    Morning,
    /// Destination → station (transit) → home (drive).
    Evening,
}

impl CommuteDirection {
    pub fn as_str(&self) -> &'static str {
        match self {
            CommuteDirection::Morning => "Morning",
            CommuteDirection::Evening => "Evening",
        }
    }
}

impl fmt::Display for CommuteDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Drive + transit estimate through one candidate station.
#[derive(Debug, Clone, PartialEq)]
pub struct CommuteEstimate {
    pub station: Station,
    /// Position of `station` in the candidate list it was evaluated from.
    pub station_index: usize,
    pub direction: CommuteDirection,
    pub drive: LegEstimate,
    pub transit: LegEstimate,
}

impl CommuteEstimate {
    /// Sum of both legs, in seconds.
    pub fn total_secs(&self) -> u64 {
        u64::from(self.drive.duration_secs) + u64::from(self.transit.duration_secs)
    }

    pub fn total_duration(&self) -> Duration {
        self.drive.duration() + self.transit.duration()
    }

    pub fn total_mins(&self) -> f64 {
        self.total_secs() as f64 / 60.0
    }

    /// When the commuter sets off (home in the morning, work in the evening).
    pub fn start_time(&self) -> Option<DateTime<Utc>> {
        match self.direction {
            CommuteDirection::Morning => self.drive.departure,
            CommuteDirection::Evening => self.transit.departure,
        }
    }

    /// When the commuter reaches the end of the trip.
    pub fn end_time(&self) -> Option<DateTime<Utc>> {
        match self.direction {
            CommuteDirection::Morning => self.transit.arrival,
            CommuteDirection::Evening => self.drive.arrival,
        }
    }
}

/// Why a candidate station was skipped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationFailure {
    pub station_index: usize,
    pub station: String,
    /// The leg that could not be estimated.
    pub mode: TravelMode,
    pub reason: String,
}

impl fmt::Display for StationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} leg via {} unavailable: {}",
            self.mode, self.station, self.reason
        )
    }
}

/// The winning candidate for one address and direction.
#[derive(Debug, Clone, PartialEq)]
pub struct BestCommute {
    pub address: Address,
    pub estimate: CommuteEstimate,
    /// Stations that were skipped on the way, in evaluation order.
    pub failures: Vec<StationFailure>,
}

impl BestCommute {
    pub fn station(&self) -> &Station {
        &self.estimate.station
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    fn estimate(direction: CommuteDirection) -> CommuteEstimate {
        let mut drive = LegEstimate::new(TravelMode::Driving, 900, 8000);
        drive.departure = Some(instant("2024-06-03T12:00:00Z"));
        drive.arrival = Some(instant("2024-06-03T12:15:00Z"));

        let mut transit = LegEstimate::new(TravelMode::Transit, 1620, 20000);
        transit.departure = Some(instant("2024-06-03T12:20:00Z"));
        transit.arrival = Some(instant("2024-06-03T12:47:00Z"));

        CommuteEstimate {
            station: Station::preferred("Central Station"),
            station_index: 0,
            direction,
            drive,
            transit,
        }
    }

    #[test]
    fn total_is_sum_of_legs() {
        let e = estimate(CommuteDirection::Morning);
        assert_eq!(e.total_secs(), 2520);
        assert_eq!(e.total_duration(), Duration::minutes(42));
        assert!((e.total_mins() - 42.0).abs() < 1e-9);
    }

    #[test]
    fn morning_starts_with_drive() {
        let e = estimate(CommuteDirection::Morning);
        assert_eq!(e.start_time(), e.drive.departure);
        assert_eq!(e.end_time(), e.transit.arrival);
    }

    #[test]
    fn evening_starts_with_transit() {
        let e = estimate(CommuteDirection::Evening);
        assert_eq!(e.start_time(), e.transit.departure);
        assert_eq!(e.end_time(), e.drive.arrival);
    }

    #[test]
    fn failure_display() {
        let f = StationFailure {
            station_index: 0,
            station: "Central Station".into(),
            mode: TravelMode::Transit,
            reason: "no route found: ZERO_RESULTS".into(),
        };
        assert_eq!(
            f.to_string(),
            "transit leg via Central Station unavailable: no route found: ZERO_RESULTS"
        );
    }
}
