//! Single-mode travel legs.
//!
//! A `LegEstimate` is the result of one mapping-API call: how long one
//! segment of the commute takes by one mode of travel.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::Coordinates;

/// Metres in a statute mile.
pub const METERS_PER_MILE: f64 = 1609.34;

/// Travel mode of a leg.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TravelMode {
    Driving,
    Transit,
}

impl TravelMode {
    /// The mode name as used by the Directions API.
    pub fn as_str(&self) -> &'static str {
        match self {
            TravelMode::Driving => "driving",
            TravelMode::Transit => "transit",
        }
    }
}

impl fmt::Display for TravelMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The time constraint a leg is queried with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LegTiming {
    /// Arrive at the leg's end no later than this instant.
    ArriveBy(DateTime<Utc>),
    /// Leave the leg's start at this instant.
    DepartAt(DateTime<Utc>),
}

impl LegTiming {
    pub fn instant(&self) -> DateTime<Utc> {
        match self {
            LegTiming::ArriveBy(t) | LegTiming::DepartAt(t) => *t,
        }
    }
}

/// Extra detail for transit legs.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TransitDetails {
    /// Number of vehicle changes (transit steps minus one).
    pub transfers: u32,
    /// Line names ridden, in order.
    #[serde(default)]
    pub lines: Vec<String>,
    /// Stop where the last vehicle is left.
    #[serde(default)]
    pub alight_stop: Option<String>,
    /// Time spent on board vehicles.
    pub in_vehicle_secs: u32,
    /// Walking after the last vehicle.
    #[serde(default)]
    pub final_walk_secs: u32,
    #[serde(default)]
    pub final_walk_m: u32,
}

impl TransitDetails {
    pub fn final_walk_mins(&self) -> f64 {
        f64::from(self.final_walk_secs) / 60.0
    }

    pub fn final_walk_miles(&self) -> f64 {
        f64::from(self.final_walk_m) / METERS_PER_MILE
    }

    pub fn in_vehicle_mins(&self) -> f64 {
        f64::from(self.in_vehicle_secs) / 60.0
    }
}

/// Estimate for one leg of a commute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegEstimate {
    pub mode: TravelMode,
    pub duration_secs: u32,
    pub distance_m: u32,
    #[serde(default)]
    pub departure: Option<DateTime<Utc>>,
    #[serde(default)]
    pub arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    pub start: Option<Coordinates>,
    #[serde(default)]
    pub end: Option<Coordinates>,
    /// Encoded overview polyline of the route.
    #[serde(default)]
    pub polyline: Option<String>,
    #[serde(default)]
    pub transit: Option<TransitDetails>,
}

impl LegEstimate {
    /// Create a bare estimate with no timing or geometry.
    pub fn new(mode: TravelMode, duration_secs: u32, distance_m: u32) -> Self {
        Self {
            mode,
            duration_secs,
            distance_m,
            departure: None,
            arrival: None,
            start: None,
            end: None,
            polyline: None,
            transit: None,
        }
    }

    pub fn duration(&self) -> Duration {
        Duration::seconds(i64::from(self.duration_secs))
    }

    pub fn duration_mins(&self) -> f64 {
        f64::from(self.duration_secs) / 60.0
    }

    pub fn distance_miles(&self) -> f64 {
        f64::from(self.distance_m) / METERS_PER_MILE
    }

    /// Fill in missing departure/arrival from the query timing.
    ///
    /// An `ArriveBy` leg arrives at the requested instant and departs
    /// `duration` earlier; a `DepartAt` leg is the mirror image.
    /// Times already supplied by the API are kept.
    pub fn anchored(mut self, timing: LegTiming) -> Self {
        let (departure, arrival) = match timing {
            LegTiming::ArriveBy(t) => (t - self.duration(), t),
            LegTiming::DepartAt(t) => (t, t + self.duration()),
        };
        self.departure.get_or_insert(departure);
        self.arrival.get_or_insert(arrival);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    #[test]
    fn unit_conversions() {
        let leg = LegEstimate::new(TravelMode::Driving, 1500, 16093);
        assert_eq!(leg.duration(), Duration::minutes(25));
        assert!((leg.duration_mins() - 25.0).abs() < 1e-9);
        assert!((leg.distance_miles() - 10.0).abs() < 0.01);
    }

    #[test]
    fn anchored_arrive_by() {
        let t = instant("2024-06-03T13:00:00Z");
        let leg = LegEstimate::new(TravelMode::Driving, 600, 0).anchored(LegTiming::ArriveBy(t));
        assert_eq!(leg.arrival, Some(t));
        assert_eq!(leg.departure, Some(instant("2024-06-03T12:50:00Z")));
    }

    #[test]
    fn anchored_depart_at() {
        let t = instant("2024-06-03T21:00:00Z");
        let leg = LegEstimate::new(TravelMode::Driving, 900, 0).anchored(LegTiming::DepartAt(t));
        assert_eq!(leg.departure, Some(t));
        assert_eq!(leg.arrival, Some(instant("2024-06-03T21:15:00Z")));
    }

    #[test]
    fn anchored_keeps_api_times() {
        let api_departure = instant("2024-06-03T12:31:00Z");
        let mut leg = LegEstimate::new(TravelMode::Transit, 1200, 0);
        leg.departure = Some(api_departure);

        let leg = leg.anchored(LegTiming::ArriveBy(instant("2024-06-03T13:00:00Z")));
        assert_eq!(leg.departure, Some(api_departure));
        assert_eq!(leg.arrival, Some(instant("2024-06-03T13:00:00Z")));
    }

    #[test]
    fn mode_display() {
        assert_eq!(TravelMode::Driving.to_string(), "driving");
        assert_eq!(TravelMode::Transit.to_string(), "transit");
    }

    #[test]
    fn deserialize_minimal_leg() {
        let leg: LegEstimate =
            serde_json::from_str(r#"{"mode":"transit","duration_secs":60,"distance_m":5}"#).unwrap();
        assert_eq!(leg, LegEstimate::new(TravelMode::Transit, 60, 5));
    }
}
