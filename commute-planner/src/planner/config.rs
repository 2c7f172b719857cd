//! Evaluation configuration for the commute planner.

use chrono_tz::Tz;

use crate::domain::{Address, ClockTime, CommuteDirection, Station};

/// Fixed parameters shared by every evaluation in a run.
#[derive(Debug, Clone)]
pub struct CommuteConfig {
    /// The workplace every commute starts or ends at.
    pub destination: Address,

    /// Candidate stations, preferred first, then fallbacks in order.
    pub stations: Vec<Station>,

    /// Latest arrival at the destination in the morning.
    pub morning_arrival: ClockTime,

    /// Time the evening train should reach the home station by.
    pub evening_arrival: ClockTime,

    /// Zone the clock times are expressed in.
    pub timezone: Tz,
}

impl CommuteConfig {
    /// Create a new configuration with the given parameters.
    pub fn new(
        destination: Address,
        stations: Vec<Station>,
        morning_arrival: ClockTime,
        evening_arrival: ClockTime,
        timezone: Tz,
    ) -> Self {
        Self {
            destination,
            stations,
            morning_arrival,
            evening_arrival,
            timezone,
        }
    }

    /// Target arrival time for a direction.
    pub fn arrival_for(&self, direction: CommuteDirection) -> ClockTime {
        match direction {
            CommuteDirection::Morning => self.morning_arrival,
            CommuteDirection::Evening => self.evening_arrival,
        }
    }
}
