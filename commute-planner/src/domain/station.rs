//! Candidate transit stations.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{Coordinates, DomainError, Location};

/// How a station ended up in the candidate list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StationRole {
    /// The configured first choice.
    Preferred,
    /// A configured alternative, tried in listed order.
    Fallback,
    /// Found by searching near the origin address.
    Discovered,
}

impl StationRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            StationRole::Preferred => "preferred",
            StationRole::Fallback => "fallback",
            StationRole::Discovered => "discovered",
        }
    }
}

/// A named transit stop, optionally pinned to exact coordinates.
///
/// # Examples
///
/// ```
/// use commute_planner::domain::{Station, StationRole};
///
/// let s = Station::parse("Suburban Station@39.9539/-75.1677", StationRole::Preferred).unwrap();
/// assert_eq!(s.name, "Suburban Station");
/// assert!(s.coordinates.is_some());
///
/// let s = Station::parse("Ardmore", StationRole::Fallback).unwrap();
/// assert!(s.coordinates.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Station {
    pub name: String,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    pub role: StationRole,
    /// Short street description, when the API supplies one.
    #[serde(default)]
    pub vicinity: Option<String>,
}

impl Station {
    /// Create a station with the given name and role.
    pub fn new(name: impl Into<String>, role: StationRole) -> Self {
        Self {
            name: name.into(),
            coordinates: None,
            role,
            vicinity: None,
        }
    }

    pub fn preferred(name: impl Into<String>) -> Self {
        Self::new(name, StationRole::Preferred)
    }

    pub fn fallback(name: impl Into<String>) -> Self {
        Self::new(name, StationRole::Fallback)
    }

    /// Pin the station to exact coordinates.
    pub fn with_coordinates(mut self, coordinates: Coordinates) -> Self {
        self.coordinates = Some(coordinates);
        self
    }

    pub fn with_vicinity(mut self, vicinity: impl Into<String>) -> Self {
        self.vicinity = Some(vicinity.into());
        self
    }

    /// Parse a configured station entry: `Name` or `Name@lat/lng`.
    pub fn parse(entry: &str, role: StationRole) -> Result<Self, DomainError> {
        let (name, coords) = match entry.rsplit_once('@') {
            Some((name, coords)) => (name, Some(Coordinates::parse(coords)?)),
            None => (entry, None),
        };

        let name = name.trim();
        if name.is_empty() {
            return Err(DomainError::InvalidStation(format!(
                "empty station name in {entry:?}"
            )));
        }

        let station = Self::new(name, role);
        Ok(match coords {
            Some(c) => station.with_coordinates(c),
            None => station,
        })
    }

    /// Where to route to: exact coordinates if pinned, else the name.
    pub fn location(&self) -> Location {
        match self.coordinates {
            Some(coords) => Location::Point(coords),
            None => Location::Address(self.name.clone()),
        }
    }
}

impl fmt::Display for Station {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
