//! Mock maps client for running without API access.
//!
//! Serves leg estimates, geocodes and nearby stations from a JSON fixture
//! (or from values added in code), as if they were live API responses.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use serde::Deserialize;

use crate::domain::{Coordinates, LegEstimate, LegTiming, Location, Station, TravelMode};
use crate::planner::MapsProvider;

use super::error::MapsError;

/// One fixture leg, keyed by origin and destination query strings.
#[derive(Debug, Clone, Deserialize)]
struct FixtureLeg {
    origin: String,
    destination: String,
    #[serde(flatten)]
    estimate: LegEstimate,
}

/// On-disk fixture format.
#[derive(Debug, Clone, Default, Deserialize)]
struct Fixture {
    #[serde(default)]
    legs: Vec<FixtureLeg>,
    #[serde(default)]
    geocodes: HashMap<String, Coordinates>,
    /// Nearby stations keyed by "lat,lng" of the search centre.
    #[serde(default)]
    stations: HashMap<String, Vec<Station>>,
}

type LegKey = (TravelMode, String, String);

#[derive(Debug, Clone, Default)]
struct MockData {
    legs: HashMap<LegKey, LegEstimate>,
    geocodes: HashMap<String, Coordinates>,
    stations: HashMap<String, Vec<Station>>,
}

/// Mock maps client that serves canned data.
///
/// Unknown legs, addresses and search centres answer `NoRoute`, the same
/// way the real API reports `ZERO_RESULTS`. Leg times missing from the
/// fixture are filled in from the query timing.
#[derive(Debug, Clone, Default)]
pub struct MockMapsClient {
    data: Arc<MockData>,
}

impl MockMapsClient {
    /// Create an empty mock client.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a mock client from a JSON fixture file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, MapsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| MapsError::Fixture {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json)
    }

    /// Parse a mock client from fixture JSON.
    pub fn from_json(json: &str) -> Result<Self, MapsError> {
        let fixture: Fixture = serde_json::from_str(json).map_err(|e| MapsError::Json {
            message: e.to_string(),
            body: None,
        })?;

        let legs = fixture
            .legs
            .into_iter()
            .map(|leg| ((leg.estimate.mode, leg.origin, leg.destination), leg.estimate))
            .collect();

        Ok(Self {
            data: Arc::new(MockData {
                legs,
                geocodes: fixture.geocodes,
                stations: fixture.stations,
            }),
        })
    }

    fn data_mut(&mut self) -> &mut MockData {
        Arc::make_mut(&mut self.data)
    }

    /// Serve `estimate` for its mode between two locations.
    pub fn with_leg(mut self, origin: &Location, destination: &Location, estimate: LegEstimate) -> Self {
        let key = (estimate.mode, origin.to_query(), destination.to_query());
        self.data_mut().legs.insert(key, estimate);
        self
    }

    /// Serve a geocode result for an address.
    pub fn with_geocode(mut self, address: impl Into<String>, coords: Coordinates) -> Self {
        self.data_mut().geocodes.insert(address.into(), coords);
        self
    }

    /// Serve nearby stations around a search centre.
    pub fn with_stations(mut self, center: Coordinates, stations: Vec<Station>) -> Self {
        self.data_mut().stations.insert(center.to_string(), stations);
        self
    }

    /// Number of legs the mock can answer.
    pub fn leg_count(&self) -> usize {
        self.data.legs.len()
    }

    fn lookup(
        &self,
        mode: TravelMode,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        let key = (mode, origin.to_query(), destination.to_query());
        self.data
            .legs
            .get(&key)
            .cloned()
            .map(|leg| leg.anchored(timing))
            .ok_or_else(|| {
                MapsError::NoRoute(format!("no mock {mode} leg from {origin} to {destination}"))
            })
    }
}

impl MapsProvider for MockMapsClient {
    async fn driving_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        self.lookup(TravelMode::Driving, origin, destination, timing)
    }

    async fn transit_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        self.lookup(TravelMode::Transit, origin, destination, timing)
    }

    async fn geocode(&self, address: &str) -> Result<Coordinates, MapsError> {
        self.data
            .geocodes
            .get(address)
            .copied()
            .ok_or_else(|| MapsError::NoRoute(format!("no mock geocode for {address}")))
    }

    async fn nearby_stations(
        &self,
        center: Coordinates,
        _radius_m: u32,
    ) -> Result<Vec<Station>, MapsError> {
        Ok(self
            .data
            .stations
            .get(&center.to_string())
            .cloned()
            .unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn instant(s: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(s).unwrap().with_timezone(&Utc)
    }

    const FIXTURE: &str = r#"{
        "legs": [
            {"origin": "123 Main St", "destination": "Central Station",
             "mode": "driving", "duration_secs": 900, "distance_m": 8000},
            {"origin": "Central Station", "destination": "500 Office Blvd",
             "mode": "transit", "duration_secs": 1620, "distance_m": 20000,
             "departure": "2024-06-03T12:30:00Z",
             "transit": {"transfers": 0, "lines": ["Airport Line"], "in_vehicle_secs": 1500}}
        ],
        "geocodes": {"123 Main St": {"lat": 40.0, "lng": -75.3}},
        "stations": {"40,-75.3": [{"name": "Ardmore", "role": "discovered"}]}
    }"#;

    fn addr(s: &str) -> Location {
        Location::Address(s.to_string())
    }

    #[tokio::test]
    async fn load_fixture() {
        let client = MockMapsClient::from_json(FIXTURE).unwrap();
        assert_eq!(client.leg_count(), 2);

        let coords = client.geocode("123 Main St").await.unwrap();
        assert_eq!(coords, Coordinates::new(40.0, -75.3));

        let stations = client.nearby_stations(coords, 3000).await.unwrap();
        assert_eq!(stations.len(), 1);
        assert_eq!(stations[0].name, "Ardmore");
    }

    #[tokio::test]
    async fn legs_are_anchored_to_timing() {
        let client = MockMapsClient::from_json(FIXTURE).unwrap();
        let arrive_by = instant("2024-06-03T13:00:00Z");

        let transit = client
            .transit_estimate(
                &addr("Central Station"),
                &addr("500 Office Blvd"),
                LegTiming::ArriveBy(arrive_by),
            )
            .await
            .unwrap();
        // Fixture departure is kept, arrival filled from timing.
        assert_eq!(transit.departure, Some(instant("2024-06-03T12:30:00Z")));
        assert_eq!(transit.arrival, Some(arrive_by));
        assert_eq!(transit.transit.unwrap().lines, vec!["Airport Line"]);

        let drive = client
            .driving_estimate(
                &addr("123 Main St"),
                &addr("Central Station"),
                LegTiming::ArriveBy(instant("2024-06-03T12:30:00Z")),
            )
            .await
            .unwrap();
        assert_eq!(drive.departure, Some(instant("2024-06-03T12:15:00Z")));
    }

    #[tokio::test]
    async fn unknown_leg_is_no_route() {
        let client = MockMapsClient::from_json(FIXTURE).unwrap();

        // Mode matters: there is no transit leg from home.
        let result = client
            .transit_estimate(&addr("123 Main St"), &addr("Central Station"), LegTiming::DepartAt(Utc::now()))
            .await;
        assert!(matches!(result, Err(MapsError::NoRoute(_))));

        assert!(client.geocode("nowhere").await.is_err());
    }

    #[tokio::test]
    async fn builder_does_not_affect_clones() {
        let base = MockMapsClient::new().with_geocode("a", Coordinates::new(1.0, 1.0));
        let extended = base.clone().with_geocode("b", Coordinates::new(2.0, 2.0));

        assert!(base.geocode("b").await.is_err());
        assert!(extended.geocode("a").await.is_ok());
        assert!(extended.geocode("b").await.is_ok());
    }

    #[test]
    fn missing_fixture_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            MockMapsClient::from_file(dir.path().join("absent.json")),
            Err(MapsError::Fixture { .. })
        ));
    }

    #[test]
    fn invalid_fixture_rejected() {
        assert!(matches!(
            MockMapsClient::from_json("{\"legs\": 5}"),
            Err(MapsError::Json { .. })
        ));
    }
}
