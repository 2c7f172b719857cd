//! Google Maps web service response DTOs.
//!
//! These types map directly to the Directions, Geocoding and Places
//! JSON responses. Google omits fields freely (e.g. `duration_in_traffic`
//! only appears for driving requests with a departure time), so most
//! fields are optional or defaulted.

use serde::Deserialize;

/// Response from the Directions API.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsResponse {
    /// "OK", "ZERO_RESULTS", "NOT_FOUND", "OVER_QUERY_LIMIT", ...
    pub status: String,

    #[serde(default)]
    pub routes: Vec<Route>,

    /// Human-readable detail for non-OK statuses.
    pub error_message: Option<String>,
}

/// One route alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct Route {
    /// Legs between waypoints. Without waypoints there is exactly one.
    #[serde(default)]
    pub legs: Vec<RouteLeg>,

    pub overview_polyline: Option<EncodedPolyline>,

    pub summary: Option<String>,
}

/// Polyline in Google's encoded format.
#[derive(Debug, Clone, Deserialize)]
pub struct EncodedPolyline {
    pub points: String,
}

/// A leg of a route.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    pub distance: TextValue,

    pub duration: TextValue,

    /// Traffic-aware duration (driving with `departure_time` only).
    pub duration_in_traffic: Option<TextValue>,

    /// Scheduled arrival (transit only).
    pub arrival_time: Option<TimeValue>,

    /// Scheduled departure (transit only).
    pub departure_time: Option<TimeValue>,

    pub start_location: Option<LatLng>,

    pub end_location: Option<LatLng>,

    pub start_address: Option<String>,

    pub end_address: Option<String>,

    #[serde(default)]
    pub steps: Vec<Step>,
}

/// A quantity with display text, e.g. `{"text": "25 mins", "value": 1500}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub text: String,
    /// Seconds for durations, metres for distances.
    pub value: u64,
}

/// A timetable instant.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeValue {
    /// Local display text, e.g. "8:47 AM".
    pub text: String,

    /// IANA zone of the stop.
    pub time_zone: Option<String>,

    /// Seconds since the Unix epoch.
    pub value: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A single instruction within a leg.
#[derive(Debug, Clone, Deserialize)]
pub struct Step {
    /// "DRIVING", "WALKING", "TRANSIT", ...
    pub travel_mode: String,

    pub distance: TextValue,

    pub duration: TextValue,

    pub html_instructions: Option<String>,

    /// Present on TRANSIT steps.
    pub transit_details: Option<StepTransitDetails>,
}

impl Step {
    pub fn is_transit(&self) -> bool {
        self.travel_mode == "TRANSIT"
    }

    pub fn is_walking(&self) -> bool {
        self.travel_mode == "WALKING"
    }
}

/// Transit-specific information on a step.
#[derive(Debug, Clone, Deserialize)]
pub struct StepTransitDetails {
    pub arrival_stop: Option<Stop>,

    pub departure_stop: Option<Stop>,

    pub line: Option<Line>,

    pub num_stops: Option<u32>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Stop {
    pub name: String,

    pub location: Option<LatLng>,
}

/// Transit line ridden on a step.
#[derive(Debug, Clone, Deserialize)]
pub struct Line {
    /// Full name, e.g. "Paoli/Thorndale Line".
    pub name: Option<String>,

    /// Short name, e.g. "PAO".
    pub short_name: Option<String>,

    pub vehicle: Option<Vehicle>,
}

impl Line {
    /// Best available display name.
    pub fn display_name(&self) -> Option<&str> {
        self.name.as_deref().or(self.short_name.as_deref())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Vehicle {
    pub name: Option<String>,

    /// "RAIL", "HEAVY_RAIL", "BUS", ...
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

/// Response from the Geocoding API.
#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<GeocodeResult>,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeocodeResult {
    pub formatted_address: Option<String>,

    pub geometry: Geometry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: LatLng,
}

/// Response from the Places Nearby Search API.
#[derive(Debug, Clone, Deserialize)]
pub struct PlacesResponse {
    pub status: String,

    #[serde(default)]
    pub results: Vec<PlaceResult>,

    pub error_message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaceResult {
    pub name: String,

    /// Short address, e.g. "Station Ave, Ardmore".
    pub vicinity: Option<String>,

    pub geometry: Geometry,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserialize_driving_response() {
        let json = r#"{
            "status": "OK",
            "routes": [{
                "summary": "I-76 E",
                "overview_polyline": {"points": "_p~iF~ps|U"},
                "legs": [{
                    "distance": {"text": "10.2 mi", "value": 16400},
                    "duration": {"text": "22 mins", "value": 1320},
                    "duration_in_traffic": {"text": "27 mins", "value": 1620},
                    "start_location": {"lat": 40.0, "lng": -75.3},
                    "end_location": {"lat": 39.95, "lng": -75.18},
                    "steps": []
                }]
            }]
        }"#;

        let resp: DirectionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "OK");
        let leg = &resp.routes[0].legs[0];
        assert_eq!(leg.duration.value, 1320);
        assert_eq!(leg.duration_in_traffic.as_ref().unwrap().value, 1620);
        assert!(leg.arrival_time.is_none());
    }

    #[test]
    fn deserialize_error_response() {
        let json = r#"{"status": "REQUEST_DENIED", "error_message": "The provided API key is invalid."}"#;
        let resp: DirectionsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(resp.status, "REQUEST_DENIED");
        assert!(resp.routes.is_empty());
    }

    #[test]
    fn deserialize_transit_step() {
        let json = r#"{
            "travel_mode": "TRANSIT",
            "distance": {"text": "12 mi", "value": 19000},
            "duration": {"text": "31 mins", "value": 1860},
            "transit_details": {
                "departure_stop": {"name": "Ardmore"},
                "arrival_stop": {"name": "Penn Medicine Station", "location": {"lat": 39.948, "lng": -75.19}},
                "line": {"name": "Paoli/Thorndale Line", "vehicle": {"name": "Train", "type": "HEAVY_RAIL"}},
                "num_stops": 6
            }
        }"#;

        let step: Step = serde_json::from_str(json).unwrap();
        assert!(step.is_transit());
        let details = step.transit_details.unwrap();
        assert_eq!(details.line.unwrap().display_name(), Some("Paoli/Thorndale Line"));
        assert_eq!(details.arrival_stop.unwrap().name, "Penn Medicine Station");
    }
}
