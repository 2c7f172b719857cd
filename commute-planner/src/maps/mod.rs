//! Google Maps web services client.
//!
//! This module provides an HTTP client for the Directions, Geocoding and
//! Places APIs, plus a fixture-backed mock with the same interface.
//!
//! Key characteristics of the API:
//! - Errors are usually reported in the body (`"status": "ZERO_RESULTS"`)
//!   with HTTP 200, so status checks happen during conversion
//! - Driving requests accept `departure_time` only; transit requests accept
//!   either `arrival_time` or `departure_time`
//! - Route geometry comes as an encoded polyline

mod client;
mod convert;
mod error;
mod mock;
mod polyline;
mod types;

pub use client::{DEFAULT_BASE_URL, GoogleMapsClient, MapsConfig};
pub use convert::{convert_driving, convert_geocode, convert_places, convert_transit};
pub use error::MapsError;
pub use mock::MockMapsClient;
pub use polyline::{PolylineError, decode_polyline};
pub use types::{DirectionsResponse, GeocodeResponse, PlacesResponse, Route, RouteLeg, Step};
