//! Google Maps HTTP client.
//!
//! Provides async methods for the Directions, Geocoding and Places APIs.
//! Handles authentication, concurrency limiting, and conversion to domain
//! types.

use std::sync::Arc;

use serde::de::DeserializeOwned;
use tokio::sync::Semaphore;
use tracing::{debug, instrument};

use crate::domain::{Coordinates, LegEstimate, LegTiming, Location, Station, TravelMode};
use crate::planner::MapsProvider;

use super::convert::{convert_driving, convert_geocode, convert_places, convert_transit};
use super::error::MapsError;
use super::types::{DirectionsResponse, GeocodeResponse, PlacesResponse};

/// Default base URL for the Google Maps web services.
pub const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com";

/// Default maximum concurrent requests.
const DEFAULT_MAX_CONCURRENT: usize = 5;

/// Configuration for the maps client.
#[derive(Debug, Clone)]
pub struct MapsConfig {
    /// API key sent as the `key` query parameter
    pub api_key: String,
    /// Base URL for the API (defaults to production Google)
    pub base_url: String,
    /// Maximum concurrent requests
    pub max_concurrent: usize,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Transit lines a route must use (substring match); empty allows any
    pub allowed_lines: Vec<String>,
}

impl MapsConfig {
    /// Create a new config with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            timeout_secs: 30,
            allowed_lines: Vec::new(),
        }
    }

    /// Set a custom base URL (for testing).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    /// Set maximum concurrent requests.
    pub fn with_max_concurrent(mut self, n: usize) -> Self {
        self.max_concurrent = n;
        self
    }

    /// Set request timeout.
    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = secs;
        self
    }

    /// Restrict transit routes to these lines.
    pub fn with_allowed_lines(mut self, lines: Vec<String>) -> Self {
        self.allowed_lines = lines;
        self
    }
}

/// Google Maps web services client.
///
/// Uses a semaphore to limit concurrent requests and avoid rate limiting.
#[derive(Debug, Clone)]
pub struct GoogleMapsClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    allowed_lines: Arc<[String]>,
    semaphore: Arc<Semaphore>,
}

impl GoogleMapsClient {
    /// Create a new client with the given configuration.
    pub fn new(config: MapsConfig) -> Result<Self, MapsError> {
        if config.api_key.trim().is_empty() {
            return Err(MapsError::NotConfigured("API key is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key,
            allowed_lines: config.allowed_lines.into(),
            semaphore: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
        })
    }

    /// GET a JSON endpoint, mapping HTTP-level failures to errors.
    ///
    /// In-body statuses (`"status": "ZERO_RESULTS"` etc.) are left to the
    /// converters.
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, MapsError> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| MapsError::ApiError {
                status: 0,
                message: "Semaphore closed".to_string(),
            })?;

        let url = format!("{}{}", self.base_url, path);

        let response = self
            .http
            .get(&url)
            .query(query)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await?;

        let status = response.status();

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Err(MapsError::Unauthorized);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(MapsError::RateLimited);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(MapsError::ApiError {
                status: status.as_u16(),
                message: body,
            });
        }

        let body = response.text().await?;

        serde_json::from_str(&body).map_err(|e| MapsError::Json {
            message: e.to_string(),
            body: Some(body.chars().take(500).collect()),
        })
    }

    /// Fetch raw directions between two locations.
    pub async fn directions(
        &self,
        origin: &Location,
        destination: &Location,
        mode: TravelMode,
        timing: LegTiming,
    ) -> Result<DirectionsResponse, MapsError> {
        let mut query = vec![
            ("origin", origin.to_query()),
            ("destination", destination.to_query()),
            ("mode", mode.as_str().to_string()),
        ];

        let epoch = timing.instant().timestamp().to_string();
        match (mode, timing) {
            // Driving has no arrival_time; query at the target instant.
            (TravelMode::Driving, _) => {
                query.push(("departure_time", epoch));
                query.push(("traffic_model", "best_guess".to_string()));
            }
            (TravelMode::Transit, LegTiming::ArriveBy(_)) => {
                query.push(("arrival_time", epoch));
            }
            (TravelMode::Transit, LegTiming::DepartAt(_)) => {
                query.push(("departure_time", epoch));
            }
        }

        if mode == TravelMode::Transit {
            query.push(("transit_mode", "rail".to_string()));
            query.push(("alternatives", "true".to_string()));
        }

        self.get_json("/maps/api/directions/json", &query).await
    }
}

impl MapsProvider for GoogleMapsClient {
    #[instrument(skip(self, origin, destination), fields(origin = %origin, destination = %destination))]
    async fn driving_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        let resp = self
            .directions(origin, destination, TravelMode::Driving, timing)
            .await?;
        let leg = convert_driving(&resp, timing)?;
        debug!(mins = leg.duration_mins(), "driving estimate");
        Ok(leg)
    }

    #[instrument(skip(self, origin, destination), fields(origin = %origin, destination = %destination))]
    async fn transit_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> Result<LegEstimate, MapsError> {
        let resp = self
            .directions(origin, destination, TravelMode::Transit, timing)
            .await?;
        debug!(alternatives = resp.routes.len(), "transit response");
        convert_transit(&resp, timing, &self.allowed_lines)
    }

    #[instrument(skip(self))]
    async fn geocode(&self, address: &str) -> Result<Coordinates, MapsError> {
        let resp: GeocodeResponse = self
            .get_json("/maps/api/geocode/json", &[("address", address.to_string())])
            .await?;
        convert_geocode(&resp)
    }

    #[instrument(skip(self))]
    async fn nearby_stations(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> Result<Vec<Station>, MapsError> {
        let resp: PlacesResponse = self
            .get_json(
                "/maps/api/place/nearbysearch/json",
                &[
                    ("location", center.to_string()),
                    ("radius", radius_m.to_string()),
                    ("keyword", "train station".to_string()),
                    ("type", "train_station".to_string()),
                ],
            )
            .await?;
        let stations = convert_places(&resp, center)?;
        debug!(found = stations.len(), "nearby stations");
        Ok(stations)
    }
}
