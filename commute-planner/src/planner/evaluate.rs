//! Station candidate evaluation.
//!
//! For one origin address, estimates a drive + transit commute through each
//! candidate station and keeps the fastest. A station whose legs cannot be
//! estimated is skipped and noted; the address only fails when every
//! station does.

use std::future::Future;

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{debug, info, warn};

use crate::domain::{
    Address, BestCommute, ClockTime, CommuteDirection, CommuteEstimate, Coordinates, LegEstimate,
    LegTiming, Location, Station, StationFailure, TravelMode,
};
use crate::maps::MapsError;

use super::config::CommuteConfig;
use super::rank::select_best;

/// Error from commute evaluation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum CommuteError {
    /// One leg through one station could not be estimated
    #[error("{0}")]
    LegUnavailable(StationFailure),

    /// Every candidate station failed
    #[error("no reachable station for {address} ({})", candidates_failed(.failures))]
    NoReachableStation {
        address: String,
        failures: Vec<StationFailure>,
    },

    /// A required setting is absent
    #[error("configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Invalid evaluation request
    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl CommuteError {
    /// Per-station failures this error carries, in evaluation order.
    pub fn station_failures(&self) -> &[StationFailure] {
        match self {
            CommuteError::LegUnavailable(failure) => std::slice::from_ref(failure),
            CommuteError::NoReachableStation { failures, .. } => failures,
            _ => &[],
        }
    }
}

fn candidates_failed(failures: &[StationFailure]) -> String {
    match failures.len() {
        0 => "no candidate stations".to_string(),
        1 => "1 candidate failed".to_string(),
        n => format!("{n} candidates failed"),
    }
}

/// Trait for the mapping service the evaluator queries.
///
/// This abstraction allows the evaluator to be tested with mock data and
/// lets a cache sit in front of the real client.
pub trait MapsProvider: Send + Sync {
    /// Estimate a driving leg.
    fn driving_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> impl Future<Output = Result<LegEstimate, MapsError>> + Send;

    /// Estimate a rail transit leg.
    fn transit_estimate(
        &self,
        origin: &Location,
        destination: &Location,
        timing: LegTiming,
    ) -> impl Future<Output = Result<LegEstimate, MapsError>> + Send;

    /// Resolve an address to coordinates.
    fn geocode(&self, address: &str) -> impl Future<Output = Result<Coordinates, MapsError>> + Send;

    /// Train stations within `radius_m` metres of `center`, nearest first.
    fn nearby_stations(
        &self,
        center: Coordinates,
        radius_m: u32,
    ) -> impl Future<Output = Result<Vec<Station>, MapsError>> + Send;
}

/// Request to evaluate one address in one direction.
#[derive(Debug, Clone)]
pub struct CommuteRequest {
    /// The origin address, as read from input.
    pub address: String,

    pub direction: CommuteDirection,

    /// Target arrival, local to the configured timezone.
    pub target: ClockTime,

    /// Calendar date the target applies to.
    pub date: NaiveDate,

    /// Candidate stations in preference order.
    pub stations: Vec<Station>,
}

impl CommuteRequest {
    /// Create a new commute request.
    pub fn new(
        address: impl Into<String>,
        direction: CommuteDirection,
        target: ClockTime,
        date: NaiveDate,
        stations: Vec<Station>,
    ) -> Self {
        Self {
            address: address.into(),
            direction,
            target,
            date,
            stations,
        }
    }

    /// Validate the request, returning the parsed address.
    pub fn validate(&self) -> Result<Address, CommuteError> {
        let address = Address::parse(&self.address)
            .map_err(|e| CommuteError::InvalidRequest(e.to_string()))?;

        if self.stations.is_empty() {
            return Err(CommuteError::ConfigurationMissing(
                "no candidate stations".to_string(),
            ));
        }

        Ok(address)
    }
}

/// Evaluates candidate stations for one address at a time.
pub struct StationCandidateEvaluator<'a, P> {
    provider: &'a P,
    config: &'a CommuteConfig,
}

impl<'a, P: MapsProvider> StationCandidateEvaluator<'a, P> {
    /// Create a new evaluator.
    pub fn new(provider: &'a P, config: &'a CommuteConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &CommuteConfig {
        self.config
    }

    /// Build a request using the configured stations and arrival time.
    pub fn request(
        &self,
        address: impl Into<String>,
        direction: CommuteDirection,
        date: NaiveDate,
    ) -> CommuteRequest {
        CommuteRequest::new(
            address,
            direction,
            self.config.arrival_for(direction),
            date,
            self.config.stations.clone(),
        )
    }

    /// Evaluate every candidate station and return the fastest commute.
    ///
    /// Stations are tried in order. A failed leg skips that station and is
    /// recorded in the result; `NoReachableStation` is returned only when
    /// no station yields a complete estimate.
    pub async fn evaluate(&self, request: &CommuteRequest) -> Result<BestCommute, CommuteError> {
        let address = request.validate()?;
        let deadline = request
            .target
            .on_date(request.date, self.config.timezone)
            .map_err(|e| CommuteError::InvalidRequest(e.to_string()))?;

        info!(
            address = %address,
            direction = %request.direction,
            target = %request.target,
            candidates = request.stations.len(),
            "evaluating commute"
        );

        let home = address.location();
        let mut candidates = Vec::with_capacity(request.stations.len());
        let mut failures = Vec::new();

        for (index, station) in request.stations.iter().enumerate() {
            match self
                .evaluate_station(&home, index, station, request.direction, deadline)
                .await
            {
                Ok(estimate) => {
                    debug!(
                        station = %station,
                        drive_mins = estimate.drive.duration_mins(),
                        transit_mins = estimate.transit.duration_mins(),
                        total_mins = estimate.total_mins(),
                        "candidate evaluated"
                    );
                    candidates.push(estimate);
                }
                Err(CommuteError::LegUnavailable(failure)) => {
                    warn!(address = %address, "{failure}");
                    failures.push(failure);
                }
                Err(e) => return Err(e),
            }
        }

        let Some(estimate) = select_best(candidates) else {
            return Err(CommuteError::NoReachableStation {
                address: address.to_string(),
                failures,
            });
        };

        info!(
            address = %address,
            direction = %request.direction,
            station = %estimate.station,
            total_mins = estimate.total_mins(),
            "best station selected"
        );

        Ok(BestCommute {
            address,
            estimate,
            failures,
        })
    }

    /// Estimate both legs through one station.
    ///
    /// The transit leg is queried first because its timetable fixes when
    /// the drive has to end (morning) or can start (evening).
    async fn evaluate_station(
        &self,
        home: &Location,
        index: usize,
        station: &Station,
        direction: CommuteDirection,
        deadline: DateTime<Utc>,
    ) -> Result<CommuteEstimate, CommuteError> {
        let stop = station.location();
        let destination = self.config.destination.location();
        let timing = LegTiming::ArriveBy(deadline);

        let unavailable = |mode: TravelMode, e: MapsError| {
            CommuteError::LegUnavailable(StationFailure {
                station_index: index,
                station: station.name.clone(),
                mode,
                reason: e.to_string(),
            })
        };

        let (drive, transit) = match direction {
            CommuteDirection::Morning => {
                let transit = self
                    .provider
                    .transit_estimate(&stop, &destination, timing)
                    .await
                    .map_err(|e| unavailable(TravelMode::Transit, e))?;

                let board_at = transit
                    .departure
                    .unwrap_or_else(|| deadline - transit.duration());

                let drive = self
                    .provider
                    .driving_estimate(home, &stop, LegTiming::ArriveBy(board_at))
                    .await
                    .map_err(|e| unavailable(TravelMode::Driving, e))?;

                (drive, transit)
            }
            CommuteDirection::Evening => {
                let transit = self
                    .provider
                    .transit_estimate(&destination, &stop, timing)
                    .await
                    .map_err(|e| unavailable(TravelMode::Transit, e))?;

                let alight_at = transit.arrival.unwrap_or(deadline);

                let drive = self
                    .provider
                    .driving_estimate(&stop, home, LegTiming::DepartAt(alight_at))
                    .await
                    .map_err(|e| unavailable(TravelMode::Driving, e))?;

                (drive, transit)
            }
        };

        Ok(CommuteEstimate {
            station: station.clone(),
            station_index: index,
            direction,
            drive,
            transit,
        })
    }
}
