//! Batch evaluation over an address file.
//!
//! Every (row, direction) pair is evaluated independently. Up to
//! `max_concurrent_rows` evaluations run at once, and results come back in
//! input order regardless of which finishes first.

use chrono::NaiveDate;
use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use crate::domain::{BestCommute, CommuteDirection, Station};
use crate::input::AddressRow;
use crate::planner::{
    CommuteConfig, CommuteError, CommuteRequest, MapsProvider, StationCandidateEvaluator,
};

const DEFAULT_MAX_CONCURRENT_ROWS: usize = 4;
const DEFAULT_SEARCH_RADIUS_M: u32 = 3000;

/// Options for a batch run.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Directions to evaluate for every row, in output order.
    pub directions: Vec<CommuteDirection>,

    /// Maximum evaluations in flight.
    pub max_concurrent_rows: usize,

    /// Add train stations found near each address to the candidates.
    pub discover_stations: bool,

    /// Search radius for discovery (metres).
    pub station_search_radius_m: u32,

    /// Date the arrival targets apply to.
    pub travel_date: NaiveDate,
}

impl BatchOptions {
    /// Morning and evening, default concurrency, no discovery.
    pub fn new(travel_date: NaiveDate) -> Self {
        Self {
            directions: vec![CommuteDirection::Morning, CommuteDirection::Evening],
            max_concurrent_rows: DEFAULT_MAX_CONCURRENT_ROWS,
            discover_stations: false,
            station_search_radius_m: DEFAULT_SEARCH_RADIUS_M,
            travel_date,
        }
    }

    pub fn with_directions(mut self, directions: Vec<CommuteDirection>) -> Self {
        self.directions = directions;
        self
    }

    pub fn with_max_concurrent_rows(mut self, n: usize) -> Self {
        self.max_concurrent_rows = n;
        self
    }

    /// Enable nearby-station discovery within `radius_m` metres.
    pub fn with_discovery(mut self, radius_m: u32) -> Self {
        self.discover_stations = true;
        self.station_search_radius_m = radius_m;
        self
    }
}

/// Result for one address in one direction.
#[derive(Debug, Clone)]
pub struct AddressOutcome {
    pub row: usize,
    pub address: String,
    pub direction: CommuteDirection,
    pub result: Result<BestCommute, CommuteError>,
}

impl AddressOutcome {
    pub fn is_success(&self) -> bool {
        self.result.is_ok()
    }
}

/// Runs the evaluator over many addresses.
pub struct BatchRunner<'a, P> {
    provider: &'a P,
    evaluator: StationCandidateEvaluator<'a, P>,
    options: BatchOptions,
}

impl<'a, P: MapsProvider> BatchRunner<'a, P> {
    /// Create a runner.
    ///
    /// Fails with `ConfigurationMissing` when there are no configured
    /// stations and discovery is off, since every row would fail.
    pub fn new(
        provider: &'a P,
        config: &'a CommuteConfig,
        options: BatchOptions,
    ) -> Result<Self, CommuteError> {
        if config.stations.is_empty() && !options.discover_stations {
            return Err(CommuteError::ConfigurationMissing(
                "no stations configured and station discovery is disabled".to_string(),
            ));
        }

        Ok(Self {
            provider,
            evaluator: StationCandidateEvaluator::new(provider, config),
            options,
        })
    }

    /// Evaluate every row in every configured direction.
    ///
    /// Outcomes are ordered by row, then by the order of `directions`.
    pub async fn run(&self, rows: &[AddressRow]) -> Vec<AddressOutcome> {
        let jobs: Vec<(&AddressRow, CommuteDirection)> = rows
            .iter()
            .flat_map(|row| self.options.directions.iter().map(move |d| (row, *d)))
            .collect();

        info!(
            rows = rows.len(),
            evaluations = jobs.len(),
            concurrency = self.options.max_concurrent_rows,
            "starting batch"
        );

        let outcomes: Vec<AddressOutcome> = stream::iter(jobs)
            .map(|(row, direction)| self.evaluate_row(row, direction))
            .buffered(self.options.max_concurrent_rows.max(1))
            .collect()
            .await;

        let failed = outcomes.iter().filter(|o| !o.is_success()).count();
        info!(
            succeeded = outcomes.len() - failed,
            failed, "batch complete"
        );

        outcomes
    }

    async fn evaluate_row(&self, row: &AddressRow, direction: CommuteDirection) -> AddressOutcome {
        let override_target = match direction {
            CommuteDirection::Morning => row.morning_arrival,
            CommuteDirection::Evening => row.evening_arrival,
        };
        let target = override_target.unwrap_or_else(|| self.evaluator.config().arrival_for(direction));

        let stations = self.candidate_stations(&row.address).await;
        let request = CommuteRequest::new(
            row.address.clone(),
            direction,
            target,
            self.options.travel_date,
            stations,
        );

        // Only reachable with discovery on and nothing configured or found.
        let result = if request.stations.is_empty() && !row.address.trim().is_empty() {
            Err(CommuteError::NoReachableStation {
                address: row.address.trim().to_string(),
                failures: Vec::new(),
            })
        } else {
            self.evaluator.evaluate(&request).await
        };
        if let Err(e) = &result {
            warn!(row = row.row, address = %row.address, %direction, "{e}");
        }

        AddressOutcome {
            row: row.row,
            address: row.address.clone(),
            direction,
            result,
        }
    }

    /// Configured stations, followed by discovered ones when enabled.
    ///
    /// Discovered stations keep the provider's nearest-first order and
    /// skip names already in the list. Discovery failures only narrow
    /// the candidate list.
    async fn candidate_stations(&self, address: &str) -> Vec<Station> {
        let mut stations = self.evaluator.config().stations.clone();
        if !self.options.discover_stations || address.trim().is_empty() {
            return stations;
        }

        let center = match self.provider.geocode(address.trim()).await {
            Ok(center) => center,
            Err(e) => {
                warn!(%address, "station discovery skipped, geocode failed: {e}");
                return stations;
            }
        };

        match self
            .provider
            .nearby_stations(center, self.options.station_search_radius_m)
            .await
        {
            Ok(found) => {
                for station in found {
                    let known = stations
                        .iter()
                        .any(|s| s.name.eq_ignore_ascii_case(&station.name));
                    if !known {
                        stations.push(station);
                    }
                }
            }
            Err(e) => warn!(%address, "station discovery failed: {e}"),
        }

        stations
    }
}
