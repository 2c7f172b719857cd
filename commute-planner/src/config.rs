//! Environment configuration.
//!
//! Everything is read up front into typed structs, so a bad value aborts
//! the run before any API call is made. Lookups go through a function
//! rather than `std::env` directly so tests never touch the process
//! environment.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;
use tracing::debug;

use crate::domain::{Address, ClockTime, Station, StationRole, next_weekday};
use crate::maps::DEFAULT_BASE_URL;
use crate::planner::CommuteConfig;

pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";
pub const DESTINATION_VAR: &str = "FINAL_DESTINATION";
pub const PREFERRED_STATION_VAR: &str = "PREFERRED_STATION";
pub const FALLBACK_STATIONS_VAR: &str = "FALLBACK_STATIONS";
pub const MORNING_ARRIVAL_VAR: &str = "MORNING_ARRIVAL";
pub const EVENING_ARRIVAL_VAR: &str = "EVENING_ARRIVAL";
pub const TRANSIT_LINES_VAR: &str = "TRANSIT_LINES";
pub const TIMEZONE_VAR: &str = "COMMUTE_TIMEZONE";
pub const BASE_URL_VAR: &str = "MAPS_BASE_URL";

const DEFAULT_MORNING_ARRIVAL: &str = "09:00";
const DEFAULT_EVENING_ARRIVAL: &str = "17:30";
const DEFAULT_TIMEZONE: &str = "America/New_York";

/// Error loading configuration.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or blank
    #[error("configuration missing: {0} is not set")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed
    #[error("invalid {var}: {reason}")]
    Invalid { var: &'static str, reason: String },
}

impl ConfigError {
    fn invalid(var: &'static str, reason: impl ToString) -> Self {
        ConfigError::Invalid {
            var,
            reason: reason.to_string(),
        }
    }
}

/// Which requirements apply to this run.
#[derive(Debug, Clone, Copy)]
pub struct LoadOptions {
    /// The API key must be present (false when serving mock data).
    pub require_api_key: bool,

    /// The station list may be empty (stations will be discovered).
    pub allow_no_stations: bool,
}

impl Default for LoadOptions {
    fn default() -> Self {
        Self {
            require_api_key: true,
            allow_no_stations: false,
        }
    }
}

/// Complete run configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Google Maps API key, if set.
    pub api_key: Option<String>,

    /// Base URL for the mapping API.
    pub base_url: String,

    /// Transit lines routes must use; empty allows any.
    pub allowed_lines: Vec<String>,

    /// Parameters handed to the evaluator.
    pub commute: CommuteConfig,
}

impl AppConfig {
    /// Load configuration from the process environment.
    pub fn from_env(options: LoadOptions) -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok(), options)
    }

    /// Load configuration through a variable lookup function.
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F, options: LoadOptions) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(API_KEY_VAR);
        if options.require_api_key && api_key.is_none() {
            return Err(ConfigError::Missing(API_KEY_VAR));
        }

        let destination = get(DESTINATION_VAR).ok_or(ConfigError::Missing(DESTINATION_VAR))?;
        let destination = Address::parse(&destination)
            .map_err(|e| ConfigError::invalid(DESTINATION_VAR, e))?;

        let mut stations = Vec::new();
        if let Some(entry) = get(PREFERRED_STATION_VAR) {
            stations.push(
                Station::parse(&entry, StationRole::Preferred)
                    .map_err(|e| ConfigError::invalid(PREFERRED_STATION_VAR, e))?,
            );
        } else if !options.allow_no_stations {
            return Err(ConfigError::Missing(PREFERRED_STATION_VAR));
        }

        for entry in split_list(get(FALLBACK_STATIONS_VAR).as_deref()) {
            stations.push(
                Station::parse(entry, StationRole::Fallback)
                    .map_err(|e| ConfigError::invalid(FALLBACK_STATIONS_VAR, e))?,
            );
        }

        let morning_arrival = parse_time(
            MORNING_ARRIVAL_VAR,
            get(MORNING_ARRIVAL_VAR).as_deref().unwrap_or(DEFAULT_MORNING_ARRIVAL),
        )?;
        let evening_arrival = parse_time(
            EVENING_ARRIVAL_VAR,
            get(EVENING_ARRIVAL_VAR).as_deref().unwrap_or(DEFAULT_EVENING_ARRIVAL),
        )?;

        let timezone: Tz = get(TIMEZONE_VAR)
            .as_deref()
            .unwrap_or(DEFAULT_TIMEZONE)
            .parse()
            .map_err(|e| ConfigError::invalid(TIMEZONE_VAR, e))?;

        let allowed_lines = split_list(get(TRANSIT_LINES_VAR).as_deref())
            .map(str::to_string)
            .collect();

        let base_url = get(BASE_URL_VAR).unwrap_or_else(|| DEFAULT_BASE_URL.to_string());

        debug!(
            destination = %destination,
            stations = stations.len(),
            %morning_arrival,
            %evening_arrival,
            %timezone,
            "configuration loaded"
        );

        Ok(Self {
            api_key,
            base_url,
            allowed_lines,
            commute: CommuteConfig::new(
                destination,
                stations,
                morning_arrival,
                evening_arrival,
                timezone,
            ),
        })
    }

    /// The date commutes are planned for: the next weekday after `now`
    /// in the configured timezone.
    pub fn travel_date(&self, now: DateTime<Utc>) -> NaiveDate {
        next_weekday(now.with_timezone(&self.commute.timezone).date_naive())
    }
}

fn parse_time(var: &'static str, value: &str) -> Result<ClockTime, ConfigError> {
    ClockTime::parse_hhmm(value).map_err(|e| ConfigError::invalid(var, e))
}

/// Split a comma-separated list, dropping blank entries.
fn split_list(value: Option<&str>) -> impl Iterator<Item = &str> {
    value
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn load(pairs: &[(&str, &str)], options: LoadOptions) -> Result<AppConfig, ConfigError> {
        let vars = env(pairs);
        AppConfig::from_lookup(|name| vars.get(name).cloned(), options)
    }

    const BASE: &[(&str, &str)] = &[
        (API_KEY_VAR, "key-123"),
        (DESTINATION_VAR, "500 Office Blvd"),
        (PREFERRED_STATION_VAR, "Central Station"),
    ];

    #[test]
    fn defaults_applied() {
        let config = load(BASE, LoadOptions::default()).unwrap();

        assert_eq!(config.api_key.as_deref(), Some("key-123"));
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert!(config.allowed_lines.is_empty());
        assert_eq!(config.commute.destination.as_str(), "500 Office Blvd");
        assert_eq!(config.commute.morning_arrival.to_string(), "09:00");
        assert_eq!(config.commute.evening_arrival.to_string(), "17:30");
        assert_eq!(config.commute.timezone, chrono_tz::America::New_York);
        assert_eq!(config.commute.stations.len(), 1);
        assert_eq!(config.commute.stations[0].role, StationRole::Preferred);
    }

    #[test]
    fn full_configuration() {
        let mut pairs = BASE.to_vec();
        pairs.extend([
            (FALLBACK_STATIONS_VAR, "North Station, Ardmore@40.0083/-75.2904 ,"),
            (MORNING_ARRIVAL_VAR, "08:30"),
            (EVENING_ARRIVAL_VAR, "18:05"),
            (TRANSIT_LINES_VAR, "Paoli/Thorndale,Airport"),
            (TIMEZONE_VAR, "America/Chicago"),
            (BASE_URL_VAR, "http://localhost:9000"),
        ]);
        let config = load(&pairs, LoadOptions::default()).unwrap();

        let names: Vec<_> = config.commute.stations.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Central Station", "North Station", "Ardmore"]);
        assert_eq!(config.commute.stations[1].role, StationRole::Fallback);
        assert!(config.commute.stations[2].coordinates.is_some());
        assert_eq!(config.allowed_lines, vec!["Paoli/Thorndale", "Airport"]);
        assert_eq!(config.commute.morning_arrival.to_string(), "08:30");
        assert_eq!(config.commute.evening_arrival.to_string(), "18:05");
        assert_eq!(config.commute.timezone, chrono_tz::America::Chicago);
        assert_eq!(config.base_url, "http://localhost:9000");
    }

    #[test]
    fn missing_required() {
        let err = load(&BASE[1..], LoadOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::Missing(API_KEY_VAR));

        let err = load(&[BASE[0], BASE[2]], LoadOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::Missing(DESTINATION_VAR));

        let err = load(&BASE[..2], LoadOptions::default()).unwrap_err();
        assert_eq!(err, ConfigError::Missing(PREFERRED_STATION_VAR));
    }

    #[test]
    fn blank_counts_as_missing() {
        let err = load(
            &[(API_KEY_VAR, "k"), (DESTINATION_VAR, "   "), (PREFERRED_STATION_VAR, "X")],
            LoadOptions::default(),
        )
        .unwrap_err();
        assert_eq!(err, ConfigError::Missing(DESTINATION_VAR));
    }

    #[test]
    fn relaxed_options() {
        let options = LoadOptions {
            require_api_key: false,
            allow_no_stations: true,
        };
        let config = load(&[(DESTINATION_VAR, "500 Office Blvd")], options).unwrap();

        assert!(config.api_key.is_none());
        assert!(config.commute.stations.is_empty());
    }

    #[test]
    fn invalid_values() {
        let mut pairs = BASE.to_vec();
        pairs.push((MORNING_ARRIVAL_VAR, "9am"));
        assert!(matches!(
            load(&pairs, LoadOptions::default()),
            Err(ConfigError::Invalid { var: MORNING_ARRIVAL_VAR, .. })
        ));

        let mut pairs = BASE.to_vec();
        pairs.push((TIMEZONE_VAR, "Mars/Olympus"));
        assert!(matches!(
            load(&pairs, LoadOptions::default()),
            Err(ConfigError::Invalid { var: TIMEZONE_VAR, .. })
        ));

        let mut pairs = BASE.to_vec();
        pairs.push((FALLBACK_STATIONS_VAR, "Ardmore@north/west"));
        assert!(matches!(
            load(&pairs, LoadOptions::default()),
            Err(ConfigError::Invalid { var: FALLBACK_STATIONS_VAR, .. })
        ));
    }

    #[test]
    fn travel_date_skips_weekend() {
        let config = load(BASE, LoadOptions::default()).unwrap();

        // Friday 2024-06-07 22:00 New York is already Saturday in UTC.
        let now = Utc.with_ymd_and_hms(2024, 6, 8, 2, 0, 0).unwrap();
        assert_eq!(
            config.travel_date(now),
            NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()
        );

        // Tuesday → Wednesday.
        let now = Utc.with_ymd_and_hms(2024, 6, 4, 15, 0, 0).unwrap();
        assert_eq!(
            config.travel_date(now),
            NaiveDate::from_ymd_opt(2024, 6, 5).unwrap()
        );
    }

    #[test]
    fn error_messages() {
        assert_eq!(
            ConfigError::Missing(DESTINATION_VAR).to_string(),
            "configuration missing: FINAL_DESTINATION is not set"
        );
    }
}
