//! Result CSV records.
//!
//! One flat record per (address, direction) outcome. Durations are in
//! minutes and distances in miles, rounded for reading; the geometry
//! columns let the HTML report be rebuilt from the CSV alone.

use std::io::{Read, Write};
use std::path::Path;

use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::batch::AddressOutcome;
use crate::domain::{Address, CommuteDirection, Coordinates, StationFailure, format_local};

use super::error::ReportError;

/// Whether an outcome produced a commute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordStatus {
    Ok,
    Failed,
}

/// One row of the result CSV.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub home_address: String,
    pub commute_type: CommuteDirection,
    pub status: RecordStatus,
    pub station_name: Option<String>,
    pub destination_station: String,
    pub drive_time_mins: Option<f64>,
    pub drive_distance_miles: Option<f64>,
    pub transit_time_mins: Option<f64>,
    pub walk_time_mins: Option<f64>,
    pub walk_distance_miles: Option<f64>,
    pub total_time_mins: Option<f64>,
    pub transfers: Option<u32>,
    /// Local "08:15 AM" style start of the whole trip.
    pub departure_time: Option<String>,
    pub arrival_time: Option<String>,
    pub error: Option<String>,
    /// Stations skipped on the way, "; "-separated.
    pub station_failures: Option<String>,
    pub home_lat: Option<f64>,
    pub home_lng: Option<f64>,
    pub station_lat: Option<f64>,
    pub station_lng: Option<f64>,
    pub dest_lat: Option<f64>,
    pub dest_lng: Option<f64>,
    pub drive_polyline: Option<String>,
    pub transit_polyline: Option<String>,
}

impl ResultRecord {
    /// Flatten one batch outcome.
    pub fn from_outcome(outcome: &AddressOutcome, destination: &Address, tz: Tz) -> Self {
        let mut record = Self {
            home_address: outcome.address.trim().to_string(),
            commute_type: outcome.direction,
            status: RecordStatus::Failed,
            station_name: None,
            destination_station: destination.to_string(),
            drive_time_mins: None,
            drive_distance_miles: None,
            transit_time_mins: None,
            walk_time_mins: None,
            walk_distance_miles: None,
            total_time_mins: None,
            transfers: None,
            departure_time: None,
            arrival_time: None,
            error: None,
            station_failures: None,
            home_lat: None,
            home_lng: None,
            station_lat: None,
            station_lng: None,
            dest_lat: None,
            dest_lng: None,
            drive_polyline: None,
            transit_polyline: None,
        };

        let best = match &outcome.result {
            Ok(best) => best,
            Err(e) => {
                record.error = Some(e.to_string());
                record.station_failures = join_failures(e.station_failures());
                return record;
            }
        };

        let estimate = &best.estimate;
        let (drive, transit) = (&estimate.drive, &estimate.transit);

        record.status = RecordStatus::Ok;
        record.station_failures = join_failures(&best.failures);
        record.station_name = Some(estimate.station.name.clone());
        record.drive_time_mins = Some(round1(drive.duration_mins()));
        record.drive_distance_miles = Some(round1(drive.distance_miles()));
        record.transit_time_mins = Some(round1(transit.duration_mins()));
        record.total_time_mins = Some(round1(estimate.total_mins()));
        record.departure_time = estimate.start_time().map(|t| format_local(t, tz));
        record.arrival_time = estimate.end_time().map(|t| format_local(t, tz));
        record.drive_polyline = drive.polyline.clone();
        record.transit_polyline = transit.polyline.clone();

        if let Some(details) = &transit.transit {
            // In the morning the rail leg ends at the stop nearest work.
            if outcome.direction == CommuteDirection::Morning {
                if let Some(stop) = &details.alight_stop {
                    record.destination_station = stop.clone();
                }
            }
            record.walk_time_mins = Some(round1(details.final_walk_mins()));
            record.walk_distance_miles = Some(round2(details.final_walk_miles()));
            record.transfers = Some(details.transfers);
        }

        // The drive runs home -> station in the morning, station -> home
        // in the evening; the transit leg mirrors it at the far end.
        let (home, drive_station, dest) = match outcome.direction {
            CommuteDirection::Morning => (drive.start, drive.end, transit.end),
            CommuteDirection::Evening => (drive.end, drive.start, transit.start),
        };
        let station = estimate.station.coordinates.or(drive_station);

        (record.home_lat, record.home_lng) = split(home);
        (record.station_lat, record.station_lng) = split(station);
        (record.dest_lat, record.dest_lng) = split(dest);

        record
    }

    pub fn is_ok(&self) -> bool {
        self.status == RecordStatus::Ok
    }

    pub fn home(&self) -> Option<Coordinates> {
        join(self.home_lat, self.home_lng)
    }

    pub fn station(&self) -> Option<Coordinates> {
        join(self.station_lat, self.station_lng)
    }

    pub fn destination(&self) -> Option<Coordinates> {
        join(self.dest_lat, self.dest_lng)
    }
}

/// Flatten outcomes and sort by address, morning before evening.
pub fn records_from_outcomes(
    outcomes: &[AddressOutcome],
    destination: &Address,
    tz: Tz,
) -> Vec<ResultRecord> {
    let mut records: Vec<ResultRecord> = outcomes
        .iter()
        .map(|o| ResultRecord::from_outcome(o, destination, tz))
        .collect();

    records.sort_by(|a, b| {
        a.home_address
            .cmp(&b.home_address)
            .then(a.commute_type.cmp(&b.commute_type))
    });

    records
}

/// Write records as CSV with a header row.
pub fn write_records<W: Write>(writer: W, records: &[ResultRecord]) -> Result<(), ReportError> {
    let mut writer = csv::Writer::from_writer(writer);
    for record in records {
        writer.serialize(record)?;
    }
    writer
        .flush()
        .map_err(|e| ReportError::Csv(csv::Error::from(e)))?;
    Ok(())
}

/// Read records written by [`write_records`].
pub fn read_records<R: Read>(reader: R) -> Result<Vec<ResultRecord>, ReportError> {
    let mut reader = csv::Reader::from_reader(reader);
    let records = reader.deserialize().collect::<Result<Vec<_>, _>>()?;
    Ok(records)
}

pub fn write_csv(path: impl AsRef<Path>, records: &[ResultRecord]) -> Result<(), ReportError> {
    let path = path.as_ref();
    let file = std::fs::File::create(path).map_err(|e| ReportError::io(path, e))?;
    write_records(file, records)
}

pub fn read_csv(path: impl AsRef<Path>) -> Result<Vec<ResultRecord>, ReportError> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(|e| ReportError::io(path, e))?;
    read_records(file)
}

fn join_failures(failures: &[StationFailure]) -> Option<String> {
    if failures.is_empty() {
        return None;
    }
    Some(
        failures
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    )
}

fn round1(x: f64) -> f64 {
    (x * 10.0).round() / 10.0
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn split(coords: Option<Coordinates>) -> (Option<f64>, Option<f64>) {
    match coords {
        Some(c) => (Some(c.lat), Some(c.lng)),
        None => (None, None),
    }
}

fn join(lat: Option<f64>, lng: Option<f64>) -> Option<Coordinates> {
    Some(Coordinates::new(lat?, lng?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{
        BestCommute, CommuteEstimate, LegEstimate, Station, TransitDetails, TravelMode,
    };
    use crate::planner::CommuteError;
    use chrono::{TimeZone, Utc};

    const TZ: Tz = chrono_tz::America::New_York;

    fn destination() -> Address {
        Address::parse("500 Office Blvd").unwrap()
    }

    fn success(address: &str, direction: CommuteDirection) -> AddressOutcome {
        let mut drive = LegEstimate::new(TravelMode::Driving, 920, 12875);
        drive.departure = Some(Utc.with_ymd_and_hms(2024, 6, 3, 12, 15, 0).unwrap());
        drive.arrival = Some(Utc.with_ymd_and_hms(2024, 6, 3, 12, 30, 20).unwrap());
        drive.start = Some(Coordinates::new(40.0, -75.3));
        drive.end = Some(Coordinates::new(39.95, -75.18));
        drive.polyline = Some("_p~iF~ps|U".to_string());

        let mut transit = LegEstimate::new(TravelMode::Transit, 1625, 20000);
        transit.arrival = Some(Utc.with_ymd_and_hms(2024, 6, 3, 13, 0, 0).unwrap());
        transit.end = Some(Coordinates::new(39.948, -75.19));
        transit.transit = Some(TransitDetails {
            transfers: 1,
            lines: vec!["Airport Line".into()],
            alight_stop: Some("Penn Medicine Station".into()),
            in_vehicle_secs: 1400,
            final_walk_secs: 225,
            final_walk_m: 300,
        });

        AddressOutcome {
            row: 1,
            address: address.to_string(),
            direction,
            result: Ok(BestCommute {
                address: Address::parse(address).unwrap(),
                estimate: CommuteEstimate {
                    station: Station::preferred("Central Station"),
                    station_index: 0,
                    direction,
                    drive,
                    transit,
                },
                failures: Vec::new(),
            }),
        }
    }

    fn failure(address: &str) -> AddressOutcome {
        AddressOutcome {
            row: 2,
            address: address.to_string(),
            direction: CommuteDirection::Morning,
            result: Err(CommuteError::NoReachableStation {
                address: address.to_string(),
                failures: vec![StationFailure {
                    station_index: 0,
                    station: "Central Station".into(),
                    mode: TravelMode::Transit,
                    reason: "no route found".into(),
                }],
            }),
        }
    }

    #[test]
    fn success_record_in_display_units() {
        let record =
            ResultRecord::from_outcome(&success("123 Main St", CommuteDirection::Morning), &destination(), TZ);

        assert!(record.is_ok());
        assert_eq!(record.station_name.as_deref(), Some("Central Station"));
        assert_eq!(record.destination_station, "Penn Medicine Station");
        assert_eq!(record.drive_time_mins, Some(15.3));
        assert_eq!(record.drive_distance_miles, Some(8.0));
        assert_eq!(record.transit_time_mins, Some(27.1));
        assert_eq!(record.walk_time_mins, Some(3.8));
        assert_eq!(record.walk_distance_miles, Some(0.19));
        assert_eq!(record.total_time_mins, Some(42.4));
        assert_eq!(record.transfers, Some(1));
        assert_eq!(record.departure_time.as_deref(), Some("08:15 AM"));
        assert_eq!(record.arrival_time.as_deref(), Some("09:00 AM"));
        assert_eq!(record.home(), Some(Coordinates::new(40.0, -75.3)));
        assert_eq!(record.station(), Some(Coordinates::new(39.95, -75.18)));
        assert_eq!(record.destination(), Some(Coordinates::new(39.948, -75.19)));
        assert!(record.error.is_none());
    }

    #[test]
    fn pinned_station_coordinates_win() {
        let mut outcome = success("123 Main St", CommuteDirection::Morning);
        if let Ok(best) = &mut outcome.result {
            best.estimate.station.coordinates = Some(Coordinates::new(39.9539, -75.1677));
        }
        let record = ResultRecord::from_outcome(&outcome, &destination(), TZ);
        assert_eq!(record.station(), Some(Coordinates::new(39.9539, -75.1677)));
    }

    #[test]
    fn evening_destination_is_workplace() {
        let record = ResultRecord::from_outcome(
            &success("123 Main St", CommuteDirection::Evening),
            &destination(),
            TZ,
        );
        assert_eq!(record.destination_station, "500 Office Blvd");
    }

    #[test]
    fn failed_record_carries_error() {
        let record = ResultRecord::from_outcome(&failure("9 Nowhere Rd"), &destination(), TZ);

        assert_eq!(record.status, RecordStatus::Failed);
        assert!(record.station_name.is_none());
        assert!(record.total_time_mins.is_none());
        assert!(record.error.unwrap().contains("no reachable station"));
        assert_eq!(
            record.station_failures.as_deref(),
            Some("transit leg via Central Station unavailable: no route found")
        );
    }

    #[test]
    fn skipped_stations_reported_on_success() {
        let mut outcome = success("123 Main St", CommuteDirection::Morning);
        if let Ok(best) = &mut outcome.result {
            best.failures = vec![
                StationFailure {
                    station_index: 0,
                    station: "North Station".into(),
                    mode: TravelMode::Transit,
                    reason: "no route found: ZERO_RESULTS".into(),
                },
                StationFailure {
                    station_index: 2,
                    station: "Ardmore".into(),
                    mode: TravelMode::Driving,
                    reason: "rate limited by mapping API".into(),
                },
            ];
        }

        let record = ResultRecord::from_outcome(&outcome, &destination(), TZ);

        assert!(record.is_ok());
        assert!(record.error.is_none());
        assert_eq!(
            record.station_failures.as_deref(),
            Some(
                "transit leg via North Station unavailable: no route found: ZERO_RESULTS; \
                 driving leg via Ardmore unavailable: rate limited by mapping API"
            )
        );
    }

    #[test]
    fn no_failures_leaves_column_empty() {
        let record =
            ResultRecord::from_outcome(&success("123 Main St", CommuteDirection::Evening), &destination(), TZ);
        assert!(record.station_failures.is_none());
    }

    #[test]
    fn records_sorted_by_address_then_direction() {
        let outcomes = vec![
            success("B St", CommuteDirection::Evening),
            success("B St", CommuteDirection::Morning),
            failure("A St"),
        ];
        let records = records_from_outcomes(&outcomes, &destination(), TZ);

        let keys: Vec<_> = records
            .iter()
            .map(|r| (r.home_address.as_str(), r.commute_type))
            .collect();
        assert_eq!(
            keys,
            vec![
                ("A St", CommuteDirection::Morning),
                ("B St", CommuteDirection::Morning),
                ("B St", CommuteDirection::Evening),
            ]
        );
    }

    #[test]
    fn csv_header_and_reload() {
        let records = records_from_outcomes(
            &[success("123 Main St", CommuteDirection::Morning), failure("9 Nowhere Rd")],
            &destination(),
            TZ,
        );

        let mut buf = Vec::new();
        write_records(&mut buf, &records).unwrap();
        let text = String::from_utf8(buf.clone()).unwrap();

        assert!(text.starts_with(
            "home_address,commute_type,status,station_name,destination_station,drive_time_mins,"
        ));
        assert!(text.contains("123 Main St,Morning,ok,Central Station,"));

        let reloaded = read_records(buf.as_slice()).unwrap();
        assert_eq!(reloaded, records);
    }

    #[test]
    fn csv_file_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("transit_analysis.csv");
        let records = records_from_outcomes(
            &[success("123 Main St", CommuteDirection::Evening)],
            &destination(),
            TZ,
        );

        write_csv(&path, &records).unwrap();
        assert_eq!(read_csv(&path).unwrap(), records);
        assert!(matches!(
            read_csv(dir.path().join("missing.csv")),
            Err(ReportError::Io { .. })
        ));
    }
}
