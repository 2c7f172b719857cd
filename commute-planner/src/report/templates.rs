//! Askama template for the HTML report.
//!
//! The report is a single self-contained page: summary statistics, a
//! Leaflet map drawn from JSON embedded in the page, and the detail
//! table. Everything is built from result records so the page can be
//! regenerated from a saved CSV.

use askama::Template;
use serde::Serialize;
use tracing::warn;

use crate::domain::Coordinates;
use crate::maps::decode_polyline;

use super::error::ReportError;
use super::record::ResultRecord;

/// Map centre used when no record carries coordinates.
const DEFAULT_CENTER: [f64; 2] = [39.9526, -75.1652];

/// Full report page.
#[derive(Template)]
#[template(path = "report.html")]
pub struct ReportTemplate {
    pub generated_at: String,
    pub summary: SummaryView,
    pub rows: Vec<RowView>,
    /// JSON for the map script, already safe to embed in `<script>`.
    pub map_json: String,
}

impl ReportTemplate {
    /// Build the page model from result records.
    pub fn from_records(
        records: &[ResultRecord],
        generated_at: impl Into<String>,
    ) -> Result<Self, ReportError> {
        let map_json = serde_json::to_string(&MapData::from_records(records))?;

        Ok(Self {
            generated_at: generated_at.into(),
            summary: SummaryView::from_records(records),
            rows: records.iter().map(RowView::from_record).collect(),
            map_json: escape_script(&map_json),
        })
    }
}

/// Render the report page to a string.
pub fn render_report(
    records: &[ResultRecord],
    generated_at: impl Into<String>,
) -> Result<String, ReportError> {
    Ok(ReportTemplate::from_records(records, generated_at)?.render()?)
}

/// Summary statistics over successful records.
#[derive(Debug, Clone, PartialEq)]
pub struct SummaryView {
    pub routes: usize,
    pub failures: usize,
    pub average: String,
    pub shortest: String,
    pub longest: String,
}

impl SummaryView {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let totals: Vec<f64> = records
            .iter()
            .filter(|r| r.is_ok())
            .filter_map(|r| r.total_time_mins)
            .collect();

        let stat = |value: Option<f64>| {
            value
                .map(|v| format!("{v:.1} minutes"))
                .unwrap_or_else(|| "n/a".to_string())
        };

        let average = (!totals.is_empty()).then(|| totals.iter().sum::<f64>() / totals.len() as f64);
        let shortest = totals.iter().copied().reduce(f64::min);
        let longest = totals.iter().copied().reduce(f64::max);

        Self {
            routes: totals.len(),
            failures: records.iter().filter(|r| !r.is_ok()).count(),
            average: stat(average),
            shortest: stat(shortest),
            longest: stat(longest),
        }
    }
}

/// One detail table row, preformatted.
#[derive(Debug, Clone)]
pub struct RowView {
    pub home_address: String,
    pub commute_type: String,
    pub ok: bool,
    pub station: String,
    pub destination: String,
    pub drive: String,
    pub drive_distance: String,
    pub transit: String,
    pub walk: String,
    pub total: String,
    pub transfers: String,
    pub departure: String,
    pub arrival: String,
    pub error: String,
    pub station_failures: String,
}

impl RowView {
    fn from_record(r: &ResultRecord) -> Self {
        Self {
            home_address: r.home_address.clone(),
            commute_type: r.commute_type.to_string(),
            ok: r.is_ok(),
            station: r.station_name.clone().unwrap_or_default(),
            destination: r.destination_station.clone(),
            drive: number(r.drive_time_mins),
            drive_distance: number(r.drive_distance_miles),
            transit: number(r.transit_time_mins),
            walk: number(r.walk_time_mins),
            total: number(r.total_time_mins),
            transfers: r.transfers.map(|t| t.to_string()).unwrap_or_default(),
            departure: r.departure_time.clone().unwrap_or_default(),
            arrival: r.arrival_time.clone().unwrap_or_default(),
            error: r.error.clone().unwrap_or_default(),
            station_failures: r.station_failures.clone().unwrap_or_default(),
        }
    }
}

fn number(value: Option<f64>) -> String {
    value.map(|v| format!("{v:.1}")).unwrap_or_default()
}

/// Map layers consumed by the page script.
#[derive(Debug, Clone, Serialize)]
pub struct MapData {
    pub center: [f64; 2],
    pub destination: Option<Marker>,
    pub homes: Vec<Marker>,
    pub stations: Vec<Marker>,
    pub drive_routes: Vec<RouteLine>,
    pub transit_routes: Vec<RouteLine>,
}

#[derive(Debug, Clone, Serialize)]
pub struct Marker {
    pub lat: f64,
    pub lng: f64,
    pub popup: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct RouteLine {
    pub points: Vec<[f64; 2]>,
    pub popup: String,
}

impl MapData {
    pub fn from_records(records: &[ResultRecord]) -> Self {
        let mut data = Self {
            center: DEFAULT_CENTER,
            destination: None,
            homes: Vec::new(),
            stations: Vec::new(),
            drive_routes: Vec::new(),
            transit_routes: Vec::new(),
        };

        for record in records.iter().filter(|r| r.is_ok()) {
            let station = record.station_name.as_deref().unwrap_or_default();

            if data.destination.is_none() {
                if let Some(dest) = record.destination() {
                    data.destination = Some(marker(
                        dest,
                        format!("Destination: {}", escape_html(&record.destination_station)),
                    ));
                }
            }

            if let Some(home) = record.home() {
                data.homes.push(marker(
                    home,
                    format!(
                        "Home: {}<br>{}: {} min",
                        escape_html(&record.home_address),
                        record.commute_type,
                        number(record.total_time_mins)
                    ),
                ));
            }

            if let Some(coords) = record.station() {
                let seen = data.stations.iter().any(|m| m.lat == coords.lat && m.lng == coords.lng);
                if !seen {
                    data.stations.push(marker(
                        coords,
                        format!("Station: {}", escape_html(station)),
                    ));
                }
            }

            if let Some(line) = route(
                record.drive_polyline.as_deref(),
                format!("Drive: {} min", number(record.drive_time_mins)),
            ) {
                data.drive_routes.push(line);
            }

            if let Some(line) = route(
                record.transit_polyline.as_deref(),
                format!(
                    "Transit via {}: {} min",
                    escape_html(station),
                    number(record.transit_time_mins)
                ),
            ) {
                data.transit_routes.push(line);
            }
        }

        if let Some(dest) = &data.destination {
            data.center = [dest.lat, dest.lng];
        }

        data
    }

    /// Number of markers on the map.
    pub fn marker_count(&self) -> usize {
        usize::from(self.destination.is_some()) + self.homes.len() + self.stations.len()
    }
}

fn marker(coords: Coordinates, popup: String) -> Marker {
    Marker {
        lat: coords.lat,
        lng: coords.lng,
        popup,
    }
}

/// Decode a polyline into a map line; bad polylines are logged and skipped.
fn route(encoded: Option<&str>, popup: String) -> Option<RouteLine> {
    let encoded = encoded.filter(|s| !s.is_empty())?;
    match decode_polyline(encoded) {
        Ok(points) if points.len() >= 2 => Some(RouteLine {
            points: points.iter().map(|p| [p.lat, p.lng]).collect(),
            popup,
        }),
        Ok(_) => None,
        Err(e) => {
            warn!("skipping route with bad polyline: {e}");
            None
        }
    }
}

/// Escape text for use inside a popup's HTML.
fn escape_html(text: &str) -> String {
    // The HTML escaper never fails.
    askama::filters::escape(askama::Html, text)
        .map(|escaped| escaped.to_string())
        .unwrap_or_default()
}

/// Make JSON safe to place inside a `<script>` element.
fn escape_script(json: &str) -> String {
    json.replace("</", "<\\/").replace("<!--", "<\\!--")
}
