//! Conversion from Google Maps DTOs to domain types.
//!
//! This is where route alternatives are filtered and the transit leg's
//! duration is defined: time on board plus the final walk after leaving
//! the last vehicle. Waiting and walking before boarding are not counted.

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::domain::{Coordinates, LegEstimate, LegTiming, Station, StationRole, TransitDetails, TravelMode};

use super::error::MapsError;
use super::types::{DirectionsResponse, GeocodeResponse, LatLng, PlacesResponse, Route, RouteLeg, TimeValue};

impl From<LatLng> for Coordinates {
    fn from(ll: LatLng) -> Self {
        Coordinates::new(ll.lat, ll.lng)
    }
}

/// Map a Google in-body status to an error.
pub(crate) fn check_status(status: &str, error_message: Option<&str>) -> Result<(), MapsError> {
    match status {
        "OK" => Ok(()),
        "ZERO_RESULTS" | "NOT_FOUND" => Err(MapsError::NoRoute(status.to_string())),
        "OVER_QUERY_LIMIT" | "OVER_DAILY_LIMIT" => Err(MapsError::RateLimited),
        "REQUEST_DENIED" => Err(MapsError::Unauthorized),
        other => Err(MapsError::ApiError {
            status: 0,
            message: match error_message {
                Some(msg) => format!("{other}: {msg}"),
                None => other.to_string(),
            },
        }),
    }
}

fn saturating_u32(value: u64) -> u32 {
    u32::try_from(value).unwrap_or(u32::MAX)
}

fn to_instant(t: &TimeValue) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(t.value, 0)
}

fn first_leg(route: &Route) -> Option<&RouteLeg> {
    route.legs.first()
}

/// Convert a driving Directions response into a leg estimate.
///
/// Uses the traffic-aware duration when present.
pub fn convert_driving(
    resp: &DirectionsResponse,
    timing: LegTiming,
) -> Result<LegEstimate, MapsError> {
    check_status(&resp.status, resp.error_message.as_deref())?;

    let route = resp
        .routes
        .first()
        .ok_or_else(|| MapsError::NoRoute("response contained no routes".into()))?;
    let leg = first_leg(route).ok_or_else(|| MapsError::NoRoute("route has no legs".into()))?;

    let duration = leg.duration_in_traffic.as_ref().unwrap_or(&leg.duration);

    let mut estimate = LegEstimate::new(
        TravelMode::Driving,
        saturating_u32(duration.value),
        saturating_u32(leg.distance.value),
    );
    estimate.start = leg.start_location.map(Coordinates::from);
    estimate.end = leg.end_location.map(Coordinates::from);
    estimate.polyline = route.overview_polyline.as_ref().map(|p| p.points.clone());

    Ok(estimate.anchored(timing))
}

/// A transit route that passed filtering.
struct TransitCandidate<'a> {
    route: &'a Route,
    leg: &'a RouteLeg,
    details: TransitDetails,
}

impl TransitCandidate<'_> {
    fn duration_secs(&self) -> u32 {
        self.details
            .in_vehicle_secs
            .saturating_add(self.details.final_walk_secs)
    }
}

/// Whether a line name matches any entry of the allow-list (substring match).
fn line_allowed(line: &str, allowed_lines: &[String]) -> bool {
    allowed_lines.iter().any(|a| line.contains(a.as_str()))
}

/// Build a candidate from one route alternative, or reject it.
fn transit_candidate<'a>(
    index: usize,
    route: &'a Route,
    allowed_lines: &[String],
) -> Option<TransitCandidate<'a>> {
    let leg = first_leg(route)?;

    let last_transit = leg.steps.iter().rposition(|s| s.is_transit());
    let Some(last_transit) = last_transit else {
        debug!(route = index, "rejected: no transit steps");
        return None;
    };

    let transit_steps: Vec<_> = leg.steps.iter().filter(|s| s.is_transit()).collect();

    let lines: Vec<String> = transit_steps
        .iter()
        .filter_map(|s| s.transit_details.as_ref())
        .filter_map(|d| d.line.as_ref())
        .filter_map(|l| l.display_name())
        .map(str::to_string)
        .collect();

    if !allowed_lines.is_empty() && !lines.iter().any(|l| line_allowed(l, allowed_lines)) {
        debug!(route = index, ?lines, "rejected: no allowed line");
        return None;
    }

    let in_vehicle_secs: u64 = transit_steps.iter().map(|s| s.duration.value).sum();

    let (final_walk_secs, final_walk_m) = leg.steps[last_transit + 1..]
        .iter()
        .filter(|s| s.is_walking())
        .fold((0u64, 0u64), |(secs, m), s| {
            (secs + s.duration.value, m + s.distance.value)
        });

    let alight_stop = transit_steps
        .last()
        .and_then(|s| s.transit_details.as_ref())
        .and_then(|d| d.arrival_stop.as_ref())
        .map(|stop| stop.name.clone());

    let details = TransitDetails {
        transfers: saturating_u32(transit_steps.len() as u64 - 1),
        lines,
        alight_stop,
        in_vehicle_secs: saturating_u32(in_vehicle_secs),
        final_walk_secs: saturating_u32(final_walk_secs),
        final_walk_m: saturating_u32(final_walk_m),
    };

    debug!(
        route = index,
        in_vehicle_mins = details.in_vehicle_mins(),
        walk_mins = details.final_walk_mins(),
        "valid transit route"
    );

    Some(TransitCandidate {
        route,
        leg,
        details,
    })
}

/// Convert a transit Directions response into a leg estimate.
///
/// Routes without a transit step, or without any line matching
/// `allowed_lines`, are rejected. The remaining route with the smallest
/// on-board + final-walk time wins; on a tie the earlier alternative is
/// kept.
pub fn convert_transit(
    resp: &DirectionsResponse,
    timing: LegTiming,
    allowed_lines: &[String],
) -> Result<LegEstimate, MapsError> {
    check_status(&resp.status, resp.error_message.as_deref())?;

    let mut best: Option<TransitCandidate<'_>> = None;
    for (index, route) in resp.routes.iter().enumerate() {
        let Some(candidate) = transit_candidate(index, route, allowed_lines) else {
            continue;
        };
        match &best {
            Some(current) if candidate.duration_secs() >= current.duration_secs() => {}
            _ => best = Some(candidate),
        }
    }

    let best = best.ok_or_else(|| {
        MapsError::NoRoute(format!(
            "none of {} transit alternatives matched the allowed lines",
            resp.routes.len()
        ))
    })?;

    let mut estimate = LegEstimate::new(
        TravelMode::Transit,
        best.duration_secs(),
        saturating_u32(best.leg.distance.value),
    );
    estimate.departure = best.leg.departure_time.as_ref().and_then(to_instant);
    estimate.arrival = best.leg.arrival_time.as_ref().and_then(to_instant);
    estimate.start = best.leg.start_location.map(Coordinates::from);
    estimate.end = best.leg.end_location.map(Coordinates::from);
    estimate.polyline = best.route.overview_polyline.as_ref().map(|p| p.points.clone());
    estimate.transit = Some(best.details);

    Ok(estimate.anchored(timing))
}

/// Extract the first geocoding hit.
pub fn convert_geocode(resp: &GeocodeResponse) -> Result<Coordinates, MapsError> {
    check_status(&resp.status, resp.error_message.as_deref())?;

    resp.results
        .first()
        .map(|r| Coordinates::from(r.geometry.location))
        .ok_or_else(|| MapsError::NoRoute("no geocoding result".into()))
}

/// Convert nearby-search results into discovered stations, nearest first.
pub fn convert_places(
    resp: &PlacesResponse,
    center: Coordinates,
) -> Result<Vec<Station>, MapsError> {
    if resp.status == "ZERO_RESULTS" {
        return Ok(Vec::new());
    }
    check_status(&resp.status, resp.error_message.as_deref())?;

    let mut stations: Vec<Station> = resp
        .results
        .iter()
        .map(|place| {
            let station = Station::new(place.name.clone(), StationRole::Discovered)
                .with_coordinates(place.geometry.location.into());
            match &place.vicinity {
                Some(v) => station.with_vicinity(v.clone()),
                None => station,
            }
        })
        .collect();

    stations.sort_by(|a, b| {
        let da = a.coordinates.map_or(f64::INFINITY, |c| c.distance_km(&center));
        let db = b.coordinates.map_or(f64::INFINITY, |c| c.distance_km(&center));
        da.total_cmp(&db)
    });

    Ok(stations)
}
