//! Google encoded polylines (precision 5) as map coordinates.

use crate::domain::Coordinates;

/// Precision of the overview polylines returned by the Directions API.
const PRECISION: u32 = 5;

/// Error decoding an encoded polyline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid encoded polyline: {0}")]
pub struct PolylineError(String);

/// Decode an encoded polyline into coordinates.
///
/// # Examples
///
/// ```
/// use commute_planner::maps::decode_polyline;
///
/// let points = decode_polyline("_p~iF~ps|U").unwrap();
/// assert_eq!(points.len(), 1);
/// assert!((points[0].lat - 38.5).abs() < 1e-9);
/// assert!((points[0].lng + 120.2).abs() < 1e-9);
/// ```
pub fn decode_polyline(encoded: &str) -> Result<Vec<Coordinates>, PolylineError> {
    let line = polyline::decode_polyline(encoded, PRECISION)
        .map_err(|e| PolylineError(e.to_string()))?;

    // geo-types points are (x = longitude, y = latitude).
    Ok(line
        .coords()
        .map(|c| Coordinates::new(c.y, c.x))
        .collect())
}
