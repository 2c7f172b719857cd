//! Mapping client error types.

use std::path::PathBuf;

/// Errors from the mapping-API client.
///
/// In-body statuses such as `ZERO_RESULTS` arrive with HTTP 200 and are
/// mapped here alongside transport failures, so callers see one error type
/// whichever layer rejected the request.
#[derive(Debug, thiserror::Error)]
pub enum MapsError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body did not match the expected shape
    #[error("JSON parse error: {message}{}", excerpt(.body))]
    Json {
        message: String,
        /// Leading part of the offending body, when there was one.
        body: Option<String>,
    },

    /// Non-2xx HTTP status, or an in-body status with no closer match
    /// (reported as status 0)
    #[error("API error {status}: {message}")]
    ApiError { status: u16, message: String },

    #[error("no route found: {0}")]
    NoRoute(String),

    #[error("rate limited by mapping API")]
    RateLimited,

    #[error("unauthorized (check GOOGLE_MAPS_API_KEY)")]
    Unauthorized,

    #[error("not configured: {0}")]
    NotConfigured(String),

    #[error("cannot read mock data {}: {source}", .path.display())]
    Fixture {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

fn excerpt(body: &Option<String>) -> String {
    match body {
        Some(body) => format!(" (body: {body})"),
        None => String::new(),
    }
}
