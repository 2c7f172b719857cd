//! Domain error types.
//!
//! These errors represent validation failures in the domain layer.
//! They are distinct from API/IO errors.

/// Domain-level validation errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DomainError {
    /// Address is empty or whitespace
    #[error("address must not be empty")]
    EmptyAddress,

    /// Station entry could not be parsed
    #[error("invalid station: {0}")]
    InvalidStation(String),

    /// Coordinates could not be parsed or are out of range
    #[error("invalid coordinates: {0} (expected lat/lng)")]
    InvalidCoordinates(String),
}
