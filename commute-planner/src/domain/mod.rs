//! Domain types for the commute planner.
//!
//! This module contains the core domain model types. Types that carry
//! invariants (non-empty addresses, in-range coordinates, valid clock
//! times) enforce them at construction time.

mod address;
mod commute;
mod error;
mod geo;
mod leg;
mod station;
mod time;

pub use address::Address;
pub use commute::{BestCommute, CommuteDirection, CommuteEstimate, StationFailure};
pub use error::DomainError;
pub use geo::{Coordinates, Location};
pub use leg::{LegEstimate, LegTiming, METERS_PER_MILE, TransitDetails, TravelMode};
pub use station::{Station, StationRole};
pub use time::{ClockTime, TimeError, format_local, next_weekday};
