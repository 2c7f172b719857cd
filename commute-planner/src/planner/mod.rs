//! Commute planner.
//!
//! This module implements the core estimation logic that answers:
//! "Which station should I drive to so that I get to work (or home)
//! fastest?"
//!
//! Each candidate station is costed as a drive leg plus a transit leg,
//! and the smallest total wins, ties going to the station listed first.

mod config;
mod evaluate;
mod rank;

pub use config::CommuteConfig;
pub use evaluate::{CommuteError, CommuteRequest, MapsProvider, StationCandidateEvaluator};
pub use rank::select_best;
