//! Multimodal journey planner.
//!
//! This module answers: "leaving from here at this time, how do I best get
//! to each of these places?"
//!
//! Walking searches around the origin and every destination feed a
//! connection-scan transit search; the results are ranked against walking
//! the whole way.

mod config;
mod rank;
mod stitcher;

pub use config::SearchConfig;
pub use rank::{JourneyOption, OptionKind, rank_options, remove_dominated};
pub use stitcher::{
    Combination, MultimodalPlanner, NetworkPlanner, Plan, PlanRequest, PlannedJourney,
};
