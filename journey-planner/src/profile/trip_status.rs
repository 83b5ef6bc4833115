//! Per-trip memo of whether and where a trip was caught.

use serde::Serialize;

use crate::domain::{Seconds, StopId};

/// Where a trip was first caught during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Boarding {
    pub stop: StopId,
    /// Absolute departure second at the boarding stop.
    pub departure: Seconds,
    /// Transfer count every later connection of the trip is recorded at.
    pub transfers: usize,
}

/// State of one trip instance during a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TripStatus {
    #[default]
    NotEvaluated,
    /// The trip does not run on this service day.
    Impossible,
    /// The trip runs but has not been boarded yet.
    Possible,
    Reached(Boarding),
}

impl TripStatus {
    /// The boarding record, if the trip was caught.
    pub fn boarding(&self) -> Option<&Boarding> {
        match self {
            TripStatus::Reached(boarding) => Some(boarding),
            _ => None,
        }
    }
}
