//! Search configuration for the journey planner.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::domain::Seconds;

/// Configuration parameters for journey search.
///
/// Every field has a default, so a configuration file only needs to list
/// what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    /// Minimum time to change between two different trips (seconds).
    /// Staying on the same trip needs no change time.
    pub min_transfer_secs: Seconds,

    /// Cost of one transfer when comparing journeys (seconds).
    pub transfer_penalty_secs: Seconds,

    /// How many transfer penalties past the best known arrival the scan
    /// keeps looking for journeys with fewer transfers.
    pub cutoff_slack_transfers: u32,

    /// Maximum time between the departure and the last scanned connection
    /// (seconds).
    pub max_search_horizon_secs: Seconds,

    /// Maximum number of transfers in a journey.
    pub max_transfers: usize,

    /// Maximum walking time from the origin to the first stop (seconds).
    pub max_access_secs: Seconds,

    /// Maximum walking time from the last stop to a destination (seconds).
    pub max_egress_secs: Seconds,

    /// End the scan as soon as any destination is reached.
    pub stop_at_first_arrival: bool,
}

impl SearchConfig {
    /// Returns the minimum transfer time as a Duration.
    pub fn min_transfer(&self) -> Duration {
        Duration::seconds(i64::from(self.min_transfer_secs))
    }

    /// Returns the transfer penalty as a Duration.
    pub fn transfer_penalty(&self) -> Duration {
        Duration::seconds(i64::from(self.transfer_penalty_secs))
    }

    /// Returns the search horizon as a Duration.
    pub fn max_search_horizon(&self) -> Duration {
        Duration::seconds(i64::from(self.max_search_horizon_secs))
    }

    /// Returns the access walking budget as a Duration.
    pub fn max_access(&self) -> Duration {
        Duration::seconds(i64::from(self.max_access_secs))
    }

    /// Returns the egress walking budget as a Duration.
    pub fn max_egress(&self) -> Duration {
        Duration::seconds(i64::from(self.max_egress_secs))
    }

    /// How far past the best known arrival departures are still scanned.
    pub fn cutoff_slack_secs(&self) -> Seconds {
        self.cutoff_slack_transfers
            .saturating_mul(self.transfer_penalty_secs)
    }

    /// Set the minimum transfer time.
    pub fn with_min_transfer_secs(mut self, seconds: Seconds) -> Self {
        self.min_transfer_secs = seconds;
        self
    }

    /// Set the maximum number of transfers.
    pub fn with_max_transfers(mut self, transfers: usize) -> Self {
        self.max_transfers = transfers;
        self
    }

    /// Set the search horizon.
    pub fn with_max_search_horizon_secs(mut self, seconds: Seconds) -> Self {
        self.max_search_horizon_secs = seconds;
        self
    }

    /// End the scan at the first end-to-end arrival.
    pub fn with_stop_at_first_arrival(mut self, stop: bool) -> Self {
        self.stop_at_first_arrival = stop;
        self
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            min_transfer_secs: 120,
            transfer_penalty_secs: 300,
            cutoff_slack_transfers: 4,
            max_search_horizon_secs: 21_600, // 6 hours
            max_transfers: 8,
            max_access_secs: 900,
            max_egress_secs: 900,
            stop_at_first_arrival: false,
        }
    }
}
