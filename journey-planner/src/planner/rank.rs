//! Option ranking for planner results.
//!
//! Ranks the ways of reaching one destination to present the most useful
//! option first.

use std::cmp::Ordering;

use serde::Serialize;

use crate::domain::Seconds;

/// How an option reaches the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OptionKind {
    /// Walk to a stop, ride, walk to the destination.
    Transit { transfers: usize },
    /// Walk the whole way.
    Walk,
}

/// One way of reaching a destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct JourneyOption {
    pub kind: OptionKind,
    /// Absolute arrival second at the destination.
    pub arrival: Seconds,
}

impl JourneyOption {
    pub fn transit(transfers: usize, arrival: Seconds) -> Self {
        Self {
            kind: OptionKind::Transit { transfers },
            arrival,
        }
    }

    pub fn walk(arrival: Seconds) -> Self {
        Self {
            kind: OptionKind::Walk,
            arrival,
        }
    }

    pub fn transfers(&self) -> usize {
        match self.kind {
            OptionKind::Transit { transfers } => transfers,
            OptionKind::Walk => 0,
        }
    }

    pub fn is_transit(&self) -> bool {
        matches!(self.kind, OptionKind::Transit { .. })
    }

    /// Travel time from `departure` plus a penalty per transfer.
    pub fn weight(&self, departure: Seconds, transfer_penalty: Seconds) -> u64 {
        let travel = u64::from(self.arrival.saturating_sub(departure));
        let penalty = u64::from(transfer_penalty) * self.transfers() as u64;
        travel + penalty
    }
}

/// Rank options by preference.
///
/// Options are ranked by:
/// 1. Weight (travel time plus transfer penalties; lower is better)
/// 2. Arrival time (earlier is better)
/// 3. Number of transfers (fewer is better)
/// 4. Walking before transit
///
/// Returns options sorted best-first.
pub fn rank_options(
    mut options: Vec<JourneyOption>,
    departure: Seconds,
    transfer_penalty: Seconds,
) -> Vec<JourneyOption> {
    options.sort_by(|a, b| compare(a, b, departure, transfer_penalty));
    options
}

fn compare(a: &JourneyOption, b: &JourneyOption, departure: Seconds, penalty: Seconds) -> Ordering {
    a.weight(departure, penalty)
        .cmp(&b.weight(departure, penalty))
        .then_with(|| a.arrival.cmp(&b.arrival))
        .then_with(|| a.transfers().cmp(&b.transfers()))
        .then_with(|| a.is_transit().cmp(&b.is_transit()))
}

/// Remove dominated options.
///
/// An option is dominated if another option arrives no later with no more
/// transfers. Of two options equal on both, the first one seen is kept.
pub fn remove_dominated(options: Vec<JourneyOption>) -> Vec<JourneyOption> {
    if options.len() <= 1 {
        return options;
    }

    let mut result: Vec<JourneyOption> = Vec::with_capacity(options.len());

    for option in options {
        let dominated = result.iter().any(|existing| {
            existing.arrival <= option.arrival && existing.transfers() <= option.transfers()
        });

        if !dominated {
            // Also remove any existing options dominated by this one
            result.retain(|existing| {
                !(option.arrival <= existing.arrival && option.transfers() <= existing.transfers())
            });
            result.push(option);
        }
    }

    result
}
