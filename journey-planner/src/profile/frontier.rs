//! Pareto frontiers indexed by transfer count.

use serde::Serialize;

use crate::domain::{ConnectionId, Seconds, StopId};

/// Anything with an arrival time that a [`Frontier`] can order.
pub trait Timed {
    fn seconds(&self) -> Seconds;
}

/// How a stop was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", content = "from", rename_all = "snake_case")]
pub enum Provenance {
    /// The stop is a source of the search.
    First,
    /// Alighting from this connection.
    ViaConnection(ConnectionId),
    /// Walking a footpath from this stop.
    ViaTransfer(StopId),
}

/// One frontier entry at a stop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct StopProfile {
    pub provenance: Provenance,
    /// Absolute arrival second.
    pub seconds: Seconds,
}

impl StopProfile {
    pub fn first(seconds: Seconds) -> Self {
        Self {
            provenance: Provenance::First,
            seconds,
        }
    }

    pub fn via_connection(connection: ConnectionId, seconds: Seconds) -> Self {
        Self {
            provenance: Provenance::ViaConnection(connection),
            seconds,
        }
    }

    pub fn via_transfer(from: StopId, seconds: Seconds) -> Self {
        Self {
            provenance: Provenance::ViaTransfer(from),
            seconds,
        }
    }

    /// Whether the entry, held at `transfers`, involved at least one vehicle.
    ///
    /// Footpaths seeded from a source sit at zero transfers and only ever
    /// walked; every other footpath follows a ride.
    pub fn rode_transit(&self, transfers: usize) -> bool {
        match self.provenance {
            Provenance::First => false,
            Provenance::ViaConnection(_) => true,
            Provenance::ViaTransfer(_) => transfers > 0,
        }
    }
}

impl Timed for StopProfile {
    fn seconds(&self) -> Seconds {
        self.seconds
    }
}

/// A Pareto frontier of arrival times by transfer count.
///
/// For any two occupied slots `i < j`, the entry at `j` arrives strictly
/// earlier than the one at `i`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Frontier<P> {
    slots: Vec<Option<P>>,
}

impl<P> Default for Frontier<P> {
    fn default() -> Self {
        Self { slots: Vec::new() }
    }
}

/// The frontier kept at every reached stop.
pub type StopProfileCollection = Frontier<StopProfile>;

impl<P: Timed + Copy> Frontier<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Offer a candidate at `transfers`. Returns true if it was kept.
    ///
    /// The candidate is rejected when the highest occupied slot at or below
    /// `transfers` arrives no later. Otherwise it takes slot `transfers` and
    /// evicts every higher slot it arrives no later than.
    pub fn offer(&mut self, transfers: usize, candidate: P) -> bool {
        let seconds = candidate.seconds();

        let dominated = self
            .slots
            .iter()
            .take(transfers + 1)
            .rev()
            .flatten()
            .next()
            .is_some_and(|existing| existing.seconds() <= seconds);
        if dominated {
            return false;
        }

        if self.slots.len() <= transfers {
            self.slots.resize(transfers + 1, None);
        }
        self.slots[transfers] = Some(candidate);

        for slot in &mut self.slots[transfers + 1..] {
            if slot.is_some_and(|existing| existing.seconds() >= seconds) {
                *slot = None;
            }
        }
        while matches!(self.slots.last(), Some(None)) {
            self.slots.pop();
        }
        true
    }

    /// The entry at exactly `transfers`.
    pub fn get(&self, transfers: usize) -> Option<&P> {
        self.slots.get(transfers).and_then(Option::as_ref)
    }

    /// Occupied entries with their transfer counts, fewest transfers first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (usize, &P)> {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| slot.as_ref().map(|p| (i, p)))
    }

    /// The earliest-arriving entry, which is also the one with most transfers.
    pub fn earliest(&self) -> Option<(usize, &P)> {
        self.iter().next_back()
    }

    /// Number of slots, i.e. one more than the highest occupied count.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Check that arrival times strictly decrease with transfer count.
    pub fn is_pareto_optimal(&self) -> bool {
        let times: Vec<Seconds> = self.iter().map(|(_, p)| p.seconds()).collect();
        times.windows(2).all(|w| w[0] > w[1])
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        /// Any sequence of offers leaves a strictly Pareto-optimal frontier
        #[test]
        fn offers_keep_frontier_pareto_optimal(
            offers in prop::collection::vec((0usize..6, 0u32..500), 0..60)
        ) {
            let mut f = StopProfileCollection::new();
            for (t, s) in offers {
                f.offer(t, StopProfile::first(s));
                prop_assert!(f.is_pareto_optimal());
                prop_assert!(f.is_empty() || f.get(f.len() - 1).is_some());
            }
        }

        /// An accepted offer is retrievable at its slot
        #[test]
        fn accepted_offer_is_stored(
            offers in prop::collection::vec((0usize..6, 0u32..500), 0..30),
            t in 0usize..6,
            s in 0u32..500,
        ) {
            let mut f = StopProfileCollection::new();
            for (ot, os) in offers {
                f.offer(ot, StopProfile::first(os));
            }
            if f.offer(t, StopProfile::first(s)) {
                prop_assert_eq!(f.get(t).map(|p| p.seconds), Some(s));
            }
        }
    }
}
