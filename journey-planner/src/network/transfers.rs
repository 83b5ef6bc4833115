//! Footpath transfers between stops.
//!
//! Some stops are close enough to walk between without using the street
//! graph search, e.g. platforms of one station or stops across a road.
//! This module stores those fixed-cost footpaths per stop.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{Seconds, StopId};

/// One outgoing footpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transfer {
    pub to: StopId,
    pub seconds: Seconds,
}

/// Read access to footpaths by origin stop.
pub trait TransferStore {
    /// Footpaths leaving `stop`.
    fn neighbors_of(&self, stop: StopId) -> &[Transfer];

    /// The walk time from `from` to `to`, if there is a direct footpath.
    fn seconds_between(&self, from: StopId, to: StopId) -> Option<Seconds> {
        self.neighbors_of(from)
            .iter()
            .find(|t| t.to == to)
            .map(|t| t.seconds)
    }
}

/// In-memory footpath table.
#[derive(Debug, Clone, Default)]
pub struct TransferTable {
    /// Outgoing footpaths per stop, each kept with the shortest time seen.
    transfers: HashMap<StopId, Vec<Transfer>>,
}

impl TransferTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a footpath walkable in both directions in the same time.
    pub fn add(&mut self, a: StopId, b: StopId, seconds: Seconds) {
        self.add_directed(a, b, seconds);
        self.add_directed(b, a, seconds);
    }

    /// Add a one-way footpath.
    ///
    /// Self-loops are ignored. Adding an existing pair keeps the shorter time.
    pub fn add_directed(&mut self, from: StopId, to: StopId, seconds: Seconds) {
        if from == to {
            return;
        }
        let list = self.transfers.entry(from).or_default();
        match list.iter_mut().find(|t| t.to == to) {
            Some(existing) => existing.seconds = existing.seconds.min(seconds),
            None => list.push(Transfer { to, seconds }),
        }
    }

    /// Number of directed footpaths.
    pub fn len(&self) -> usize {
        self.transfers.values().map(Vec::len).sum()
    }

    /// Returns true if there are no footpaths.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TransferStore for TransferTable {
    fn neighbors_of(&self, stop: StopId) -> &[Transfer] {
        self.transfers
            .get(&stop)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Builder for creating transfer tables.
///
/// Provides a fluent API for adding footpaths.
#[derive(Debug, Default)]
pub struct TransferTableBuilder {
    inner: TransferTable,
}

impl TransferTableBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a symmetric footpath.
    pub fn add(mut self, a: u32, b: u32, seconds: Seconds) -> Self {
        self.inner.add(StopId(a), StopId(b), seconds);
        self
    }

    /// Add a one-way footpath.
    pub fn add_directed(mut self, from: u32, to: u32, seconds: Seconds) -> Self {
        self.inner.add_directed(StopId(from), StopId(to), seconds);
        self
    }

    /// Build the table.
    pub fn build(self) -> TransferTable {
        self.inner
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_table() {
        let table = TransferTable::new();
        assert!(table.is_empty());
        assert_eq!(table.len(), 0);
        assert!(table.neighbors_of(StopId(0)).is_empty());
    }

    #[test]
    fn symmetric_add() {
        let mut table = TransferTable::new();
        table.add(StopId(0), StopId(1), 120);

        assert_eq!(table.len(), 2);
        assert_eq!(table.seconds_between(StopId(0), StopId(1)), Some(120));
        assert_eq!(table.seconds_between(StopId(1), StopId(0)), Some(120));
        assert_eq!(table.seconds_between(StopId(0), StopId(2)), None);
    }

    #[test]
    fn directed_add() {
        let table = TransferTableBuilder::new().add_directed(3, 4, 60).build();
        assert_eq!(table.seconds_between(StopId(3), StopId(4)), Some(60));
        assert_eq!(table.seconds_between(StopId(4), StopId(3)), None);
    }

    #[test]
    fn duplicate_keeps_shorter() {
        let table = TransferTableBuilder::new()
            .add(0, 1, 300)
            .add(0, 1, 180)
            .add(0, 1, 240)
            .build();
        assert_eq!(table.len(), 2);
        assert_eq!(table.seconds_between(StopId(0), StopId(1)), Some(180));
    }

    #[test]
    fn self_loops_ignored() {
        let table = TransferTableBuilder::new().add(5, 5, 0).build();
        assert!(table.is_empty());
    }

    #[test]
    fn neighbors_listed_in_insertion_order() {
        let table = TransferTableBuilder::new().add(0, 1, 60).add(0, 2, 90).build();
        let to: Vec<_> = table.neighbors_of(StopId(0)).iter().map(|t| t.to).collect();
        assert_eq!(to, vec![StopId(1), StopId(2)]);
    }
}
