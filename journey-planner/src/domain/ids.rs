//! Identifier types for stops, trips, connections and the street graph.
//!
//! All identifiers are dense `u32` indices handed out by the stores that own
//! the underlying records. Wrapping them in distinct types keeps a stop id
//! from being passed where a vertex id is expected.

use std::fmt;

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub u32);

        impl $name {
            /// Returns the id as an index into the owning store.
            pub fn index(self) -> usize {
                self.0 as usize
            }
        }

        impl From<u32> for $name {
            fn from(value: u32) -> Self {
                Self(value)
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($name), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}{}", $prefix, self.0)
            }
        }
    };
}

id_type!(
    /// A transit stop.
    StopId,
    "S"
);

id_type!(
    /// A trip: one vehicle run over an ordered sequence of connections.
    TripId,
    "T"
);

id_type!(
    /// Position of a connection in the departure-sorted connection view.
    ConnectionId,
    "C"
);

id_type!(
    /// A vertex of the street graph.
    VertexId,
    "V"
);

id_type!(
    /// An edge of the street graph.
    EdgeId,
    "E"
);

id_type!(
    /// Edge classification used to look up travel speeds.
    EdgeType,
    "ET"
);

/// A trip on a specific service day.
///
/// The same trip id on the next service day is a different vehicle run, so
/// per-trip search state is keyed by this pair rather than the bare id.
/// `day` counts service days from the search date; `-1` is the day before,
/// whose trips may still be running after midnight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TripKey {
    pub trip: TripId,
    pub day: i32,
}

impl TripKey {
    pub fn new(trip: TripId, day: i32) -> Self {
        Self { trip, day }
    }
}
