//! The transport network: timetable connections, footpaths between stops and
//! the street graph used for walking.
//!
//! Searches read the network only through the store traits defined here, so
//! any backing storage can be plugged in. The in-memory tables in this module
//! are what the loader builds.

mod calendar;
mod connections;
mod loader;
mod streets;
mod transfers;

pub use calendar::TripCalendar;
pub use connections::{ConnectionCursor, ConnectionStore, ConnectionTable};
pub use loader::{Network, NetworkError, StopRecord};
pub use streets::{
    EdgeData, EdgeRef, Factor, SpeedProfile, StopLinks, StreetGraph, StreetNetwork, Traversal,
    TravelProfile,
};
pub use transfers::{Transfer, TransferStore, TransferTable, TransferTableBuilder};
