//! Domain types for the journey planner.
//!
//! Identifiers, timetable connections, service-day clock arithmetic and the
//! error type shared by the searches.

mod connection;
mod error;
mod ids;
mod time;

pub use connection::Connection;
pub use error::SearchError;
pub use ids::{ConnectionId, EdgeId, EdgeType, StopId, TripId, TripKey, VertexId};
pub use time::{
    SECONDS_PER_DAY, Seconds, TimeError, format_clock, parse_clock, seconds_since_midnight,
    service_seconds, split_day, to_datetime,
};
