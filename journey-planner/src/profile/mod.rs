//! Transit search over timetable connections.
//!
//! [`ProfileSearch`] scans connections once in departure order and keeps, for
//! every stop it touches, the best arrival time for each number of
//! transfers. Journeys are read back with [`ProfileSearch::itinerary`].

mod frontier;
mod itinerary;
mod search;
mod trip_status;


pub use frontier::{Frontier, Provenance, StopProfile, StopProfileCollection, Timed};
pub use itinerary::{Itinerary, Leg};
pub use search::{ProfileSearch, TargetArrival};
pub use trip_status::{Boarding, TripStatus};
