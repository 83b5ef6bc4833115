//! Walk search over the street graph for access, egress and walk-only legs.

mod router_point;
mod search;

pub use router_point::RouterPoint;
pub use search::{Direction, DykstraVisit, Visit, WalkSearch};
