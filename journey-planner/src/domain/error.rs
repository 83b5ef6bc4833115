//! Search error types.
//!
//! Expected-empty outcomes (nothing reachable, no connection after the
//! departure time) are not errors; searches report them through their
//! success flag. The variants here cover misuse of a search instance and
//! inconsistent input data.

use super::{EdgeId, StopId, TripId, VertexId};

/// Errors raised by the walk search, the profile search and the planner.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SearchError {
    /// The search instance has already been run; sources, targets and the
    /// run itself cannot be repeated.
    #[error("search has already run")]
    AlreadyRun,

    /// Results were queried before the search ran.
    #[error("search has not run yet")]
    NotRun,

    /// Results were queried on a search that found nothing.
    #[error("search did not succeed")]
    NotSucceeded,

    /// The stop was never touched by the run.
    #[error("stop {0} was not reached by this search")]
    UnknownStop(StopId),

    /// The trip was never evaluated by the run.
    #[error("trip {0} on day {1} was not evaluated by this search")]
    UnknownTrip(TripId, i32),

    /// The destination index is out of range.
    #[error("destination {0} is not part of this search")]
    UnknownDestination(usize),

    /// The street edge does not exist.
    #[error("edge {0} does not exist")]
    UnknownEdge(EdgeId),

    /// The street vertex does not exist.
    #[error("vertex {0} does not exist")]
    UnknownVertex(VertexId),

    /// The vertex was never settled by the walk search.
    #[error("vertex {0} was not settled by this search")]
    UnsettledVertex(VertexId),

    /// A profile chain or store lookup is inconsistent with the data.
    #[error("data integrity violation: {0}")]
    DataIntegrity(String),
}
