//! Application state for the web layer.

use std::sync::Arc;

use crate::network::Network;
use crate::planner::SearchConfig;

/// Shared application state.
///
/// Contains everything needed to handle requests.
#[derive(Clone)]
pub struct AppState {
    /// Timetable, footpaths and streets
    pub network: Arc<Network>,

    /// Journey planner configuration
    pub config: Arc<SearchConfig>,
}

impl AppState {
    /// Create a new app state.
    pub fn new(network: Network, config: SearchConfig) -> Self {
        Self {
            network: Arc::new(network),
            config: Arc::new(config),
        }
    }
}
