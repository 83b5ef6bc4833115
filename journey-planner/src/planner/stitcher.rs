//! Multimodal planning: walking to and from stops around a transit search.
//!
//! One forward walk from the origin finds the stops the traveller can reach
//! on foot and when; one backward walk per destination finds the stops the
//! destination can be reached from and how long that last walk takes. The
//! profile search then connects the two sets, and each destination's best
//! transit option is weighed against simply walking there.

use chrono::NaiveDateTime;
use serde::Serialize;
use tracing::debug;

use crate::domain::{SearchError, Seconds, seconds_since_midnight};
use crate::network::{
    ConnectionStore, ConnectionTable, Network, SpeedProfile, StopLinks, StreetGraph,
    StreetNetwork, TransferStore, TransferTable, TravelProfile,
};
use crate::profile::{Itinerary, ProfileSearch};
use crate::walk::{Direction, RouterPoint, Visit, WalkSearch};

use super::config::SearchConfig;
use super::rank::{JourneyOption, OptionKind, rank_options, remove_dominated};

/// A journey planning request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub origin: RouterPoint,
    pub destinations: Vec<RouterPoint>,
    pub departure: NaiveDateTime,
}

impl PlanRequest {
    pub fn new(origin: RouterPoint, destinations: Vec<RouterPoint>, departure: NaiveDateTime) -> Self {
        Self {
            origin,
            destinations,
            departure,
        }
    }
}

/// The best way to one destination, as reported to route builders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Combination {
    pub transfers: usize,
    pub is_transit: bool,
    pub arrival: Seconds,
}

/// The chosen journey to one destination with everything needed to
/// describe it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedJourney {
    pub option: JourneyOption,
    /// Absolute departure second from the origin.
    pub departure: Seconds,
    /// Stop-to-stop part; `None` for walk-only journeys.
    pub itinerary: Option<Itinerary>,
}

/// Plans journeys over a set of stores.
pub struct MultimodalPlanner<'a, C, T, G, P>
where
    C: ConnectionStore + ?Sized,
    T: TransferStore + ?Sized,
    G: StreetGraph + ?Sized,
    P: TravelProfile + ?Sized,
{
    connections: &'a C,
    transfers: &'a T,
    graph: &'a G,
    profile: &'a P,
    links: &'a StopLinks,
    config: &'a SearchConfig,
}

/// A planner over a loaded [`Network`].
pub type NetworkPlanner<'a> =
    MultimodalPlanner<'a, ConnectionTable, TransferTable, StreetNetwork, SpeedProfile>;

impl<'a> NetworkPlanner<'a> {
    pub fn for_network(network: &'a Network, config: &'a SearchConfig) -> Self {
        Self::new(
            &network.connections,
            &network.transfers,
            &network.streets,
            &network.profile,
            &network.links,
            config,
        )
    }
}

impl<'a, C, T, G, P> MultimodalPlanner<'a, C, T, G, P>
where
    C: ConnectionStore + ?Sized,
    T: TransferStore + ?Sized,
    G: StreetGraph + ?Sized,
    P: TravelProfile + ?Sized,
{
    pub fn new(
        connections: &'a C,
        transfers: &'a T,
        graph: &'a G,
        profile: &'a P,
        links: &'a StopLinks,
        config: &'a SearchConfig,
    ) -> Self {
        Self {
            connections,
            transfers,
            graph,
            profile,
            links,
            config,
        }
    }

    /// Run every search a request needs.
    pub fn plan(&self, request: &PlanRequest) -> Result<Plan<'a, C, T, G, P>, SearchError> {
        let departure = seconds_since_midnight(request.departure);
        let links = self.links;

        let mut search =
            ProfileSearch::new(self.connections, self.transfers, self.config, request.departure);
        search.set_destination_count(request.destinations.len())?;

        let origin = request
            .origin
            .sources(self.graph, self.profile, Direction::Forward)?;
        let mut access = WalkSearch::new(
            self.graph,
            self.profile,
            origin,
            self.config.max_access_secs as f32,
            Direction::Forward,
        );

        let mut registration = Ok(());
        access.run(|visit| {
            for &stop in links.stops_at(visit.vertex) {
                let reached = departure.saturating_add(whole_seconds(visit.weight));
                if let Err(err) = search.add_source(stop, reached) {
                    registration = Err(err);
                    return Visit::Stop;
                }
            }
            Visit::Continue
        })?;
        registration?;

        let mut egress = Vec::with_capacity(request.destinations.len());
        let mut walks = Vec::with_capacity(request.destinations.len());
        for (destination, point) in request.destinations.iter().enumerate() {
            let sources = point.sources(self.graph, self.profile, Direction::Backward)?;
            let mut walk = WalkSearch::new(
                self.graph,
                self.profile,
                sources,
                self.config.max_egress_secs as f32,
                Direction::Backward,
            );

            let mut best_walk: Option<f32> = None;
            let mut registration = Ok(());
            walk.run(|visit| {
                if let Some(weight) = access.weight(visit.vertex) {
                    let total = weight + visit.weight;
                    best_walk = Some(best_walk.map_or(total, |best| best.min(total)));
                }
                for &stop in links.stops_at(visit.vertex) {
                    if let Err(err) = search.add_target(destination, stop, whole_seconds(visit.weight)) {
                        registration = Err(err);
                        return Visit::Stop;
                    }
                }
                Visit::Continue
            })?;
            registration?;

            walks.push(best_walk.map(whole_seconds));
            egress.push(walk);
        }

        let succeeded = search.run()?;
        debug!(
            destinations = request.destinations.len(),
            access_vertices = access.settled_count(),
            transit = succeeded,
            walkable = walks.iter().filter(|w| w.is_some()).count(),
            "plan finished"
        );

        Ok(Plan {
            departure,
            transfer_penalty: self.config.transfer_penalty_secs,
            access,
            egress,
            walks,
            search,
        })
    }
}

/// Round a walking cost up to whole seconds.
fn whole_seconds(weight: f32) -> Seconds {
    weight.max(0.0).ceil() as Seconds
}

/// The finished searches of one request.
pub struct Plan<'a, C, T, G, P>
where
    C: ConnectionStore + ?Sized,
    T: TransferStore + ?Sized,
    G: StreetGraph + ?Sized,
    P: TravelProfile + ?Sized,
{
    departure: Seconds,
    transfer_penalty: Seconds,
    access: WalkSearch<'a, G, P>,
    egress: Vec<WalkSearch<'a, G, P>>,
    /// Pure-walk duration per destination.
    walks: Vec<Option<Seconds>>,
    search: ProfileSearch<'a, C, T>,
}

impl<'a, C, T, G, P> Plan<'a, C, T, G, P>
where
    C: ConnectionStore + ?Sized,
    T: TransferStore + ?Sized,
    G: StreetGraph + ?Sized,
    P: TravelProfile + ?Sized,
{
    /// Absolute departure second.
    pub fn departure(&self) -> Seconds {
        self.departure
    }

    pub fn destination_count(&self) -> usize {
        self.walks.len()
    }

    pub fn transit_search(&self) -> &ProfileSearch<'a, C, T> {
        &self.search
    }

    pub fn access_search(&self) -> &WalkSearch<'a, G, P> {
        &self.access
    }

    pub fn egress_search(&self, destination: usize) -> Result<&WalkSearch<'a, G, P>, SearchError> {
        self.egress
            .get(destination)
            .ok_or(SearchError::UnknownDestination(destination))
    }

    /// Walking time straight to a destination, if within both budgets.
    pub fn walk_seconds(&self, destination: usize) -> Result<Option<Seconds>, SearchError> {
        self.walks
            .get(destination)
            .copied()
            .ok_or(SearchError::UnknownDestination(destination))
    }

    /// Every non-dominated way to a destination, best first.
    pub fn options(&self, destination: usize) -> Result<Vec<JourneyOption>, SearchError> {
        let walk = self.walk_seconds(destination)?;

        let mut options = Vec::new();
        if self.search.has_succeeded() {
            for (transfers, arrival) in self.search.arrivals(destination)?.iter() {
                options.push(JourneyOption::transit(transfers, arrival.seconds));
            }
        }
        if let Some(walk) = walk {
            options.push(JourneyOption::walk(self.departure.saturating_add(walk)));
        }

        Ok(rank_options(
            remove_dominated(options),
            self.departure,
            self.transfer_penalty,
        ))
    }

    /// The best way to a destination, or `None` when it is unreachable.
    pub fn best(&self, destination: usize) -> Result<Option<JourneyOption>, SearchError> {
        Ok(self.options(destination)?.into_iter().next())
    }

    pub fn best_combination(&self, destination: usize) -> Result<Option<Combination>, SearchError> {
        Ok(self.best(destination)?.map(|option| Combination {
            transfers: option.transfers(),
            is_transit: option.is_transit(),
            arrival: option.arrival,
        }))
    }

    /// The best journey to a destination with its itinerary.
    pub fn journey(&self, destination: usize) -> Result<Option<PlannedJourney>, SearchError> {
        let Some(option) = self.best(destination)? else {
            return Ok(None);
        };
        let itinerary = match option.kind {
            OptionKind::Transit { transfers } => self.search.itinerary(destination, transfers)?,
            OptionKind::Walk => None,
        };
        Ok(Some(PlannedJourney {
            option,
            departure: self.departure,
            itinerary,
        }))
    }
}
