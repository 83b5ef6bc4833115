//! Multi-source label-setting search over the street graph.
//!
//! Dijkstra with a plain binary heap: labels are never decreased in place;
//! a vertex popped a second time is simply skipped because its first pop
//! already settled it.

use std::cmp::Ordering;
use std::collections::{BinaryHeap, HashMap};

use tracing::debug;

use crate::domain::{EdgeId, EdgeType, SearchError, VertexId};
use crate::network::{Factor, StreetGraph, TravelProfile};

/// Direction of travel of a walk search.
///
/// A backward search starts at a destination and finds, for every vertex,
/// the cost of walking *from* that vertex *to* the destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

/// Return value of the settlement callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visit {
    Continue,
    Stop,
}

/// The settled label of one vertex.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DykstraVisit {
    pub vertex: VertexId,
    /// Vertex this label was reached from; `None` for a source.
    pub previous: Option<VertexId>,
    /// Cumulative cost in seconds.
    pub weight: f32,
    /// Edge used to reach the vertex; `None` for a source.
    pub edge: Option<EdgeId>,
}

/// Heap entry ordered so that `BinaryHeap` pops the lowest weight first.
#[derive(Debug, Clone, Copy)]
struct Label(DykstraVisit);

impl Ord for Label {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .0
            .weight
            .total_cmp(&self.0.weight)
            .then_with(|| other.0.vertex.cmp(&self.0.vertex))
    }
}

impl PartialOrd for Label {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Label {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Label {}

/// A single-use walk search.
pub struct WalkSearch<'a, G: StreetGraph + ?Sized, P: TravelProfile + ?Sized> {
    graph: &'a G,
    profile: &'a P,
    sources: Vec<(VertexId, f32)>,
    budget: f32,
    direction: Direction,

    visits: HashMap<VertexId, DykstraVisit>,

    /// Edge factors looked up during this run, by edge type.
    factors: HashMap<EdgeType, Factor>,

    has_run: bool,
}

impl<'a, G: StreetGraph + ?Sized, P: TravelProfile + ?Sized> WalkSearch<'a, G, P> {
    /// Create a search from weighted sources.
    ///
    /// `budget` is the exclusive upper bound on cumulative cost.
    pub fn new(
        graph: &'a G,
        profile: &'a P,
        sources: Vec<(VertexId, f32)>,
        budget: f32,
        direction: Direction,
    ) -> Self {
        Self {
            graph,
            profile,
            sources,
            budget,
            direction,
            visits: HashMap::new(),
            factors: HashMap::new(),
            has_run: false,
        }
    }

    /// Run the search, invoking `on_settled` once per settled vertex in
    /// non-decreasing cost order. Returning [`Visit::Stop`] ends the search.
    pub fn run<F>(&mut self, mut on_settled: F) -> Result<(), SearchError>
    where
        F: FnMut(&DykstraVisit) -> Visit,
    {
        if self.has_run {
            return Err(SearchError::AlreadyRun);
        }
        self.has_run = true;

        let graph = self.graph;
        let forward = self.direction == Direction::Forward;

        let mut heap: BinaryHeap<Label> = self
            .sources
            .iter()
            .filter(|(_, weight)| *weight < self.budget)
            .map(|&(vertex, weight)| {
                Label(DykstraVisit {
                    vertex,
                    previous: None,
                    weight,
                    edge: None,
                })
            })
            .collect();

        while let Some(Label(visit)) = heap.pop() {
            if self.visits.contains_key(&visit.vertex) {
                continue;
            }
            self.visits.insert(visit.vertex, visit);

            if on_settled(&visit) == Visit::Stop {
                debug!(
                    settled = self.visits.len(),
                    vertex = %visit.vertex,
                    "walk search stopped by callback"
                );
                return Ok(());
            }

            for edge in graph.edges_of(visit.vertex) {
                if Some(edge.neighbor) == visit.previous {
                    continue;
                }
                if self.visits.contains_key(&edge.neighbor) {
                    continue;
                }

                let factor = self.factor(edge.edge_type);
                if !factor.allows(edge.forward == forward) {
                    continue;
                }

                let weight = visit.weight + edge.length * factor.cost_per_meter;
                if weight >= self.budget {
                    continue;
                }

                heap.push(Label(DykstraVisit {
                    vertex: edge.neighbor,
                    previous: Some(visit.vertex),
                    weight,
                    edge: Some(edge.id),
                }));
            }
        }

        debug!(
            settled = self.visits.len(),
            edge_types = self.factors.len(),
            direction = ?self.direction,
            "walk search exhausted"
        );

        Ok(())
    }

    /// Run the search to exhaustion without a callback.
    pub fn run_to_completion(&mut self) -> Result<(), SearchError> {
        self.run(|_| Visit::Continue)
    }

    fn factor(&mut self, edge_type: EdgeType) -> Factor {
        let profile = self.profile;
        *self
            .factors
            .entry(edge_type)
            .or_insert_with(|| profile.factor(edge_type))
    }

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn budget(&self) -> f32 {
        self.budget
    }

    /// The settled label of a vertex.
    pub fn visit(&self, vertex: VertexId) -> Option<&DykstraVisit> {
        self.visits.get(&vertex)
    }

    /// The settled cost of a vertex.
    pub fn weight(&self, vertex: VertexId) -> Option<f32> {
        self.visits.get(&vertex).map(|v| v.weight)
    }

    /// All settled labels, in no particular order.
    pub fn visits(&self) -> impl Iterator<Item = &DykstraVisit> {
        self.visits.values()
    }

    pub fn settled_count(&self) -> usize {
        self.visits.len()
    }

    /// Number of distinct edge types whose factor was looked up.
    pub fn cached_factor_count(&self) -> usize {
        self.factors.len()
    }

    /// Vertices from a source to `vertex`, in search order.
    ///
    /// For a backward search the result runs from the destination outwards,
    /// i.e. reversed travel order.
    pub fn path_to(&self, vertex: VertexId) -> Result<Vec<VertexId>, SearchError> {
        if !self.has_run {
            return Err(SearchError::NotRun);
        }
        if !self.visits.contains_key(&vertex) {
            return Err(SearchError::UnsettledVertex(vertex));
        }

        let mut path = Vec::new();
        let mut current = Some(vertex);
        while let Some(v) = current {
            let visit = self.visits.get(&v).ok_or_else(|| {
                SearchError::DataIntegrity(format!("vertex {v} is not settled"))
            })?;
            path.push(v);
            if path.len() > self.visits.len() {
                return Err(SearchError::DataIntegrity(format!(
                    "predecessor chain of {vertex} does not end at a source"
                )));
            }
            current = visit.previous;
        }
        path.reverse();
        Ok(path)
    }
}
