//! Street graph used for access, egress and walk-only legs.
//!
//! The graph stores undirected edges once, with a direction of storage
//! (`from` → `to`). Whether an edge may be used in a given direction, and at
//! what cost, is decided by a [`TravelProfile`] looking only at the edge's
//! type.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::domain::{EdgeId, EdgeType, StopId, VertexId};

/// Directions in which an edge may be traversed, relative to its storage
/// direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Traversal {
    #[default]
    Both,
    Forward,
    Backward,
    None,
}

/// Travel cost of an edge type for one travel profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Factor {
    /// Seconds needed per meter of edge length.
    pub cost_per_meter: f32,
    pub traversal: Traversal,
}

impl Factor {
    /// A factor that forbids the edge entirely.
    pub const BLOCKED: Factor = Factor {
        cost_per_meter: 0.0,
        traversal: Traversal::None,
    };

    /// Build a factor from a travel speed in meters per second.
    pub fn from_speed(meters_per_second: f32, traversal: Traversal) -> Self {
        if meters_per_second <= 0.0 {
            return Self::BLOCKED;
        }
        Self {
            cost_per_meter: 1.0 / meters_per_second,
            traversal,
        }
    }

    /// Whether the edge may be travelled along (`true`) or against (`false`)
    /// its storage direction.
    pub fn allows(&self, along_edge: bool) -> bool {
        match self.traversal {
            Traversal::Both => true,
            Traversal::Forward => along_edge,
            Traversal::Backward => !along_edge,
            Traversal::None => false,
        }
    }
}

/// Per-edge-type cost lookup for one travel mode.
///
/// Implementations may be expensive; searches cache results per edge type
/// for the duration of a run.
pub trait TravelProfile {
    fn factor(&self, edge_type: EdgeType) -> Factor;
}

/// A travel profile defined by a speed per edge type.
///
/// Edge types without a configured speed are not traversable.
#[derive(Debug, Clone, Default)]
pub struct SpeedProfile {
    factors: HashMap<EdgeType, Factor>,
}

impl SpeedProfile {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure the speed of an edge type.
    pub fn with_speed(mut self, edge_type: EdgeType, meters_per_second: f32, traversal: Traversal) -> Self {
        self.set_speed(edge_type, meters_per_second, traversal);
        self
    }

    /// Configure the speed of an edge type in place.
    pub fn set_speed(&mut self, edge_type: EdgeType, meters_per_second: f32, traversal: Traversal) {
        self.factors
            .insert(edge_type, Factor::from_speed(meters_per_second, traversal));
    }
}

impl TravelProfile for SpeedProfile {
    fn factor(&self, edge_type: EdgeType) -> Factor {
        self.factors
            .get(&edge_type)
            .copied()
            .unwrap_or(Factor::BLOCKED)
    }
}

/// An edge as stored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeData {
    pub from: VertexId,
    pub to: VertexId,
    /// Length in meters.
    pub length: f32,
    pub edge_type: EdgeType,
}

/// An edge as seen from one of its endpoints.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeRef {
    pub id: EdgeId,
    pub neighbor: VertexId,
    pub length: f32,
    pub edge_type: EdgeType,
    /// True when the viewing vertex is the edge's `from` vertex.
    pub forward: bool,
}

/// Read access to the street graph.
pub trait StreetGraph {
    fn vertex_count(&self) -> usize;

    fn edge(&self, id: EdgeId) -> Option<&EdgeData>;

    /// Edges incident to `vertex`, each viewed from `vertex`.
    fn edges_of(&self, vertex: VertexId) -> &[EdgeRef];
}

/// In-memory street graph with adjacency lists.
#[derive(Debug, Clone, Default)]
pub struct StreetNetwork {
    edges: Vec<EdgeData>,
    adjacency: Vec<Vec<EdgeRef>>,
}

impl StreetNetwork {
    /// Create a graph with `vertex_count` isolated vertices.
    pub fn new(vertex_count: usize) -> Self {
        Self {
            edges: Vec::new(),
            adjacency: vec![Vec::new(); vertex_count],
        }
    }

    /// Add an edge, growing the vertex set if needed.
    pub fn add_edge(&mut self, from: VertexId, to: VertexId, length: f32, edge_type: EdgeType) -> EdgeId {
        let id = EdgeId(self.edges.len() as u32);
        let needed = from.index().max(to.index()) + 1;
        if self.adjacency.len() < needed {
            self.adjacency.resize(needed, Vec::new());
        }

        self.edges.push(EdgeData {
            from,
            to,
            length,
            edge_type,
        });
        self.adjacency[from.index()].push(EdgeRef {
            id,
            neighbor: to,
            length,
            edge_type,
            forward: true,
        });
        if from != to {
            self.adjacency[to.index()].push(EdgeRef {
                id,
                neighbor: from,
                length,
                edge_type,
                forward: false,
            });
        }
        id
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

impl StreetGraph for StreetNetwork {
    fn vertex_count(&self) -> usize {
        self.adjacency.len()
    }

    fn edge(&self, id: EdgeId) -> Option<&EdgeData> {
        self.edges.get(id.index())
    }

    fn edges_of(&self, vertex: VertexId) -> &[EdgeRef] {
        self.adjacency
            .get(vertex.index())
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }
}

/// Links between street vertices and the transit stops reachable there.
#[derive(Debug, Clone, Default)]
pub struct StopLinks {
    stops_at: HashMap<VertexId, Vec<StopId>>,
}

impl StopLinks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Link a stop to a street vertex.
    pub fn link(&mut self, vertex: VertexId, stop: StopId) {
        let stops = self.stops_at.entry(vertex).or_default();
        if !stops.contains(&stop) {
            stops.push(stop);
        }
    }

    /// Stops linked to a vertex.
    pub fn stops_at(&self, vertex: VertexId) -> &[StopId] {
        self.stops_at
            .get(&vertex)
            .map(|v| v.as_slice())
            .unwrap_or(&[])
    }

    /// Number of linked vertices.
    pub fn len(&self) -> usize {
        self.stops_at.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops_at.is_empty()
    }
}
