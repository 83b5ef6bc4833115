//! Locations snapped onto the street graph.

use serde::{Deserialize, Serialize};

use crate::domain::{EdgeId, SearchError, VertexId};
use crate::network::{StreetGraph, TravelProfile};

use super::search::Direction;

/// A location on the street graph, either exactly at a vertex or part way
/// along an edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RouterPoint {
    Vertex {
        vertex: VertexId,
    },
    /// `offset` is the fraction of the edge from its `from` vertex, in `[0, 1]`.
    OnEdge {
        edge: EdgeId,
        offset: f32,
    },
}

impl RouterPoint {
    pub fn at_vertex(vertex: VertexId) -> Self {
        RouterPoint::Vertex { vertex }
    }

    /// A point along an edge. The offset is clamped to `[0, 1]`.
    pub fn on_edge(edge: EdgeId, offset: f32) -> Self {
        RouterPoint::OnEdge {
            edge,
            offset: offset.clamp(0.0, 1.0),
        }
    }

    /// Weighted walk-search sources for this point.
    ///
    /// For a forward search the weights are the cost of walking from the
    /// point to each endpoint; for a backward search, from each endpoint to
    /// the point. An endpoint the profile does not allow reaching is left
    /// out, so the result may be empty.
    pub fn sources<G, P>(
        &self,
        graph: &G,
        profile: &P,
        direction: Direction,
    ) -> Result<Vec<(VertexId, f32)>, SearchError>
    where
        G: StreetGraph + ?Sized,
        P: TravelProfile + ?Sized,
    {
        let (edge_id, offset) = match *self {
            RouterPoint::Vertex { vertex } => {
                if vertex.index() >= graph.vertex_count() {
                    return Err(SearchError::UnknownVertex(vertex));
                }
                return Ok(vec![(vertex, 0.0)]);
            }
            RouterPoint::OnEdge { edge, offset } => (edge, offset.clamp(0.0, 1.0)),
        };

        let edge = graph.edge(edge_id).ok_or(SearchError::UnknownEdge(edge_id))?;
        let factor = profile.factor(edge.edge_type);

        // Heading to `from` goes against the stored direction when walking
        // forward; a backward search mirrors that.
        let forward = direction == Direction::Forward;
        let candidates = [
            (edge.from, offset * edge.length, !forward),
            (edge.to, (1.0 - offset) * edge.length, forward),
        ];

        let mut sources: Vec<(VertexId, f32)> = Vec::with_capacity(2);
        for (vertex, meters, along_edge) in candidates {
            if !factor.allows(along_edge) {
                continue;
            }
            let weight = meters * factor.cost_per_meter;
            match sources.iter_mut().find(|(v, _)| *v == vertex) {
                Some(existing) => existing.1 = existing.1.min(weight),
                None => sources.push((vertex, weight)),
            }
        }
        Ok(sources)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::EdgeType;
    use crate::network::{SpeedProfile, StreetNetwork, Traversal};

    fn graph(traversal: Traversal) -> (StreetNetwork, SpeedProfile) {
        let mut g = StreetNetwork::new(2);
        g.add_edge(VertexId(0), VertexId(1), 100.0, EdgeType(0));
        let p = SpeedProfile::new().with_speed(EdgeType(0), 1.0, traversal);
        (g, p)
    }

    #[test]
    fn vertex_point_is_a_zero_cost_source() {
        let (g, p) = graph(Traversal::Both);
        let point = RouterPoint::at_vertex(VertexId(1));
        assert_eq!(
            point.sources(&g, &p, Direction::Forward).unwrap(),
            vec![(VertexId(1), 0.0)]
        );
        assert_eq!(
            RouterPoint::at_vertex(VertexId(9)).sources(&g, &p, Direction::Forward),
            Err(SearchError::UnknownVertex(VertexId(9)))
        );
    }

    #[test]
    fn edge_point_splits_length() {
        let (g, p) = graph(Traversal::Both);
        let point = RouterPoint::on_edge(EdgeId(0), 0.25);
        assert_eq!(
            point.sources(&g, &p, Direction::Forward).unwrap(),
            vec![(VertexId(0), 25.0), (VertexId(1), 75.0)]
        );
    }

    #[test]
    fn oneway_edge_limits_endpoints() {
        let (g, p) = graph(Traversal::Forward);
        let point = RouterPoint::on_edge(EdgeId(0), 0.5);

        // Leaving the point, only the `to` end is reachable.
        assert_eq!(
            point.sources(&g, &p, Direction::Forward).unwrap(),
            vec![(VertexId(1), 50.0)]
        );
        // Arriving at the point, only from the `from` end.
        assert_eq!(
            point.sources(&g, &p, Direction::Backward).unwrap(),
            vec![(VertexId(0), 50.0)]
        );
    }

    #[test]
    fn blocked_edge_has_no_sources() {
        let (g, p) = graph(Traversal::None);
        let point = RouterPoint::on_edge(EdgeId(0), 0.5);
        assert!(point.sources(&g, &p, Direction::Forward).unwrap().is_empty());
    }

    #[test]
    fn unknown_edge_is_an_error() {
        let (g, p) = graph(Traversal::Both);
        let point = RouterPoint::on_edge(EdgeId(4), 0.5);
        assert_eq!(
            point.sources(&g, &p, Direction::Forward),
            Err(SearchError::UnknownEdge(EdgeId(4)))
        );
    }

    #[test]
    fn offset_is_clamped() {
        assert_eq!(
            RouterPoint::on_edge(EdgeId(0), 3.0),
            RouterPoint::OnEdge {
                edge: EdgeId(0),
                offset: 1.0
            }
        );
    }

    #[test]
    fn deserializes_both_shapes() {
        let v: RouterPoint = serde_json::from_str(r#"{"vertex":3}"#).unwrap();
        assert_eq!(v, RouterPoint::at_vertex(VertexId(3)));
        let e: RouterPoint = serde_json::from_str(r#"{"edge":2,"offset":0.5}"#).unwrap();
        assert_eq!(e, RouterPoint::on_edge(EdgeId(2), 0.5));
    }
}
