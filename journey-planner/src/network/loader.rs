//! Loading a complete network from a JSON document.

use std::collections::{BTreeMap, HashSet};
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::domain::{
    Connection, EdgeType, Seconds, StopId, TimeError, TripId, VertexId, parse_clock,
};

use super::calendar::TripCalendar;
use super::connections::ConnectionTable;
use super::streets::{SpeedProfile, StopLinks, StreetGraph, StreetNetwork, Traversal};
use super::transfers::TransferTable;

/// Errors that can occur when loading a network file.
#[derive(Debug, thiserror::Error)]
pub enum NetworkError {
    /// Reading the file failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not valid JSON or does not match the schema
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    /// A clock string could not be parsed
    #[error("{context}: {source}")]
    InvalidTime {
        context: String,
        #[source]
        source: TimeError,
    },

    /// A connection arrives before it departs
    #[error("trip {trip} arrives at {arrival} before departing at {departure}")]
    ArrivalBeforeDeparture {
        trip: TripId,
        departure: String,
        arrival: String,
    },

    /// A record references a stop that is not declared
    #[error("unknown stop {0}")]
    UnknownStop(StopId),

    /// A record references a vertex outside the street graph
    #[error("unknown vertex {0}")]
    UnknownVertex(VertexId),
}

/// A declared stop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StopRecord {
    pub id: StopId,
    pub name: String,
    /// Street vertices from which the stop can be entered.
    #[serde(default)]
    pub vertices: Vec<VertexId>,
}

#[derive(Debug, Clone, Deserialize)]
struct TripRecord {
    id: TripId,
    #[serde(default)]
    calendar: Option<TripCalendar>,
}

#[derive(Debug, Clone, Deserialize)]
struct ConnectionRecord {
    trip: TripId,
    from: StopId,
    departure: String,
    to: StopId,
    arrival: String,
}

#[derive(Debug, Clone, Deserialize)]
struct TransferRecord {
    from: StopId,
    to: StopId,
    seconds: Seconds,
    #[serde(default)]
    oneway: bool,
}

#[derive(Debug, Clone, Deserialize)]
struct EdgeTypeRecord {
    id: EdgeType,
    /// Walking speed in meters per second.
    speed: f32,
    #[serde(default)]
    traversal: Traversal,
}

#[derive(Debug, Clone, Deserialize)]
struct EdgeRecord {
    from: VertexId,
    to: VertexId,
    length: f32,
    #[serde(rename = "type")]
    edge_type: EdgeType,
}

#[derive(Debug, Clone, Default, Deserialize)]
struct StreetsRecord {
    #[serde(default)]
    vertices: usize,
    #[serde(default)]
    edge_types: Vec<EdgeTypeRecord>,
    #[serde(default)]
    edges: Vec<EdgeRecord>,
}

#[derive(Debug, Clone, Deserialize)]
struct NetworkFile {
    stops: Vec<StopRecord>,
    #[serde(default)]
    trips: Vec<TripRecord>,
    #[serde(default)]
    connections: Vec<ConnectionRecord>,
    #[serde(default)]
    transfers: Vec<TransferRecord>,
    #[serde(default)]
    streets: StreetsRecord,
}

/// Everything the planner needs to answer queries.
#[derive(Debug, Clone, Default)]
pub struct Network {
    pub stops: BTreeMap<StopId, StopRecord>,
    pub connections: ConnectionTable,
    pub transfers: TransferTable,
    pub streets: StreetNetwork,
    pub links: StopLinks,
    pub profile: SpeedProfile,
}

impl Network {
    /// Read a network from a JSON file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, NetworkError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let network = Self::from_json(&text)?;
        info!(
            path = %path.display(),
            stops = network.stops.len(),
            connections = network.connections.connections().len(),
            transfers = network.transfers.len(),
            "loaded network"
        );
        Ok(network)
    }

    /// Parse a network from a JSON string.
    pub fn from_json(text: &str) -> Result<Self, NetworkError> {
        let file: NetworkFile = serde_json::from_str(text)?;
        Self::from_file(file)
    }

    fn from_file(file: NetworkFile) -> Result<Self, NetworkError> {
        let mut streets = StreetNetwork::new(file.streets.vertices);
        for edge in &file.streets.edges {
            for vertex in [edge.from, edge.to] {
                if vertex.index() >= file.streets.vertices {
                    return Err(NetworkError::UnknownVertex(vertex));
                }
            }
            streets.add_edge(edge.from, edge.to, edge.length, edge.edge_type);
        }

        let mut profile = SpeedProfile::new();
        for edge_type in &file.streets.edge_types {
            profile.set_speed(edge_type.id, edge_type.speed, edge_type.traversal);
        }

        let mut links = StopLinks::new();
        let mut stops = BTreeMap::new();
        for stop in file.stops {
            for &vertex in &stop.vertices {
                if vertex.index() >= streets.vertex_count() {
                    return Err(NetworkError::UnknownVertex(vertex));
                }
                links.link(vertex, stop.id);
            }
            stops.insert(stop.id, stop);
        }
        let known = |stop: StopId| -> Result<StopId, NetworkError> {
            if stops.contains_key(&stop) {
                Ok(stop)
            } else {
                Err(NetworkError::UnknownStop(stop))
            }
        };

        let mut connections = Vec::with_capacity(file.connections.len());
        for record in &file.connections {
            let departure = clock(&record.departure, record.trip, "departure")?;
            let arrival = clock(&record.arrival, record.trip, "arrival")?;
            if arrival < departure {
                return Err(NetworkError::ArrivalBeforeDeparture {
                    trip: record.trip,
                    departure: record.departure.clone(),
                    arrival: record.arrival.clone(),
                });
            }
            connections.push(Connection::new(
                record.trip,
                known(record.from)?,
                departure,
                known(record.to)?,
                arrival,
            ));
        }

        let mut transfers = TransferTable::new();
        for record in &file.transfers {
            let (from, to) = (known(record.from)?, known(record.to)?);
            if record.oneway {
                transfers.add_directed(from, to, record.seconds);
            } else {
                transfers.add(from, to, record.seconds);
            }
        }

        let trips_with_connections: HashSet<TripId> =
            connections.iter().map(|c| c.trip).collect();
        let mut table = ConnectionTable::new(connections);
        for trip in file.trips {
            if !trips_with_connections.contains(&trip.id) {
                continue;
            }
            if let Some(calendar) = trip.calendar {
                table.set_calendar(trip.id, calendar);
            }
        }

        Ok(Self {
            stops,
            connections: table,
            transfers,
            streets,
            links,
            profile,
        })
    }

    /// The display name of a stop.
    pub fn stop_name(&self, stop: StopId) -> Option<&str> {
        self.stops.get(&stop).map(|s| s.name.as_str())
    }
}

fn clock(value: &str, trip: TripId, field: &str) -> Result<Seconds, NetworkError> {
    parse_clock(value).map_err(|source| NetworkError::InvalidTime {
        context: format!("trip {trip} {field} {value:?}"),
        source,
    })
}
