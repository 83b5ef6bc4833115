//! Data transfer objects for web requests and responses.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::{Seconds, StopId, TripId, to_datetime};
use crate::network::Network;
use crate::planner::{OptionKind, PlannedJourney};
use crate::profile::Leg;
use crate::walk::RouterPoint;

/// Request to plan journeys from one origin to several destinations.
#[derive(Debug, Deserialize)]
pub struct PlanJourneyRequest {
    /// Where the journey starts
    pub origin: RouterPoint,

    /// Places to plan to, answered in the same order
    pub destinations: Vec<RouterPoint>,

    /// Local departure time, e.g. "2024-03-15T08:00:00"
    pub departure: NaiveDateTime,
}

/// Response for journey planning.
#[derive(Debug, Serialize)]
pub struct PlanJourneyResponse {
    /// Departure time from the origin
    pub departure: NaiveDateTime,

    /// One entry per requested destination
    pub destinations: Vec<DestinationResult>,
}

/// The best journey to one destination.
#[derive(Debug, Serialize)]
pub struct DestinationResult {
    /// Position of the destination in the request
    pub index: usize,

    /// Whether the destination can be reached at all
    pub reachable: bool,

    /// How the best journey gets there
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<JourneyKind>,

    /// Arrival time at the destination
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arrival: Option<NaiveDateTime>,

    /// Total duration in seconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_secs: Option<Seconds>,

    /// Number of changes between vehicles
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfers: Option<usize>,

    /// Journey legs in travel order
    pub legs: Vec<LegResult>,
}

/// Whether a journey rides transit or walks the whole way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum JourneyKind {
    Transit,
    Walk,
}

/// A leg of a journey.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LegResult {
    Walk(WalkResult),
    Transit(TransitResult),
    Transfer(TransferResult),
}

/// A walk along the streets.
#[derive(Debug, Serialize)]
pub struct WalkResult {
    pub from: PlaceResult,
    pub to: PlaceResult,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
    pub duration_secs: Seconds,
}

/// A ride on one trip.
#[derive(Debug, Serialize)]
pub struct TransitResult {
    /// Trip identifier
    pub trip: TripId,

    /// Stop the trip is boarded at
    pub board: StopResult,

    /// Stop the trip is left at
    pub alight: StopResult,

    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

/// A footpath between two stops.
#[derive(Debug, Serialize)]
pub struct TransferResult {
    pub from: StopResult,
    pub to: StopResult,
    pub departure: NaiveDateTime,
    pub arrival: NaiveDateTime,
}

/// One end of a walk.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum PlaceResult {
    Origin,
    Destination,
    Stop(StopResult),
}

/// Stop information for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StopResult {
    /// Stop identifier
    pub id: StopId,

    /// Stop name (empty if the network has none)
    pub name: String,
}

/// Response listing every stop in the network.
#[derive(Debug, Serialize)]
pub struct StopsResponse {
    pub stops: Vec<StopResult>,
}

/// Error response.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error message
    pub error: String,
}

// Conversion implementations

impl StopResult {
    /// Look up a stop's display name in the network.
    pub fn from_stop(stop: StopId, network: &Network) -> Self {
        Self {
            id: stop,
            name: network.stop_name(stop).unwrap_or_default().to_string(),
        }
    }
}

impl DestinationResult {
    /// A destination no journey reaches.
    pub fn unreachable(index: usize) -> Self {
        Self {
            index,
            reachable: false,
            kind: None,
            arrival: None,
            duration_secs: None,
            transfers: None,
            legs: Vec::new(),
        }
    }

    /// Create from a planned journey. Times are absolute seconds from the
    /// start of `date`.
    pub fn from_journey(
        index: usize,
        journey: &PlannedJourney,
        date: NaiveDate,
        network: &Network,
    ) -> Self {
        let at = |seconds: Seconds| to_datetime(date, seconds);
        let option = journey.option;

        let mut legs = Vec::new();
        let kind = match (option.kind, &journey.itinerary) {
            (OptionKind::Transit { .. }, Some(itinerary)) => {
                if itinerary.start > journey.departure {
                    legs.push(LegResult::Walk(WalkResult {
                        from: PlaceResult::Origin,
                        to: PlaceResult::Stop(StopResult::from_stop(itinerary.origin, network)),
                        departure: at(journey.departure),
                        arrival: at(itinerary.start),
                        duration_secs: itinerary.start - journey.departure,
                    }));
                }
                legs.extend(itinerary.legs.iter().map(|leg| LegResult::from_leg(leg, date, network)));
                if itinerary.egress > 0 {
                    let leave = itinerary.arrival.saturating_sub(itinerary.egress);
                    legs.push(LegResult::Walk(WalkResult {
                        from: PlaceResult::Stop(StopResult::from_stop(itinerary.target, network)),
                        to: PlaceResult::Destination,
                        departure: at(leave),
                        arrival: at(itinerary.arrival),
                        duration_secs: itinerary.egress,
                    }));
                }
                JourneyKind::Transit
            }
            (OptionKind::Transit { .. }, None) => JourneyKind::Transit,
            (OptionKind::Walk, _) => {
                legs.push(LegResult::Walk(WalkResult {
                    from: PlaceResult::Origin,
                    to: PlaceResult::Destination,
                    departure: at(journey.departure),
                    arrival: at(option.arrival),
                    duration_secs: option.arrival.saturating_sub(journey.departure),
                }));
                JourneyKind::Walk
            }
        };

        Self {
            index,
            reachable: true,
            kind: Some(kind),
            arrival: Some(at(option.arrival)),
            duration_secs: Some(option.arrival.saturating_sub(journey.departure)),
            transfers: Some(option.transfers()),
            legs,
        }
    }
}

impl LegResult {
    /// Create from a stop-to-stop leg.
    pub fn from_leg(leg: &Leg, date: NaiveDate, network: &Network) -> Self {
        match *leg {
            Leg::Transit {
                trip,
                board,
                departure,
                alight,
                arrival,
                ..
            } => LegResult::Transit(TransitResult {
                trip,
                board: StopResult::from_stop(board, network),
                alight: StopResult::from_stop(alight, network),
                departure: to_datetime(date, departure),
                arrival: to_datetime(date, arrival),
            }),
            Leg::Transfer {
                from,
                to,
                departure,
                arrival,
            } => LegResult::Transfer(TransferResult {
                from: StopResult::from_stop(from, network),
                to: StopResult::from_stop(to, network),
                departure: to_datetime(date, departure),
                arrival: to_datetime(date, arrival),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::planner::JourneyOption;
    use crate::profile::Itinerary;

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, 15).unwrap()
    }

    fn network() -> Network {
        Network::from_json(
            r#"{"stops": [{"id": 0, "name": "Quay"}, {"id": 1, "name": "Castle"}]}"#,
        )
        .unwrap()
    }

    #[test]
    fn transit_journey_has_walks_on_both_ends() {
        let journey = PlannedJourney {
            option: JourneyOption::transit(0, 29_500),
            departure: 28_800,
            itinerary: Some(Itinerary {
                origin: StopId(0),
                start: 28_900,
                legs: vec![Leg::Transit {
                    trip: TripId(1),
                    day: 0,
                    board: StopId(0),
                    departure: 29_100,
                    alight: StopId(1),
                    arrival: 29_400,
                }],
                target: StopId(1),
                egress: 100,
                arrival: 29_500,
                transfers: 0,
            }),
        };

        let result = DestinationResult::from_journey(0, &journey, date(), &network());

        assert!(result.reachable);
        assert_eq!(result.kind, Some(JourneyKind::Transit));
        assert_eq!(result.duration_secs, Some(700));
        assert_eq!(result.legs.len(), 3);
        match &result.legs[1] {
            LegResult::Transit(ride) => {
                assert_eq!(ride.board.name, "Quay");
                assert_eq!(ride.alight.name, "Castle");
                assert_eq!(ride.departure, date().and_hms_opt(8, 5, 0).unwrap());
            }
            other => panic!("expected a ride, got {other:?}"),
        }
        match &result.legs[2] {
            LegResult::Walk(walk) => {
                assert_eq!(walk.departure, date().and_hms_opt(8, 10, 0).unwrap());
                assert_eq!(walk.duration_secs, 100);
            }
            other => panic!("expected a walk, got {other:?}"),
        }
    }

    #[test]
    fn walk_journey_is_one_leg() {
        let journey = PlannedJourney {
            option: JourneyOption::walk(29_000),
            departure: 28_800,
            itinerary: None,
        };

        let result = DestinationResult::from_journey(2, &journey, date(), &network());

        assert_eq!(result.kind, Some(JourneyKind::Walk));
        assert_eq!(result.transfers, Some(0));
        assert_eq!(result.legs.len(), 1);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["legs"][0]["type"], "walk");
        assert_eq!(json["legs"][0]["from"]["type"], "origin");
        assert_eq!(json["arrival"], "2024-03-15T08:03:20");
    }

    #[test]
    fn times_past_midnight_roll_the_date() {
        let leg = Leg::Transfer {
            from: StopId(0),
            to: StopId(1),
            departure: 86_300,
            arrival: 86_500,
        };
        match LegResult::from_leg(&leg, date(), &network()) {
            LegResult::Transfer(walk) => {
                assert_eq!(
                    walk.arrival,
                    NaiveDate::from_ymd_opt(2024, 3, 16)
                        .unwrap()
                        .and_hms_opt(0, 1, 40)
                        .unwrap()
                );
            }
            other => panic!("expected a transfer, got {other:?}"),
        }
    }

    #[test]
    fn unreachable_serializes_without_answer_fields() {
        let json = serde_json::to_value(DestinationResult::unreachable(1)).unwrap();
        assert_eq!(json["reachable"], false);
        assert!(json.get("arrival").is_none());
        assert_eq!(json["legs"], serde_json::json!([]));
    }

    #[test]
    fn unknown_stop_has_empty_name() {
        let stop = StopResult::from_stop(StopId(9), &network());
        assert_eq!(stop.name, "");
    }
}
