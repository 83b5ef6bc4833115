//! Turning an end-to-end arrival back into the rides and walks behind it.

use serde::Serialize;

use crate::domain::{
    Connection, ConnectionId, SECONDS_PER_DAY, SearchError, Seconds, StopId, TripId, TripKey,
    service_seconds,
};
use crate::network::{ConnectionCursor, ConnectionStore, TransferStore};

use super::frontier::{Provenance, StopProfile};
use super::search::ProfileSearch;

/// One leg between two stops.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Leg {
    Transit {
        trip: TripId,
        /// Service day of the trip, counted from the search date.
        day: i32,
        board: StopId,
        departure: Seconds,
        alight: StopId,
        arrival: Seconds,
    },
    Transfer {
        from: StopId,
        to: StopId,
        departure: Seconds,
        arrival: Seconds,
    },
}

impl Leg {
    pub fn departure(&self) -> Seconds {
        match self {
            Leg::Transit { departure, .. } | Leg::Transfer { departure, .. } => *departure,
        }
    }

    pub fn arrival(&self) -> Seconds {
        match self {
            Leg::Transit { arrival, .. } | Leg::Transfer { arrival, .. } => *arrival,
        }
    }
}

/// The stop-to-stop part of a journey to one destination.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Itinerary {
    /// Source stop the journey starts at.
    pub origin: StopId,
    /// Absolute second the origin stop is reached.
    pub start: Seconds,
    pub legs: Vec<Leg>,
    /// Stop the destination is reached from.
    pub target: StopId,
    pub egress: Seconds,
    /// Absolute arrival second at the destination.
    pub arrival: Seconds,
    pub transfers: usize,
}

impl Itinerary {
    /// Number of vehicles ridden.
    pub fn transit_legs(&self) -> usize {
        self.legs
            .iter()
            .filter(|leg| matches!(leg, Leg::Transit { .. }))
            .count()
    }
}

impl<'a, C: ConnectionStore + ?Sized, T: TransferStore + ?Sized> ProfileSearch<'a, C, T> {
    /// Backtrack the journey behind `end_to_end_arrival(destination, transfers)`.
    ///
    /// Returns `Ok(None)` when no journey with that transfer count exists.
    pub fn itinerary(
        &self,
        destination: usize,
        transfers: usize,
    ) -> Result<Option<Itinerary>, SearchError> {
        let Some(arrival) = self.arrivals(destination)?.get(transfers).copied() else {
            return Ok(None);
        };

        // Every step either consumes a connection or a frontier entry.
        let mut budget = self.connections().len() + 2 * self.reached_stops().len() + 2;

        let mut legs = Vec::new();
        let mut stop = arrival.stop;
        let mut profile = arrival.profile;
        let mut index = transfers;

        loop {
            budget = budget.checked_sub(1).ok_or_else(|| {
                SearchError::DataIntegrity(format!("profile chain at {stop} does not end"))
            })?;

            match profile.provenance {
                Provenance::First => break,
                Provenance::ViaTransfer(from) => {
                    let seconds = self.transfers().seconds_between(from, stop).ok_or_else(|| {
                        SearchError::DataIntegrity(format!("no footpath from {from} to {stop}"))
                    })?;
                    let departure = profile.seconds.saturating_sub(seconds);
                    legs.push(Leg::Transfer {
                        from,
                        to: stop,
                        departure,
                        arrival: profile.seconds,
                    });

                    let limit = index.saturating_sub(1);
                    let (found, previous) = self
                        .stop_profiles(from)?
                        .iter()
                        .rev()
                        .find(|(i, p)| *i <= limit && p.seconds <= departure)
                        .map(|(i, p)| (i, *p))
                        .ok_or_else(|| {
                            SearchError::DataIntegrity(format!(
                                "footpath into {stop} has no entry at {from}"
                            ))
                        })?;
                    stop = from;
                    profile = previous;
                    index = found;
                }
                Provenance::ViaConnection(id) => {
                    let (leg, board, previous, found) =
                        self.backtrack_ride(id, stop, &profile, index, &mut budget)?;
                    legs.push(leg);
                    stop = board;
                    profile = previous;
                    index = found;
                }
            }
        }

        legs.reverse();
        Ok(Some(Itinerary {
            origin: stop,
            start: profile.seconds,
            legs,
            target: arrival.stop,
            egress: arrival.egress,
            arrival: arrival.seconds,
            transfers,
        }))
    }

    /// Walk back along the trip that alighted at `alight` until a stop where
    /// it could have been boarded.
    fn backtrack_ride(
        &self,
        id: ConnectionId,
        alight: StopId,
        profile: &StopProfile,
        index: usize,
        budget: &mut usize,
    ) -> Result<(Leg, StopId, StopProfile, usize), SearchError> {
        let store = self.connections();
        let last = store
            .get(id)
            .ok_or_else(|| SearchError::DataIntegrity(format!("connection {id} does not exist")))?;
        let offset = i64::from(profile.seconds) - i64::from(last.arrival);
        let day = i32::try_from(offset.div_euclid(i64::from(SECONDS_PER_DAY)))
            .ok()
            .filter(|_| offset.rem_euclid(i64::from(SECONDS_PER_DAY)) == 0)
            .ok_or_else(|| {
                SearchError::DataIntegrity(format!(
                    "arrival at {alight} does not match connection {id}"
                ))
            })?;
        let key = TripKey::new(last.trip, day);

        let mut cursor = ConnectionCursor::at(store, id);
        let mut current: Connection = *last;

        loop {
            let departure = service_seconds(day, current.departure).ok_or_else(|| {
                SearchError::DataIntegrity(format!(
                    "trip {} departs before the search date",
                    current.trip
                ))
            })?;
            let boarding = self
                .stop_profiles(current.departure_stop)
                .ok()
                .and_then(|frontier| {
                    frontier.iter().rev().find_map(|(i, p)| {
                        self.boarding_option(i, p, key, departure)
                            .filter(|o| !o.continues_trip && o.transfers <= index)
                            .map(|_| (i, *p))
                    })
                });

            if let Some((found, previous)) = boarding {
                let leg = Leg::Transit {
                    trip: key.trip,
                    day,
                    board: current.departure_stop,
                    departure,
                    alight,
                    arrival: profile.seconds,
                };
                return Ok((leg, current.departure_stop, previous, found));
            }

            current = self.previous_hop(&mut cursor, &current, budget)?;
        }
    }

    /// The connection of the same trip that arrives where `current` departs.
    ///
    /// Earlier hops of a trip that crosses midnight sit at the end of the
    /// table, so the walk back wraps around once.
    fn previous_hop(
        &self,
        cursor: &mut ConnectionCursor<'a, C>,
        current: &Connection,
        budget: &mut usize,
    ) -> Result<Connection, SearchError> {
        let mut wrapped = false;
        loop {
            if !cursor.move_previous() {
                if wrapped || current.day_shift() == 0 || !cursor.move_last() {
                    break;
                }
                wrapped = true;
            }
            *budget = budget.checked_sub(1).ok_or_else(|| {
                SearchError::DataIntegrity(format!("trip {} cannot be traced back", current.trip))
            })?;
            if let Some((_, candidate)) = cursor.current() {
                if candidate.trip == current.trip
                    && candidate.arrival_stop == current.departure_stop
                    && candidate.arrival <= current.departure
                {
                    return Ok(*candidate);
                }
            }
        }
        Err(SearchError::DataIntegrity(format!(
            "trip {} has no boardable stop before {}",
            current.trip, current.departure_stop
        )))
    }
}
