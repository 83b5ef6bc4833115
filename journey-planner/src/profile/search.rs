//! Connection-scan profile search.
//!
//! Connections are scanned once, in departure order, starting at the
//! earliest source time. Every stop keeps a Pareto frontier of arrival time
//! by transfer count, so one scan answers "how early can I get there with at
//! most k changes" for every k at once.
//!
//! Trips are memoized per service day: the first connection of a trip that
//! can be boarded records where it was caught, and every later connection of
//! the same trip rides on at that boarding's transfer count. A hop timed
//! after midnight of its service day is scanned on the following calendar
//! day but still belongs to the earlier day's trip.

use std::collections::{BTreeMap, HashMap};

use chrono::{Duration, NaiveDate, NaiveDateTime};
use serde::Serialize;
use tracing::{debug, trace};

use crate::domain::{
    Connection, ConnectionId, SECONDS_PER_DAY, SearchError, Seconds, StopId, TripId, TripKey,
    seconds_since_midnight, service_seconds, split_day,
};
use crate::network::{ConnectionCursor, ConnectionStore, TransferStore};
use crate::planner::SearchConfig;

use super::frontier::{Frontier, Provenance, StopProfile, StopProfileCollection, Timed};
use super::trip_status::{Boarding, TripStatus};

/// An end-to-end arrival at one destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TargetArrival {
    /// The target stop the destination was reached from.
    pub stop: StopId,
    /// The stop's frontier entry at the time it was combined.
    pub profile: StopProfile,
    /// Fixed cost from the stop to the destination.
    pub egress: Seconds,
    /// Absolute arrival second at the destination.
    pub seconds: Seconds,
}

impl Timed for TargetArrival {
    fn seconds(&self) -> Seconds {
        self.seconds
    }
}

/// Result of checking whether a frontier entry can catch a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(super) struct BoardingOption {
    pub transfers: usize,
    /// The entry already rides this trip instance.
    pub continues_trip: bool,
}

/// Why a scan ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanEnd {
    Exhausted,
    Horizon,
    NoImprovement,
    FirstArrival,
}

/// A single-use profile search.
pub struct ProfileSearch<'a, C: ConnectionStore + ?Sized, T: TransferStore + ?Sized> {
    connections: &'a C,
    transfers: &'a T,
    config: &'a SearchConfig,
    departure: NaiveDateTime,

    sources: BTreeMap<StopId, Seconds>,

    /// Target stop to `(destination, egress seconds)` pairs.
    targets: BTreeMap<StopId, Vec<(usize, Seconds)>>,

    profiles: HashMap<StopId, StopProfileCollection>,
    trips: HashMap<TripKey, TripStatus>,
    arrivals: Vec<Frontier<TargetArrival>>,
    best_arrival: Option<Seconds>,
    scanned: usize,

    has_run: bool,
    succeeded: bool,
}

impl<'a, C: ConnectionStore + ?Sized, T: TransferStore + ?Sized> ProfileSearch<'a, C, T> {
    /// Create a search departing at `departure`.
    ///
    /// Source and target seconds are absolute seconds since the midnight of
    /// `departure`'s date.
    pub fn new(
        connections: &'a C,
        transfers: &'a T,
        config: &'a SearchConfig,
        departure: NaiveDateTime,
    ) -> Self {
        Self {
            connections,
            transfers,
            config,
            departure,
            sources: BTreeMap::new(),
            targets: BTreeMap::new(),
            profiles: HashMap::new(),
            trips: HashMap::new(),
            arrivals: Vec::new(),
            best_arrival: None,
            scanned: 0,
            has_run: false,
            succeeded: false,
        }
    }

    /// The departure instant as seconds since its own midnight.
    pub fn departure_second(&self) -> Seconds {
        seconds_since_midnight(self.departure)
    }

    pub fn departure(&self) -> NaiveDateTime {
        self.departure
    }

    /// Register a source stop reachable at absolute second `seconds`.
    ///
    /// Registering a stop twice keeps the earlier time.
    pub fn add_source(&mut self, stop: StopId, seconds: Seconds) -> Result<(), SearchError> {
        if self.has_run {
            return Err(SearchError::AlreadyRun);
        }
        self.sources
            .entry(stop)
            .and_modify(|s| *s = (*s).min(seconds))
            .or_insert(seconds);
        Ok(())
    }

    /// Register `stop` as a way into `destination`, `egress` seconds away.
    pub fn add_target(
        &mut self,
        destination: usize,
        stop: StopId,
        egress: Seconds,
    ) -> Result<(), SearchError> {
        if self.has_run {
            return Err(SearchError::AlreadyRun);
        }
        self.set_destination_count(destination + 1)?;

        let list = self.targets.entry(stop).or_default();
        match list.iter_mut().find(|(d, _)| *d == destination) {
            Some(existing) => existing.1 = existing.1.min(egress),
            None => list.push((destination, egress)),
        }
        Ok(())
    }

    /// Make sure destinations `0..count` exist, even those no target leads to.
    pub fn set_destination_count(&mut self, count: usize) -> Result<(), SearchError> {
        if self.has_run {
            return Err(SearchError::AlreadyRun);
        }
        if self.arrivals.len() < count {
            self.arrivals.resize_with(count, Frontier::new);
        }
        Ok(())
    }

    /// Run the scan. Returns whether any destination was reached.
    pub fn run(&mut self) -> Result<bool, SearchError> {
        if self.has_run {
            return Err(SearchError::AlreadyRun);
        }
        self.has_run = true;

        let Some(earliest) = self.sources.values().copied().min() else {
            debug!("profile search has no sources");
            return Ok(false);
        };

        debug!(
            sources = self.sources.len(),
            targets = self.targets.len(),
            destinations = self.arrivals.len(),
            departure = %self.departure,
            "starting profile search"
        );

        self.seed_sources();

        let date = self.departure.date();
        let (mut day, second) = split_day(earliest);
        let mut cursor = ConnectionCursor::new(self.connections);
        if !cursor.move_to_departure_at_or_after(second) {
            debug!(second, "no connection departs after the earliest source");
            return Ok(false);
        }

        let horizon = self.config.max_search_horizon_secs;
        let slack = self.config.cutoff_slack_secs();

        let end = loop {
            let Some((id, connection)) = cursor.current() else {
                break ScanEnd::Exhausted;
            };

            let departure = day
                .saturating_mul(SECONDS_PER_DAY)
                .saturating_add(connection.departure_of_day());
            if departure.saturating_sub(earliest) > horizon {
                break ScanEnd::Horizon;
            }
            if self
                .best_arrival
                .is_some_and(|best| departure > best.saturating_add(slack))
            {
                break ScanEnd::NoImprovement;
            }

            self.scan_connection(id, connection, day, date);
            self.scanned += 1;

            if self.config.stop_at_first_arrival && self.best_arrival.is_some() {
                break ScanEnd::FirstArrival;
            }

            if !cursor.move_next() {
                if !cursor.move_first() {
                    break ScanEnd::Exhausted;
                }
                day += 1;
                trace!(day, "scan wrapped to the next service day");
            }
        };

        self.succeeded = self.arrivals.iter().any(|f| !f.is_empty());

        debug!(
            scanned = self.scanned,
            stops = self.profiles.len(),
            trips = self.trips.len(),
            end = ?end,
            best_arrival = ?self.best_arrival,
            succeeded = self.succeeded,
            "profile search finished"
        );

        Ok(self.succeeded)
    }

    fn seed_sources(&mut self) {
        let sources: Vec<(StopId, Seconds)> =
            self.sources.iter().map(|(&s, &t)| (s, t)).collect();

        for &(stop, seconds) in &sources {
            self.profiles
                .entry(stop)
                .or_default()
                .offer(0, StopProfile::first(seconds));
        }

        let store = self.transfers;
        for &(stop, seconds) in &sources {
            for transfer in store.neighbors_of(stop) {
                let candidate =
                    StopProfile::via_transfer(stop, seconds.saturating_add(transfer.seconds));
                self.offer(transfer.to, 0, candidate);
            }
        }
    }

    fn scan_connection(&mut self, id: ConnectionId, connection: &Connection, day: u32, date: NaiveDate) {
        let stop = connection.departure_stop;
        if !self.profiles.contains_key(&stop) {
            return;
        }

        let service_day = i64::from(day) - i64::from(connection.day_shift());
        let Ok(service_day) = i32::try_from(service_day) else {
            return;
        };
        let (Some(departure), Some(arrival)) = (
            service_seconds(service_day, connection.departure),
            service_seconds(service_day, connection.arrival),
        ) else {
            return;
        };
        let key = TripKey::new(connection.trip, service_day);

        let status = match self.trips.get(&key) {
            Some(status) => *status,
            None => {
                let possible = date
                    .checked_add_signed(Duration::days(i64::from(service_day)))
                    .is_some_and(|d| self.connections.is_trip_possible(connection.trip, d));
                let status = if possible {
                    TripStatus::Possible
                } else {
                    trace!(trip = %connection.trip, day, "trip does not run");
                    TripStatus::Impossible
                };
                self.trips.insert(key, status);
                status
            }
        };

        let transfers = match status {
            TripStatus::NotEvaluated | TripStatus::Impossible => return,
            TripStatus::Reached(boarding) => {
                match self.fewest_boarding_transfers(stop, key, departure, Some(boarding.transfers)) {
                    Some(better) => {
                        trace!(
                            trip = %connection.trip,
                            stop = %stop,
                            from = boarding.transfers,
                            to = better,
                            "trip boarding improved"
                        );
                        self.trips.insert(
                            key,
                            TripStatus::Reached(Boarding {
                                stop,
                                departure,
                                transfers: better,
                            }),
                        );
                        better
                    }
                    None => boarding.transfers,
                }
            }
            TripStatus::Possible => {
                let Some(transfers) = self.fewest_boarding_transfers(stop, key, departure, None) else {
                    return;
                };
                trace!(trip = %connection.trip, stop = %stop, transfers, "trip boarded");
                self.trips.insert(
                    key,
                    TripStatus::Reached(Boarding {
                        stop,
                        departure,
                        transfers,
                    }),
                );
                transfers
            }
        };

        let alight = connection.arrival_stop;
        if !self.offer(alight, transfers, StopProfile::via_connection(id, arrival)) {
            return;
        }

        let walked = transfers + 1;
        if walked > self.config.max_transfers {
            return;
        }
        let store = self.transfers;
        for transfer in store.neighbors_of(alight) {
            let candidate = StopProfile::via_transfer(alight, arrival.saturating_add(transfer.seconds));
            self.offer(transfer.to, walked, candidate);
        }
    }

    /// Offer a profile to a stop and combine it into destinations when kept.
    ///
    /// A source stop keeps its initial entry at zero transfers.
    fn offer(&mut self, stop: StopId, transfers: usize, candidate: StopProfile) -> bool {
        let frontier = self.profiles.entry(stop).or_default();
        if transfers == 0
            && frontier
                .get(0)
                .is_some_and(|p| p.provenance == Provenance::First)
        {
            return false;
        }
        if !frontier.offer(transfers, candidate) {
            return false;
        }
        self.combine_target(stop);
        true
    }

    fn combine_target(&mut self, stop: StopId) {
        let (Some(targets), Some(frontier)) = (self.targets.get(&stop), self.profiles.get(&stop))
        else {
            return;
        };

        for &(destination, egress) in targets {
            for (transfers, profile) in frontier.iter() {
                if !profile.rode_transit(transfers) {
                    continue;
                }
                let seconds = profile.seconds.saturating_add(egress);
                let arrival = TargetArrival {
                    stop,
                    profile: *profile,
                    egress,
                    seconds,
                };
                if self.arrivals[destination].offer(transfers, arrival) {
                    self.best_arrival = Some(self.best_arrival.map_or(seconds, |b| b.min(seconds)));
                }
            }
        }
    }

    /// Fewest transfers at which the trip can be caught at `stop`.
    ///
    /// With `below`, only entries under that count are considered and only a
    /// strictly lower result is returned.
    fn fewest_boarding_transfers(
        &self,
        stop: StopId,
        key: TripKey,
        departure: Seconds,
        below: Option<usize>,
    ) -> Option<usize> {
        let frontier = self.profiles.get(&stop)?;
        let limit = below.unwrap_or(usize::MAX);
        frontier
            .iter()
            .rev()
            .filter(|(index, _)| *index < limit)
            .filter_map(|(index, profile)| self.boarding_option(index, profile, key, departure))
            .map(|option| option.transfers)
            .filter(|transfers| *transfers < limit)
            .min()
    }

    /// Whether `profile`, held at `index`, can catch trip `key` departing
    /// at `departure`, and at what transfer count.
    pub(super) fn boarding_option(
        &self,
        index: usize,
        profile: &StopProfile,
        key: TripKey,
        departure: Seconds,
    ) -> Option<BoardingOption> {
        let continues_trip = self.continues_trip(profile, key);
        let required = if continues_trip {
            0
        } else {
            self.config.min_transfer_secs
        };
        if profile.seconds.saturating_add(required) > departure {
            return None;
        }

        let transfers = match profile.provenance {
            Provenance::ViaConnection(_) if !continues_trip => index + 1,
            _ => index,
        };
        (transfers <= self.config.max_transfers).then_some(BoardingOption {
            transfers,
            continues_trip,
        })
    }

    /// Whether the entry arrived on the same trip instance.
    fn continues_trip(&self, profile: &StopProfile, key: TripKey) -> bool {
        let Provenance::ViaConnection(id) = profile.provenance else {
            return false;
        };
        self.connections.get(id).is_some_and(|c| {
            c.trip == key.trip && service_seconds(key.day, c.arrival) == Some(profile.seconds)
        })
    }

    // Queries

    pub fn has_run(&self) -> bool {
        self.has_run
    }

    pub fn has_succeeded(&self) -> bool {
        self.succeeded
    }

    /// Number of connections the scan processed.
    pub fn scanned_connections(&self) -> usize {
        self.scanned
    }

    /// The connection store this search scans.
    pub fn connections(&self) -> &'a C {
        self.connections
    }

    /// The transfer store this search walks.
    pub fn transfers(&self) -> &'a T {
        self.transfers
    }

    pub fn config(&self) -> &'a SearchConfig {
        self.config
    }

    /// Number of destinations.
    pub fn destination_count(&self) -> usize {
        self.arrivals.len()
    }

    /// The frontier of a stop touched by the run.
    pub fn stop_profiles(&self, stop: StopId) -> Result<&StopProfileCollection, SearchError> {
        if !self.has_run {
            return Err(SearchError::NotRun);
        }
        self.profiles.get(&stop).ok_or(SearchError::UnknownStop(stop))
    }

    /// Every stop touched by the run, in id order.
    pub fn reached_stops(&self) -> Vec<StopId> {
        let mut stops: Vec<StopId> = self.profiles.keys().copied().collect();
        stops.sort_unstable();
        stops
    }

    /// The status of a trip instance the run looked at. `day` is the trip's
    /// service day counted from the search date.
    pub fn trip_status(&self, trip: TripId, day: i32) -> Result<TripStatus, SearchError> {
        if !self.has_run {
            return Err(SearchError::NotRun);
        }
        self.trips
            .get(&TripKey::new(trip, day))
            .copied()
            .ok_or(SearchError::UnknownTrip(trip, day))
    }

    /// The end-to-end frontier of a destination.
    pub fn arrivals(&self, destination: usize) -> Result<&Frontier<TargetArrival>, SearchError> {
        if !self.has_run {
            return Err(SearchError::NotRun);
        }
        if !self.succeeded {
            return Err(SearchError::NotSucceeded);
        }
        self.arrivals
            .get(destination)
            .ok_or(SearchError::UnknownDestination(destination))
    }

    /// Arrival second at a destination with exactly `transfers` transfers,
    /// or `None` when no journey with that count survived.
    pub fn end_to_end_arrival(
        &self,
        destination: usize,
        transfers: usize,
    ) -> Result<Option<Seconds>, SearchError> {
        Ok(self
            .arrivals(destination)?
            .get(transfers)
            .map(|arrival| arrival.seconds))
    }

    /// The earliest end-to-end arrival over all destinations.
    pub fn best_arrival(&self) -> Option<Seconds> {
        self.best_arrival
    }
}
