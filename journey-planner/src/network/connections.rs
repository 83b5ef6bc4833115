//! Connection store: the departure-sorted timetable view the profile search
//! scans.

use std::collections::HashMap;

use chrono::NaiveDate;

use crate::domain::{Connection, ConnectionId, Seconds, TripId};

use super::calendar::TripCalendar;

/// Read access to connections sorted by the second of the day they depart.
///
/// A hop of a trip that runs past midnight (nominal departure `24:10`)
/// sorts with the `00:10` departures, so one pass over the store followed by
/// a wrap to the start visits every departure of a day in order. Connection
/// ids are positions in that order.
pub trait ConnectionStore {
    /// Number of connections.
    fn len(&self) -> usize;

    /// Returns true if the store holds no connections.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get a connection by its position.
    fn get(&self, id: ConnectionId) -> Option<&Connection>;

    /// Binary-search for the first connection departing at or after `second`
    /// of the day.
    fn first_departing_at_or_after(&self, second: Seconds) -> Option<ConnectionId>;

    /// Whether the trip runs on the given service date.
    fn is_trip_possible(&self, trip: TripId, date: NaiveDate) -> bool;
}

/// A movable position in a [`ConnectionStore`].
pub struct ConnectionCursor<'a, S: ConnectionStore + ?Sized> {
    store: &'a S,
    position: Option<ConnectionId>,
}

impl<'a, S: ConnectionStore + ?Sized> ConnectionCursor<'a, S> {
    /// Create a cursor positioned before the first connection.
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            position: None,
        }
    }

    /// Create a cursor positioned on `id`.
    pub fn at(store: &'a S, id: ConnectionId) -> Self {
        let position = (id.index() < store.len()).then_some(id);
        Self { store, position }
    }

    /// Move to the first connection departing at or after `second`.
    ///
    /// Returns false (and leaves the cursor unpositioned) when there is none.
    pub fn move_to_departure_at_or_after(&mut self, second: Seconds) -> bool {
        self.position = self.store.first_departing_at_or_after(second);
        self.position.is_some()
    }

    /// Move to the earliest connection of the day.
    pub fn move_first(&mut self) -> bool {
        self.position = (!self.store.is_empty()).then_some(ConnectionId(0));
        self.position.is_some()
    }

    /// Move to the latest connection of the day.
    pub fn move_last(&mut self) -> bool {
        self.position = self
            .store
            .len()
            .checked_sub(1)
            .map(|last| ConnectionId(last as u32));
        self.position.is_some()
    }

    /// Advance one connection. Returns false when moving past the last one.
    pub fn move_next(&mut self) -> bool {
        self.position = self
            .position
            .map(|id| ConnectionId(id.0 + 1))
            .filter(|id| id.index() < self.store.len());
        self.position.is_some()
    }

    /// Step back one connection. Returns false when moving before the first one.
    pub fn move_previous(&mut self) -> bool {
        self.position = self
            .position
            .and_then(|id| id.0.checked_sub(1))
            .map(ConnectionId);
        self.position.is_some()
    }

    /// The connection under the cursor.
    pub fn current(&self) -> Option<(ConnectionId, &'a Connection)> {
        let id = self.position?;
        self.store.get(id).map(|c| (id, c))
    }
}

/// In-memory connection store.
#[derive(Debug, Clone, Default)]
pub struct ConnectionTable {
    connections: Vec<Connection>,
    calendars: HashMap<TripId, TripCalendar>,
}

impl ConnectionTable {
    /// Build a table, sorting connections by second-of-day departure, then
    /// arrival.
    ///
    /// Ordering ties by arrival keeps a zero-length hop ahead of the hop of
    /// the same trip that departs when it arrives.
    pub fn new(mut connections: Vec<Connection>) -> Self {
        connections.sort_by_key(|c| (c.departure_of_day(), c.arrival_of_day()));
        Self {
            connections,
            calendars: HashMap::new(),
        }
    }

    /// Attach a calendar to a trip. Trips without a calendar run every day.
    pub fn with_calendar(mut self, trip: TripId, calendar: TripCalendar) -> Self {
        self.set_calendar(trip, calendar);
        self
    }

    /// Attach a calendar to a trip in place.
    pub fn set_calendar(&mut self, trip: TripId, calendar: TripCalendar) {
        self.calendars.insert(trip, calendar);
    }

    /// All connections in table order.
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Number of trips with an explicit calendar.
    pub fn calendar_count(&self) -> usize {
        self.calendars.len()
    }
}

impl ConnectionStore for ConnectionTable {
    fn len(&self) -> usize {
        self.connections.len()
    }

    fn get(&self, id: ConnectionId) -> Option<&Connection> {
        self.connections.get(id.index())
    }

    fn first_departing_at_or_after(&self, second: Seconds) -> Option<ConnectionId> {
        let idx = self
            .connections
            .partition_point(|c| c.departure_of_day() < second);
        (idx < self.connections.len()).then(|| ConnectionId(idx as u32))
    }

    fn is_trip_possible(&self, trip: TripId, date: NaiveDate) -> bool {
        self.calendars
            .get(&trip)
            .is_none_or(|calendar| calendar.runs_on(date))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StopId;

    fn conn(trip: u32, from: u32, dep: Seconds, to: u32, arr: Seconds) -> Connection {
        Connection::new(TripId(trip), StopId(from), dep, StopId(to), arr)
    }

    fn table() -> ConnectionTable {
        ConnectionTable::new(vec![
            conn(2, 1, 7_200, 2, 7_500),
            conn(1, 0, 3_600, 1, 5_400),
            conn(3, 2, 9_000, 3, 9_600),
        ])
    }

    #[test]
    fn sorted_by_departure() {
        let t = table();
        let deps: Vec<_> = t.connections().iter().map(|c| c.departure).collect();
        assert_eq!(deps, vec![3_600, 7_200, 9_000]);
    }

    #[test]
    fn hops_after_midnight_sort_with_early_departures() {
        let t = ConnectionTable::new(vec![
            conn(1, 0, 86_000, 1, 86_300),
            conn(2, 1, 87_600, 2, 88_000),
            conn(3, 0, 300, 1, 400),
        ]);
        let trips: Vec<_> = t.connections().iter().map(|c| c.trip).collect();
        assert_eq!(trips, vec![TripId(3), TripId(2), TripId(1)]);
        assert_eq!(t.first_departing_at_or_after(500), Some(ConnectionId(1)));
        assert_eq!(t.first_departing_at_or_after(700), Some(ConnectionId(2)));
    }

    #[test]
    fn zero_length_hop_precedes_its_continuation() {
        let t = ConnectionTable::new(vec![
            conn(1, 1, 100, 2, 200),
            conn(1, 0, 100, 1, 100),
        ]);
        let stops: Vec<_> = t.connections().iter().map(|c| c.departure_stop).collect();
        assert_eq!(stops, vec![StopId(0), StopId(1)]);
    }

    #[test]
    fn binary_search_seek() {
        let t = table();
        assert_eq!(t.first_departing_at_or_after(0), Some(ConnectionId(0)));
        assert_eq!(t.first_departing_at_or_after(3_600), Some(ConnectionId(0)));
        assert_eq!(t.first_departing_at_or_after(3_601), Some(ConnectionId(1)));
        assert_eq!(t.first_departing_at_or_after(9_000), Some(ConnectionId(2)));
        assert_eq!(t.first_departing_at_or_after(9_001), None);
    }

    #[test]
    fn empty_table_has_nothing_to_seek() {
        let t = ConnectionTable::default();
        assert!(t.is_empty());
        assert_eq!(t.first_departing_at_or_after(0), None);

        let mut cursor = ConnectionCursor::new(&t);
        assert!(!cursor.move_first());
        assert!(cursor.current().is_none());
    }

    #[test]
    fn cursor_moves_both_ways() {
        let t = table();
        let mut cursor = ConnectionCursor::new(&t);
        assert!(cursor.move_to_departure_at_or_after(5_000));
        assert_eq!(cursor.current().unwrap().1.departure, 7_200);

        assert!(cursor.move_next());
        assert_eq!(cursor.current().unwrap().0, ConnectionId(2));
        assert!(!cursor.move_next());
        assert!(cursor.current().is_none());

        let mut cursor = ConnectionCursor::at(&t, ConnectionId(1));
        assert!(cursor.move_previous());
        assert_eq!(cursor.current().unwrap().1.departure, 3_600);
        assert!(!cursor.move_previous());

        assert!(cursor.move_last());
        assert_eq!(cursor.current().unwrap().0, ConnectionId(2));
    }

    #[test]
    fn trips_without_calendar_always_run() {
        let t = table();
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        assert!(t.is_trip_possible(TripId(1), date));
    }

    #[test]
    fn calendar_restricts_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 3, 15).unwrap();
        let next = NaiveDate::from_ymd_opt(2024, 3, 16).unwrap();
        let t = table().with_calendar(TripId(1), TripCalendar::daily(date, date));

        assert_eq!(t.calendar_count(), 1);
        assert!(t.is_trip_possible(TripId(1), date));
        assert!(!t.is_trip_possible(TripId(1), next));
        assert!(t.is_trip_possible(TripId(2), next));
    }
}
