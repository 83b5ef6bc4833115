//! Timetable connections.

use serde::{Deserialize, Serialize};

use super::{SECONDS_PER_DAY, Seconds, StopId, TripId};

/// One scheduled hop of one trip between two adjacent stops.
///
/// Times are seconds since the midnight of the trip's service day, so a
/// hop leaving at 24:10 has a departure of `87_000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Connection {
    pub trip: TripId,
    pub departure_stop: StopId,
    pub departure: Seconds,
    pub arrival_stop: StopId,
    pub arrival: Seconds,
}

impl Connection {
    pub fn new(
        trip: TripId,
        departure_stop: StopId,
        departure: Seconds,
        arrival_stop: StopId,
        arrival: Seconds,
    ) -> Self {
        Self {
            trip,
            departure_stop,
            departure,
            arrival_stop,
            arrival,
        }
    }

    /// Whole days between the trip's service day and the calendar day the
    /// hop departs on.
    pub fn day_shift(&self) -> u32 {
        self.departure / SECONDS_PER_DAY
    }

    /// Departure as a second of the calendar day it happens on.
    pub fn departure_of_day(&self) -> Seconds {
        self.departure % SECONDS_PER_DAY
    }

    /// Arrival relative to the midnight before the departure.
    pub fn arrival_of_day(&self) -> Seconds {
        self.arrival.saturating_sub(self.day_shift() * SECONDS_PER_DAY)
    }

    /// Time spent in the vehicle for this hop.
    pub fn duration(&self) -> Seconds {
        self.arrival.saturating_sub(self.departure)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duration_of_hop() {
        let c = Connection::new(TripId(1), StopId(0), 3_600, StopId(1), 5_400);
        assert_eq!(c.duration(), 1_800);
    }

    #[test]
    fn hop_after_midnight_belongs_to_the_previous_day() {
        let c = Connection::new(TripId(1), StopId(0), 87_000, StopId(1), 87_600);
        assert_eq!(c.day_shift(), 1);
        assert_eq!(c.departure_of_day(), 600);
        assert_eq!(c.arrival_of_day(), 1_200);

        let before = Connection::new(TripId(1), StopId(0), 86_000, StopId(1), 87_000);
        assert_eq!(before.day_shift(), 0);
        assert_eq!(before.departure_of_day(), 86_000);
        assert_eq!(before.arrival_of_day(), 87_000);
    }

    #[test]
    fn malformed_hop_has_zero_duration() {
        let c = Connection::new(TripId(1), StopId(0), 5_400, StopId(1), 3_600);
        assert_eq!(c.duration(), 0);
    }
}
