//! Trip calendars: on which service days a trip runs.

use chrono::{Datelike, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

const ALL_WEEKDAYS: [Weekday; 7] = [
    Weekday::Mon,
    Weekday::Tue,
    Weekday::Wed,
    Weekday::Thu,
    Weekday::Fri,
    Weekday::Sat,
    Weekday::Sun,
];

fn all_weekdays() -> Vec<Weekday> {
    ALL_WEEKDAYS.to_vec()
}

/// Service pattern of one trip.
///
/// A trip runs on a date inside `[start, end]` whose weekday is listed,
/// unless the date is explicitly removed. Explicitly added dates run
/// regardless of the range and weekdays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TripCalendar {
    pub start: NaiveDate,
    pub end: NaiveDate,

    #[serde(default = "all_weekdays")]
    pub weekdays: Vec<Weekday>,

    #[serde(default)]
    pub added: Vec<NaiveDate>,

    #[serde(default)]
    pub removed: Vec<NaiveDate>,
}

impl TripCalendar {
    /// A calendar running every day in `[start, end]`.
    pub fn daily(start: NaiveDate, end: NaiveDate) -> Self {
        Self {
            start,
            end,
            weekdays: all_weekdays(),
            added: Vec::new(),
            removed: Vec::new(),
        }
    }

    /// Restrict the calendar to the given weekdays.
    pub fn on(mut self, weekdays: &[Weekday]) -> Self {
        self.weekdays = weekdays.to_vec();
        self
    }

    /// Add a one-off service date.
    pub fn with_added(mut self, date: NaiveDate) -> Self {
        self.added.push(date);
        self
    }

    /// Remove a service date.
    pub fn with_removed(mut self, date: NaiveDate) -> Self {
        self.removed.push(date);
        self
    }

    /// Whether the trip runs on `date`.
    pub fn runs_on(&self, date: NaiveDate) -> bool {
        if self.removed.contains(&date) {
            return false;
        }
        if self.added.contains(&date) {
            return true;
        }
        date >= self.start && date <= self.end && self.weekdays.contains(&date.weekday())
    }
}
