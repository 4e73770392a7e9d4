use crate::{
    shared::{Duration, Time},
    transit::{self, TripRef},
};
use chrono::NaiveDate;
use std::{fmt, sync::Arc};

/// Arrival and departure times of one scheduled trip, indexed by stop position
/// in its pattern. Owned by the pattern it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TripTimes {
    pub id: Arc<str>,
    arrivals: Box<[Time]>,
    departures: Box<[Time]>,
}

impl TripTimes {
    /// Validates `arrival(i) <= departure(i) <= arrival(i + 1)`.
    pub fn new(
        id: impl Into<Arc<str>>,
        arrivals: Vec<Time>,
        departures: Vec<Time>,
    ) -> Result<Self, transit::Error> {
        let id = id.into();
        if arrivals.len() != departures.len() {
            return Err(transit::Error::InvalidTripTimes(format!(
                "trip {id} has {} arrivals but {} departures",
                arrivals.len(),
                departures.len()
            )));
        }
        for (pos, (arrival, departure)) in arrivals.iter().zip(departures.iter()).enumerate() {
            if arrival > departure {
                return Err(transit::Error::InvalidTripTimes(format!(
                    "trip {id} arrives at position {pos} ({arrival}) after it departs ({departure})"
                )));
            }
            if let Some(next_arrival) = arrivals.get(pos + 1)
                && departure > next_arrival
            {
                return Err(transit::Error::InvalidTripTimes(format!(
                    "trip {id} departs position {pos} ({departure}) after it arrives at position {} ({next_arrival})",
                    pos + 1
                )));
            }
        }
        Ok(Self {
            id,
            arrivals: arrivals.into(),
            departures: departures.into(),
        })
    }

    /// Builds a trip where every stop is served with zero dwell,
    /// from a whitespace separated list like `"11:30 11:40 11:50"`.
    pub fn parse(id: impl Into<Arc<str>>, times: &str) -> Result<Self, transit::Error> {
        let times = times
            .split_whitespace()
            .map(|time| {
                Time::parse(time)
                    .ok_or_else(|| transit::Error::InvalidScheduleString(times.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Self::new(id, times.clone(), times)
    }

    pub fn len(&self) -> usize {
        self.arrivals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arrivals.is_empty()
    }

    pub fn arrival(&self, pos: usize) -> Time {
        self.arrivals[pos]
    }

    pub fn departure(&self, pos: usize) -> Time {
        self.departures[pos]
    }
}

/// Points at one trip of a pattern running on a given service date.
///
/// The same base [`TripTimes`] is shared by every service date; the day is
/// folded into `offset`, so no time arrays are copied per day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleRef {
    pub trip: u32,
    pub offset: Duration,
    pub service_date: NaiveDate,
}

/// A read-only view of a trip's times shifted by a whole number of service days.
#[derive(Debug, Clone, Copy)]
pub struct TripSchedule<'a> {
    pattern: u32,
    trip: u32,
    times: &'a TripTimes,
    offset: Duration,
    service_date: NaiveDate,
}

impl<'a> TripSchedule<'a> {
    pub fn new(pattern: u32, trip: u32, times: &'a TripTimes, service_date: NaiveDate) -> Self {
        Self {
            pattern,
            trip,
            times,
            offset: Duration::ZERO,
            service_date,
        }
    }

    /// The same trip running `offset` later, on `service_date`. The wrapped
    /// times are borrowed, never copied or mutated.
    pub fn with_offset(self, offset: Duration, service_date: NaiveDate) -> Self {
        Self {
            offset: self.offset + offset,
            service_date,
            ..self
        }
    }

    pub fn arrival(&self, pos: usize) -> Time {
        self.times.arrival(pos) + self.offset
    }

    pub fn departure(&self, pos: usize) -> Time {
        self.times.departure(pos) + self.offset
    }

    pub fn pattern(&self) -> u32 {
        self.pattern
    }

    pub fn trip(&self) -> u32 {
        self.trip
    }

    pub fn offset(&self) -> Duration {
        self.offset
    }

    pub fn service_date(&self) -> NaiveDate {
        self.service_date
    }

    pub fn times(&self) -> &'a TripTimes {
        self.times
    }

    pub fn trip_ref(&self) -> TripRef {
        TripRef {
            pattern: self.pattern,
            trip: self.trip,
            service_date: self.service_date,
        }
    }
}

impl fmt::Display for TripSchedule<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} depart {}",
            self.times.id,
            self.service_date,
            self.departure(0)
        )
    }
}
