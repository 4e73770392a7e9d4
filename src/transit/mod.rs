//! Read-only transit data consumed by the routing core.
//!
//! The core only ever sees a [`TransitDataProvider`]. [`Repository`] is the
//! in-memory snapshot shipped with the crate; a newer snapshot is a different
//! instance, never an in-place mutation visible to a running search.

mod models;
mod repository;
mod schedule;

pub use models::*;
pub use repository::*;
pub use schedule::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Stop id {0} does not match any entry")]
    UnknownStop(String),
    #[error("Stop id {0} is already in use")]
    DuplicateStop(String),
    #[error("Pattern id {0} is already in use")]
    DuplicatePattern(String),
    #[error("Pattern index {0} does not match any entry")]
    UnknownPattern(u32),
    #[error("Pattern {0} must serve at least two stops")]
    PatternTooShort(String),
    #[error("Trip {trip} has {actual} stop times but pattern {pattern} has {expected} stops")]
    TripLengthMismatch {
        pattern: String,
        trip: String,
        expected: usize,
        actual: usize,
    },
    #[error("Invalid trip times: {0}")]
    InvalidTripTimes(String),
    #[error("Could not parse schedule \"{0}\"")]
    InvalidScheduleString(String),
    #[error("Trips {first} and {second} of pattern {pattern} overtake each other")]
    OvertakingTrips {
        pattern: String,
        first: String,
        second: String,
    },
    #[error("Transfer from {from} to {to} has a negative duration")]
    NegativeTransferDuration { from: String, to: String },
}

/// Everything the routing core needs from a transit network snapshot.
///
/// Implementations must be immutable for the lifetime of a search; they are
/// shared between worker threads without locking.
pub trait TransitDataProvider: Sync {
    fn stop_count(&self) -> usize;

    fn pattern_count(&self) -> usize;

    /// Indexes of all patterns serving `stop`.
    fn patterns_by_stop(&self, stop: u32) -> &[u32];

    fn pattern(&self, index: u32) -> &TripPattern;

    /// All trips of a pattern over the snapshot's service dates, sorted so that
    /// departures and arrivals are non-decreasing at every stop position.
    fn schedules(&self, pattern: u32) -> &[ScheduleRef];

    fn trip_schedule(&self, pattern: u32, schedule: &ScheduleRef) -> TripSchedule<'_> {
        let pattern_data = self.pattern(pattern);
        TripSchedule::new(
            pattern,
            schedule.trip,
            &pattern_data.trips[schedule.trip as usize],
            schedule.service_date,
        )
        .with_offset(schedule.offset, schedule.service_date)
    }

    fn transfers_from(&self, stop: u32) -> &[Transfer];

    fn transfers_to(&self, stop: u32) -> &[Transfer];
}
