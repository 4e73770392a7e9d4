use crate::{
    shared::Duration,
    transit::schedule::{ScheduleRef, TripTimes},
};
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;

#[derive(Debug, Default, Clone)]
pub struct Stop {
    pub index: u32,
    pub id: Arc<str>,
    pub name: Arc<str>,
}

/// An ordered sequence of stops shared by all of its trips. The stop position
/// is the join key between schedules, boarding and alighting.
#[derive(Debug, Clone)]
pub struct TripPattern {
    pub index: u32,
    pub id: Arc<str>,
    pub stops: Box<[u32]>,
    pub trips: Box<[TripTimes]>,
    /// Every (trip, service date) combination, sorted by departure.
    pub(crate) schedules: Box<[ScheduleRef]>,
}

impl TripPattern {
    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn stop(&self, pos: usize) -> u32 {
        self.stops[pos]
    }

    /// All positions where the pattern serves `stop`, in pattern order.
    pub fn positions_of(&self, stop: u32) -> impl DoubleEndedIterator<Item = usize> + '_ {
        self.stops
            .iter()
            .enumerate()
            .filter_map(move |(pos, &stop_idx)| (stop_idx == stop).then_some(pos))
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Transfer {
    pub from_stop_idx: u32,
    pub to_stop_idx: u32,
    pub duration: Duration,
}

/// Identifies one trip on one service date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct TripRef {
    pub pattern: u32,
    pub trip: u32,
    pub service_date: NaiveDate,
}
