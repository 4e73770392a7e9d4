use crate::{
    raptor::SearchDirection,
    shared::Time,
    transit::{TransitDataProvider, TripSchedule},
};

/// A trip found by [`find_trip`], with its position in the pattern's sorted
/// schedule list so callers can tell whether one trip is earlier than another.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BoardableTrip<'a> {
    pub schedule_idx: usize,
    pub schedule: TripSchedule<'a>,
}

/// Finds the best trip of `pattern` the search can board at `pos` given the
/// earliest (forward) or latest (reverse) possible boarding time.
///
/// Schedules are sorted and never overtake, so a binary search on the boarding
/// position is enough.
pub(crate) fn find_trip<T: TransitDataProvider>(
    transit: &T,
    direction: SearchDirection,
    pattern: u32,
    pos: usize,
    time: Time,
) -> Option<BoardableTrip<'_>> {
    let schedules = transit.schedules(pattern);
    let trip_data = &transit.pattern(pattern).trips;
    let schedule_idx = match direction {
        SearchDirection::Forward => {
            let idx = schedules.partition_point(|s| {
                trip_data[s.trip as usize].departure(pos) + s.offset < time
            });
            (idx < schedules.len()).then_some(idx)?
        }
        SearchDirection::Reverse => {
            let idx = schedules.partition_point(|s| {
                trip_data[s.trip as usize].arrival(pos) + s.offset <= time
            });
            idx.checked_sub(1)?
        }
    };
    Some(BoardableTrip {
        schedule_idx,
        schedule: transit.trip_schedule(pattern, &schedules[schedule_idx]),
    })
}

/// Position of `stop` in `pattern` where a search scanning in `direction`
/// would first meet it.
pub(crate) fn index_in_pattern<T: TransitDataProvider>(
    transit: &T,
    direction: SearchDirection,
    pattern: u32,
    stop: u32,
) -> Option<usize> {
    let mut positions = transit.pattern(pattern).positions_of(stop);
    match direction {
        SearchDirection::Forward => positions.next(),
        SearchDirection::Reverse => positions.next_back(),
    }
}

/// Records the earliest (in search order) position every pattern has to be
/// scanned from, given the stops marked in the previous round.
pub(crate) fn collect_active_patterns<T: TransitDataProvider>(
    transit: &T,
    direction: SearchDirection,
    marked: impl Iterator<Item = u32>,
    active: &mut [Option<usize>],
) {
    for stop in marked {
        for &pattern in transit.patterns_by_stop(stop) {
            let Some(pos) = index_in_pattern(transit, direction, pattern, stop) else {
                continue;
            };
            let slot = &mut active[pattern as usize];
            match *slot {
                Some(current) if !direction.is_before(pos, current) => {}
                _ => *slot = Some(pos),
            }
        }
    }
}
