use crate::{
    raptor::{self, SearchDirection},
    shared::{Duration, Time},
    transit::ScheduleRef,
};
use bitvec::prelude::*;

/// How a stop label was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Parent {
    Access {
        path: usize,
    },
    Transit {
        pattern: u32,
        schedule: ScheduleRef,
        board_stop: u32,
        board_pos: usize,
        alight_pos: usize,
    },
    Transfer {
        from_stop: u32,
        duration: Duration,
    },
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct Update {
    pub stop_idx: u32,
    pub time: Time,
    pub parent: Parent,
}

impl Update {
    pub fn new(stop_idx: u32, time: Time, parent: Parent) -> Self {
        Self {
            stop_idx,
            time,
            parent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DestinationArrival {
    pub time: Time,
    pub stop: u32,
    pub egress: usize,
}

/// Arrival-time state of the standard worker.
///
/// Labels are kept per round, each round starting as a copy of the previous
/// one, so `label(k, s)` is the best time at `s` with at most `k` boardings.
/// Transit arrivals are tracked apart from the overall labels: transfers and
/// egress may only follow a transit leg.
///
/// All buffers are allocated once per worker and reused between iterations.
pub(crate) struct StdWorkerState {
    direction: SearchDirection,
    stop_count: usize,
    rounds: usize,
    /// Best time at each stop over all rounds.
    pub(crate) tau_star: Vec<Time>,
    /// Best transit arrival at each stop over all rounds.
    pub(crate) tau_star_transit: Vec<Time>,
    /// Flat [round][stop] matrices.
    labels: Vec<Time>,
    transit_labels: Vec<Time>,
    parents: Vec<Option<Parent>>,
    transit_parents: Vec<Option<Parent>>,
    /// Stops improved in the current round; they drive the next one.
    pub(crate) marked_stops: BitVec<usize, Lsb0>,
    pub(crate) prev_marked_stops: BitVec<usize, Lsb0>,
    /// Stops reached by transit in the current round.
    pub(crate) transit_marked: BitVec<usize, Lsb0>,
    /// Earliest position, in search order, each pattern is scanned from.
    pub(crate) active: Vec<Option<usize>>,
    /// Buffer used to batch updates before applying them to the state.
    pub(crate) updates: Vec<Update>,
    destinations: Vec<Option<DestinationArrival>>,
    pub(crate) best_destination: Time,
}

impl StdWorkerState {
    /// `rounds` is the number of boardings allowed; round 0 comes on top.
    pub fn new(
        direction: SearchDirection,
        stop_count: usize,
        pattern_count: usize,
        rounds: usize,
    ) -> Self {
        let unreached = direction.unreached();
        let cells = stop_count * (rounds + 1);
        Self {
            direction,
            stop_count,
            rounds,
            tau_star: vec![unreached; stop_count],
            tau_star_transit: vec![unreached; stop_count],
            labels: vec![unreached; cells],
            transit_labels: vec![unreached; cells],
            parents: vec![None; cells],
            transit_parents: vec![None; cells],
            marked_stops: bitvec!(usize, Lsb0; 0; stop_count),
            prev_marked_stops: bitvec!(usize, Lsb0; 0; stop_count),
            transit_marked: bitvec!(usize, Lsb0; 0; stop_count),
            active: vec![None; pattern_count],
            updates: Vec::with_capacity(1024),
            destinations: vec![None; rounds + 1],
            best_destination: unreached,
        }
    }

    /// Resets the internal buffers so the state can be reused for a new
    /// iteration without re-allocating memory.
    pub fn reset(&mut self) {
        let unreached = self.direction.unreached();
        self.tau_star.fill(unreached);
        self.tau_star_transit.fill(unreached);
        self.labels.fill(unreached);
        self.transit_labels.fill(unreached);
        self.parents.fill(None);
        self.transit_parents.fill(None);
        self.marked_stops.fill(false);
        self.prev_marked_stops.fill(false);
        self.transit_marked.fill(false);
        self.active.fill(None);
        self.updates.clear();
        self.destinations.fill(None);
        self.best_destination = unreached;
    }

    pub fn rounds(&self) -> usize {
        self.rounds
    }

    /// Starts `round`: labels carry over from the previous round and the
    /// stops marked there become the ones to scan from.
    pub fn new_round(&mut self, round: usize) {
        let (prev, curr) = self.labels.split_at_mut(round * self.stop_count);
        curr[..self.stop_count].copy_from_slice(&prev[(round - 1) * self.stop_count..]);
        std::mem::swap(&mut self.marked_stops, &mut self.prev_marked_stops);
        self.marked_stops.fill(false);
        self.transit_marked.fill(false);
        self.active.fill(None);
    }

    pub fn label(&self, round: usize, stop: u32) -> Time {
        self.labels[flat_matrix(round, stop as usize, self.stop_count)]
    }

    pub fn transit_label(&self, round: usize, stop: u32) -> Time {
        self.transit_labels[flat_matrix(round, stop as usize, self.stop_count)]
    }

    /// Whether the label of `stop` in `round` was reached without riding.
    pub fn is_access_label(&self, round: usize, stop: u32) -> bool {
        self.label(round, stop) == self.label(0, stop)
    }

    /// Applies access or transfer updates to the overall labels.
    pub(crate) fn run_updates(&mut self, round: usize) {
        for update in self.updates.drain(..) {
            let stop = update.stop_idx as usize;
            if self.direction.is_better(update.time, self.tau_star[stop]) {
                let idx = flat_matrix(round, stop, self.stop_count);
                self.tau_star[stop] = update.time;
                self.labels[idx] = update.time;
                self.parents[idx] = Some(update.parent);
                self.marked_stops.set(stop, true);
            }
        }
    }

    /// Applies transit updates. An arrival only has to beat earlier transit
    /// arrivals to count, since a transfer may leave from it; it only becomes
    /// the overall label if it also beats `tau_star`.
    pub(crate) fn run_transit_updates(&mut self, round: usize) {
        for update in self.updates.drain(..) {
            let stop = update.stop_idx as usize;
            if !self
                .direction
                .is_better(update.time, self.tau_star_transit[stop])
            {
                continue;
            }
            let idx = flat_matrix(round, stop, self.stop_count);
            self.tau_star_transit[stop] = update.time;
            self.transit_labels[idx] = update.time;
            self.transit_parents[idx] = Some(update.parent);
            self.transit_marked.set(stop, true);
            if self.direction.is_better(update.time, self.tau_star[stop]) {
                self.tau_star[stop] = update.time;
                self.labels[idx] = update.time;
                self.parents[idx] = Some(update.parent);
                self.marked_stops.set(stop, true);
            }
        }
    }

    pub fn arrive_at_destination(&mut self, round: usize, arrival: DestinationArrival) {
        if self.direction.is_better(arrival.time, self.best_destination) {
            self.best_destination = arrival.time;
            self.destinations[round] = Some(arrival);
        }
    }

    pub fn destination(&self, round: usize) -> Option<DestinationArrival> {
        self.destinations[round]
    }

    pub fn is_improved(&self) -> bool {
        self.marked_stops.any()
    }

    /// The parent of the overall label of `stop` as of `round`, with the
    /// round it was set in.
    pub(crate) fn label_parent(
        &self,
        round: usize,
        stop: u32,
    ) -> Result<(Parent, usize), raptor::Error> {
        (0..=round)
            .rev()
            .find_map(|r| self.parents[flat_matrix(r, stop as usize, self.stop_count)].map(|p| (p, r)))
            .ok_or_else(|| {
                raptor::Error::InvariantViolation(format!(
                    "no parent for stop {stop} at or before round {round}"
                ))
            })
    }

    pub(crate) fn transit_parent(&self, round: usize, stop: u32) -> Result<Parent, raptor::Error> {
        self.transit_parents[flat_matrix(round, stop as usize, self.stop_count)].ok_or_else(|| {
            raptor::Error::InvariantViolation(format!(
                "no transit arrival at stop {stop} in round {round}"
            ))
        })
    }
}

/// Converts a (round, stop_index) coordinate into a flat index
/// for the 1D parents/labels arrays.
#[inline(always)]
pub(crate) fn flat_matrix(outer: usize, inner: usize, count: usize) -> usize {
    (outer * count) + inner
}
