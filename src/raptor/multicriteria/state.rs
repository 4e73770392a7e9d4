use crate::{
    raptor::{
        self, Heuristics, ParetoSet, PassThroughPointsService, SearchDirection,
        multicriteria::arrival::{
            ArrivalComparator, ArrivalLabel, DestinationComparator, DestinationLabel, McArrival,
        },
    },
};
use bitvec::prelude::*;
use std::mem;

/// Pareto state of the multi-criteria worker: one set of arrivals per stop,
/// one set of destination arrivals and the arena they all point into.
pub(crate) struct McWorkerState {
    direction: SearchDirection,
    pub(crate) arena: Vec<McArrival>,
    alive: BitVec<usize, Lsb0>,
    stops: Vec<ParetoSet<ArrivalLabel, ArrivalComparator>>,
    pub(crate) destinations: ParetoSet<DestinationLabel, DestinationComparator>,
    /// Arrivals created in the current round, in creation order.
    pub(crate) round_arrivals: Vec<u32>,
    pub(crate) prev_round_arrivals: Vec<u32>,
    pub(crate) active: Vec<Option<usize>>,
}

impl McWorkerState {
    pub fn new(
        direction: SearchDirection,
        pass_through: &PassThroughPointsService,
        stop_count: usize,
        pattern_count: usize,
    ) -> Self {
        let comparator = ArrivalComparator {
            c2: pass_through.dominance(),
        };
        Self {
            direction,
            arena: Vec::with_capacity(1024),
            alive: BitVec::with_capacity(1024),
            stops: (0..stop_count)
                .map(|_| ParetoSet::new(comparator))
                .collect(),
            destinations: ParetoSet::new(DestinationComparator),
            round_arrivals: Vec::new(),
            prev_round_arrivals: Vec::new(),
            active: vec![None; pattern_count],
        }
    }

    pub fn reset(&mut self) {
        self.arena.clear();
        self.alive.clear();
        self.stops.iter_mut().for_each(ParetoSet::clear);
        self.destinations.clear();
        self.round_arrivals.clear();
        self.prev_round_arrivals.clear();
        self.active.fill(None);
    }

    pub fn new_round(&mut self) {
        self.prev_round_arrivals = mem::take(&mut self.round_arrivals);
        self.active.fill(None);
    }

    pub fn is_alive(&self, arrival: u32) -> bool {
        self.alive[arrival as usize]
    }

    pub fn arrival(&self, arrival: u32) -> &McArrival {
        &self.arena[arrival as usize]
    }

    /// Surviving arrivals at `stop` made in exactly `round`.
    pub fn arrivals_at(&self, stop: u32, round: u32) -> Vec<u32> {
        self.stops[stop as usize]
            .iter()
            .filter(|label| label.round == round)
            .map(|label| label.arrival)
            .collect()
    }

    /// Adds `arrival` unless it is dominated at its stop or, by the
    /// heuristic bounds, can not lead to a non-dominated destination arrival.
    pub fn add_arrival(&mut self, arrival: McArrival, heuristics: Option<&Heuristics>) -> bool {
        if let Some(heuristics) = heuristics {
            let (Some(duration), Some(boardings), Some(cost)) = (
                heuristics.min_duration(arrival.stop),
                heuristics.min_boardings(arrival.stop),
                heuristics.min_cost(arrival.stop),
            ) else {
                return false;
            };
            let optimistic = DestinationLabel::optimistic(
                self.direction
                    .rank(self.direction.plus(arrival.time, duration)),
                arrival.round + boardings,
                arrival.cost + cost,
            );
            if self.destinations.is_covered(&optimistic) {
                return false;
            }
        }

        let index = self.arena.len() as u32;
        let label = ArrivalLabel {
            rank: self.direction.rank(arrival.time),
            round: arrival.round,
            cost: arrival.cost,
            c2: arrival.c2,
            on_board: arrival.on_board,
            arrival: index,
        };
        let alive = &mut self.alive;
        let accepted = self.stops[arrival.stop as usize]
            .add_or_evict(label, |evicted| alive.set(evicted.arrival as usize, false));
        if accepted {
            self.arena.push(arrival);
            self.alive.push(true);
            self.round_arrivals.push(index);
        }
        accepted
    }

    pub fn add_destination(&mut self, label: DestinationLabel) -> bool {
        self.destinations.add(label)
    }

    pub fn is_improved(&self) -> bool {
        self.round_arrivals.iter().any(|&a| self.is_alive(a))
    }

    /// Destination arrivals in a stable order.
    pub fn destination_arrivals(&self) -> Result<Vec<DestinationLabel>, raptor::Error> {
        self.destinations.validate()?;
        let mut destinations: Vec<_> = self.destinations.iter().copied().collect();
        destinations.sort_by_key(|d| (d.rank, d.round, d.cost, d.arrival));
        Ok(destinations)
    }

    /// Checks every stop set; used by tests and debug builds.
    pub fn validate(&self) -> Result<(), raptor::Error> {
        for set in &self.stops {
            set.validate()?;
        }
        Ok(())
    }
}
