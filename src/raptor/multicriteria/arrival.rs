use crate::{
    raptor::{BoardableTrip, C2Dominance, ParetoComparator, SearchDirection},
    shared::{Cost, Duration, Time},
    transit::ScheduleRef,
};

/// The leg that produced an arrival.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum McLeg {
    Access {
        path: usize,
    },
    Transit {
        pattern: u32,
        schedule: ScheduleRef,
        board_pos: usize,
        alight_pos: usize,
    },
    Transfer {
        from_stop: u32,
        duration: Duration,
    },
}

/// One stop arrival. Arrivals live in an arena for the whole iteration and
/// point at their predecessor by index, so paths survive the eviction of an
/// arrival from its stop's Pareto set.
#[derive(Debug, Clone, Copy)]
pub(crate) struct McArrival {
    pub stop: u32,
    pub round: u32,
    pub time: Time,
    pub cost: Cost,
    pub c2: u32,
    /// Reached by riding; only such arrivals may transfer or egress.
    pub on_board: bool,
    pub parent: Option<u32>,
    pub leg: McLeg,
}

/// What a stop's Pareto set compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ArrivalLabel {
    /// Time ordered so that smaller is better in either direction.
    pub rank: i64,
    pub round: u32,
    pub cost: Cost,
    pub c2: u32,
    pub on_board: bool,
    pub arrival: u32,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct ArrivalComparator {
    pub c2: C2Dominance,
}

impl ParetoComparator<ArrivalLabel> for ArrivalComparator {
    fn covers(&self, left: &ArrivalLabel, right: &ArrivalLabel) -> bool {
        left.rank <= right.rank
            && left.round <= right.round
            && left.cost <= right.cost
            && (left.on_board || !right.on_board)
            && self.c2.covers(left.c2, right.c2)
    }
}

/// A destination arrival. Only arrivals that satisfied every pass-through
/// point get here, so `c2` takes no part in the comparison.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DestinationLabel {
    pub rank: i64,
    pub round: u32,
    pub cost: Cost,
    pub time: Time,
    pub arrival: u32,
    pub egress: usize,
}

impl DestinationLabel {
    /// A bound used only for pruning; it points at no arrival.
    pub fn optimistic(rank: i64, round: u32, cost: Cost) -> Self {
        Self {
            rank,
            round,
            cost,
            time: Time::MIN,
            arrival: u32::MAX,
            egress: usize::MAX,
        }
    }
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct DestinationComparator;

impl ParetoComparator<DestinationLabel> for DestinationComparator {
    fn covers(&self, left: &DestinationLabel, right: &DestinationLabel) -> bool {
        left.rank <= right.rank && left.round <= right.round && left.cost <= right.cost
    }
}

/// A boarded trip carried along a pattern scan.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Boarding<'t> {
    pub parent: u32,
    pub trip: BoardableTrip<'t>,
    pub board_pos: usize,
    pub board_time: Time,
    pub cost: Cost,
    pub c2: u32,
}

/// Compares boardings of the route bag. Only boardings of the same trip are
/// comparable: a shorter ride at no higher cost stays at least as good at
/// every later stop, since both then visit the same stops at the same times.
#[derive(Debug, Clone, Copy)]
pub(crate) struct BoardingComparator {
    pub direction: SearchDirection,
    pub c2: C2Dominance,
}

impl ParetoComparator<Boarding<'_>> for BoardingComparator {
    fn covers(&self, left: &Boarding<'_>, right: &Boarding<'_>) -> bool {
        left.trip.schedule_idx == right.trip.schedule_idx
            && !self.direction.is_better(left.board_time, right.board_time)
            && left.cost <= right.cost
            && self.c2.covers(left.c2, right.c2)
    }
}
