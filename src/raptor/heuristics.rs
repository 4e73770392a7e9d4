use crate::{
    raptor::{AccessEgress, CostParameters, RoundTracker, SearchContext, SearchDirection, Slack},
    shared::{Cost, Duration},
    transit::TransitDataProvider,
};
use bitvec::prelude::*;
use std::time::Instant;
use tracing::debug;

/// Per-stop lower bounds on what is still needed to reach the end of the
/// search: duration, number of boardings and generalized cost.
///
/// Computed once per search by relaxing the network against the search
/// direction, starting at the search's egress stops. Schedules are reduced to
/// the fastest hop and shortest dwell of each pattern, so every bound is
/// optimistic and safe to prune with.
#[derive(Debug, Clone)]
pub struct Heuristics {
    duration: Vec<Option<Duration>>,
    boardings: Vec<u32>,
    cost: Vec<Cost>,
}

impl Heuristics {
    pub fn compute<T: TransitDataProvider>(ctx: &SearchContext<'_, T>) -> Self {
        let now = Instant::now();
        let heuristics = Self::compute_bounds(
            ctx.transit(),
            ctx.direction(),
            ctx.search_egress(),
            ctx.slack(),
            ctx.cost(),
            ctx.max_rounds(),
        );
        debug!(
            "Heuristics reach {} of {} stops, took {:?}",
            heuristics.duration.iter().filter(|d| d.is_some()).count(),
            heuristics.duration.len(),
            now.elapsed()
        );
        heuristics
    }

    pub(crate) fn compute_bounds<T: TransitDataProvider>(
        transit: &T,
        direction: SearchDirection,
        egress: &[AccessEgress],
        slack: &Slack,
        cost_params: &CostParameters,
        max_rounds: usize,
    ) -> Self {
        let stop_count = transit.stop_count();
        let mut bounds = Self {
            duration: vec![None; stop_count],
            boardings: vec![u32::MAX; stop_count],
            cost: vec![Cost::MAX; stop_count],
        };
        let mut marked = bitvec!(usize, Lsb0; 0; stop_count);
        for path in egress {
            let stop = path.stop as usize;
            bounds.improve(stop, path.duration, path.cost, 0);
            marked.set(stop, true);
        }
        bounds.relax_transfers(transit, direction, cost_params, &mut marked, 0);

        let hops = PatternHops::new(transit);
        let board_slack = direction.board_slack(slack);
        let alight_slack = direction.alight_slack(slack);
        let mut tracker = RoundTracker::new(max_rounds);
        let mut improved = marked.any();

        while tracker.has_more_rounds(improved) {
            let round = tracker.next_round() as u32;
            let mut patterns: Vec<u32> = marked
                .iter_ones()
                .flat_map(|stop| transit.patterns_by_stop(stop as u32).iter().copied())
                .collect();
            patterns.sort_unstable();
            patterns.dedup();

            let mut next_marked = bitvec!(usize, Lsb0; 0; stop_count);
            for pattern in patterns {
                let stops = &transit.pattern(pattern).stops;
                let Some(hop) = hops.get(pattern) else {
                    continue;
                };
                let len = stops.len();
                // scan against search order so the downstream bound is known
                let first = if direction.is_forward() { len - 1 } else { 0 };
                let mut on_board: Option<(Duration, Cost)> = None;
                let mut prev_pos: Option<usize> = None;
                for pos in direction.opposite().positions_from(len, first) {
                    let stop = stops[pos] as usize;
                    let segment = prev_pos.map(|prev| hop.min_hop[pos.min(prev)]);

                    if let (Some((d, c)), Some(segment)) = (on_board, segment)
                        && bounds.improve(
                            stop,
                            board_slack + segment + d,
                            cost_params.board_cost
                                + Cost::floor_of_duration(segment, cost_params.transit_reluctance)
                                + c,
                            round,
                        )
                    {
                        next_marked.set(stop, true);
                    }

                    let alight = bounds.duration[stop].map(|d| (alight_slack + d, bounds.cost[stop]));
                    let stay = match (on_board, segment) {
                        (Some((d, c)), Some(segment)) => {
                            let ride = segment + hop.min_dwell[pos];
                            Some((
                                d + ride,
                                c + Cost::floor_of_duration(segment, cost_params.transit_reluctance)
                                    + Cost::floor_of_duration(
                                        hop.min_dwell[pos],
                                        cost_params.transit_reluctance,
                                    ),
                            ))
                        }
                        _ => None,
                    };
                    on_board = match (alight, stay) {
                        (Some(a), Some(s)) => Some((a.0.min(s.0), a.1.min(s.1))),
                        (a, s) => a.or(s),
                    };
                    prev_pos = Some(pos);
                }
            }
            bounds.relax_transfers(transit, direction, cost_params, &mut next_marked, round);
            improved = next_marked.any();
            marked = next_marked;
        }
        bounds
    }

    /// Lowers the bounds of `stop`; returns whether anything changed.
    fn improve(&mut self, stop: usize, duration: Duration, cost: Cost, round: u32) -> bool {
        let mut improved = false;
        if self.duration[stop].is_none_or(|d| duration < d) {
            self.duration[stop] = Some(duration);
            improved = true;
        }
        if cost < self.cost[stop] {
            self.cost[stop] = cost;
            improved = true;
        }
        if self.boardings[stop] == u32::MAX {
            self.boardings[stop] = round;
            improved = true;
        }
        improved
    }

    /// One walking step from every marked stop, against search direction.
    fn relax_transfers<T: TransitDataProvider>(
        &mut self,
        transit: &T,
        direction: SearchDirection,
        cost_params: &CostParameters,
        marked: &mut BitSlice<usize, Lsb0>,
        round: u32,
    ) {
        let walk = direction.opposite();
        let sources: Vec<usize> = marked.iter_ones().collect();
        for stop in sources {
            let Some(duration) = self.duration[stop] else {
                continue;
            };
            let cost = self.cost[stop];
            let boardings = self.boardings[stop].min(round);
            for transfer in walk.transfers(transit, stop as u32) {
                let target = walk.transfer_target(transfer) as usize;
                let walk_cost = Cost::floor_of_duration(transfer.duration, cost_params.walk_reluctance);
                if self.improve(target, transfer.duration + duration, walk_cost + cost, boardings) {
                    marked.set(target, true);
                }
            }
        }
    }

    pub fn is_reachable(&self, stop: u32) -> bool {
        self.duration[stop as usize].is_some()
    }

    pub fn min_duration(&self, stop: u32) -> Option<Duration> {
        self.duration[stop as usize]
    }

    pub fn min_boardings(&self, stop: u32) -> Option<u32> {
        self.is_reachable(stop)
            .then_some(self.boardings[stop as usize])
    }

    pub fn min_cost(&self, stop: u32) -> Option<Cost> {
        self.is_reachable(stop).then_some(self.cost[stop as usize])
    }

    /// Shortest possible door-to-door time using any of the given access
    /// paths, or `None` if none of them can reach the end of the search.
    pub fn min_travel_time(&self, access: &[AccessEgress]) -> Option<Duration> {
        access
            .iter()
            .filter_map(|path| self.min_duration(path.stop).map(|d| path.duration + d))
            .min()
    }

    pub fn destination_reachable(&self, access: &[AccessEgress]) -> bool {
        access.iter().any(|path| self.is_reachable(path.stop))
    }
}

struct Hops {
    /// Fastest ride from position `i` to `i + 1`.
    min_hop: Vec<Duration>,
    /// Shortest dwell at position `i`.
    min_dwell: Vec<Duration>,
}

/// Schedule-free reduction of every pattern.
struct PatternHops {
    patterns: Vec<Option<Hops>>,
}

impl PatternHops {
    fn new<T: TransitDataProvider>(transit: &T) -> Self {
        let patterns = (0..transit.pattern_count() as u32)
            .map(|index| {
                let pattern = transit.pattern(index);
                if pattern.trips.is_empty() {
                    return None;
                }
                let len = pattern.len();
                let mut min_hop = vec![Duration::from_seconds(i32::MAX); len.saturating_sub(1)];
                let mut min_dwell = vec![Duration::from_seconds(i32::MAX); len];
                for trip in pattern.trips.iter() {
                    for pos in 0..len {
                        min_dwell[pos] = min_dwell[pos].min(trip.departure(pos) - trip.arrival(pos));
                        if pos + 1 < len {
                            min_hop[pos] = min_hop[pos].min(trip.arrival(pos + 1) - trip.departure(pos));
                        }
                    }
                }
                Some(Hops { min_hop, min_dwell })
            })
            .collect();
        Self { patterns }
    }

    fn get(&self, pattern: u32) -> Option<&Hops> {
        self.patterns[pattern as usize].as_ref()
    }
}
