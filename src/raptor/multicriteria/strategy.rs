use crate::{
    raptor::{
        self, Journey, ParetoSet, RoutingStrategy, SearchContext, collect_active_patterns,
        find_trip,
        multicriteria::{
            arrival::{Boarding, BoardingComparator, DestinationLabel, McArrival, McLeg},
            state::McWorkerState,
        },
        path::{SearchLeg, build_journey},
    },
    shared::{Duration, Time},
    transit::TransitDataProvider,
};
use std::mem;
use tracing::trace;

/// Pareto optimal arrivals on time, rounds, generalized cost and, when
/// pass-through points are given, the points visited.
pub(crate) struct McRoutingStrategy<'a, T: TransitDataProvider> {
    ctx: &'a SearchContext<'a, T>,
    state: McWorkerState,
}

impl<'a, T: TransitDataProvider> McRoutingStrategy<'a, T> {
    pub fn new(ctx: &'a SearchContext<'a, T>) -> Self {
        let transit = ctx.transit();
        Self {
            ctx,
            state: McWorkerState::new(
                ctx.direction(),
                ctx.pass_through(),
                transit.stop_count(),
                transit.pattern_count(),
            ),
        }
    }

    fn backtrack(&self, destination: &DestinationLabel) -> Result<Vec<SearchLeg>, raptor::Error> {
        let mut legs = vec![SearchLeg::Egress {
            path: destination.egress,
        }];
        let mut next = Some(destination.arrival);
        let mut steps = 0;
        while let Some(index) = next {
            steps += 1;
            if steps > self.state.arena.len() {
                return Err(raptor::Error::InvariantViolation(
                    "cycle in multi-criteria arrival chain".into(),
                ));
            }
            let arrival = self.state.arrival(index);
            legs.push(match arrival.leg {
                McLeg::Access { path } => SearchLeg::Access { path },
                McLeg::Transit {
                    pattern,
                    schedule,
                    board_pos,
                    alight_pos,
                } => SearchLeg::Transit {
                    pattern,
                    schedule,
                    board_pos,
                    alight_pos,
                },
                McLeg::Transfer {
                    from_stop,
                    duration,
                } => SearchLeg::Transfer {
                    from_stop,
                    to_stop: arrival.stop,
                    duration,
                },
            });
            next = arrival.parent;
        }
        if !matches!(legs.last(), Some(SearchLeg::Access { .. })) {
            return Err(raptor::Error::InvariantViolation(
                "multi-criteria arrival chain does not start at an access".into(),
            ));
        }
        legs.reverse();
        Ok(legs)
    }
}

impl<T: TransitDataProvider> RoutingStrategy for McRoutingStrategy<'_, T> {
    fn setup_iteration(&mut self, _departure: Time) {
        self.state.reset();
    }

    fn seed_access(&mut self, departure: Time) {
        let direction = self.ctx.direction();
        let pass_through = self.ctx.pass_through();
        let heuristics = self.ctx.heuristics();
        for (path, access) in self.ctx.search_access().iter().enumerate() {
            let Some(time) = access.traverse(direction, departure) else {
                continue;
            };
            self.state.add_arrival(
                McArrival {
                    stop: access.stop,
                    round: 0,
                    time,
                    cost: access.cost,
                    c2: pass_through.update_c2(pass_through.initial_c2(), access.stop),
                    on_board: false,
                    parent: None,
                    leg: McLeg::Access { path },
                },
                heuristics,
            );
        }
    }

    fn prepare_round(&mut self, _round: usize) {
        self.state.new_round();
        let marked: Vec<u32> = self
            .state
            .prev_round_arrivals
            .iter()
            .filter(|&&a| self.state.is_alive(a))
            .map(|&a| self.state.arrival(a).stop)
            .collect();
        collect_active_patterns(
            self.ctx.transit(),
            self.ctx.direction(),
            marked.into_iter(),
            &mut self.state.active,
        );
    }

    fn route_transit(&mut self, round: usize) {
        let ctx = self.ctx;
        let transit = ctx.transit();
        let direction = ctx.direction();
        let slack = ctx.slack();
        let cost_params = ctx.cost();
        let pass_through = ctx.pass_through();
        let heuristics = ctx.heuristics();
        let board_slack = direction.board_slack(slack);
        let alight_slack = direction.alight_slack(slack);
        let round = round as u32;
        let comparator = BoardingComparator {
            direction,
            c2: pass_through.dominance(),
        };

        let active: Vec<(u32, usize)> = self
            .state
            .active
            .iter()
            .enumerate()
            .filter_map(|(pattern, start)| start.map(|s| (pattern as u32, s)))
            .collect();

        for (pattern, start) in active {
            let pattern_data = transit.pattern(pattern);
            let schedules = transit.schedules(pattern);
            let mut bag = ParetoSet::new(comparator);

            for pos in direction.positions_from(pattern_data.len(), start) {
                let stop = pattern_data.stop(pos);

                // PART A
                // Every boarded trip rides through this stop; try alighting
                // visiting a point may lift c2, so the bag is rebuilt
                let riding = mem::replace(&mut bag, ParetoSet::new(comparator)).into_vec();
                for mut boarding in riding {
                    boarding.c2 = pass_through.update_c2(boarding.c2, stop);
                    let alight_time = direction.alight_time(&boarding.trip.schedule, pos);
                    let ride = direction.duration_between(boarding.board_time, alight_time);
                    self.state.add_arrival(
                        McArrival {
                            stop,
                            round,
                            time: direction.plus(alight_time, alight_slack),
                            cost: boarding.cost + cost_params.ride_cost(ride),
                            c2: boarding.c2,
                            on_board: true,
                            parent: Some(boarding.parent),
                            leg: McLeg::Transit {
                                pattern,
                                schedule: schedules[boarding.trip.schedule_idx],
                                board_pos: boarding.board_pos,
                                alight_pos: pos,
                            },
                        },
                        heuristics,
                    );
                    bag.add(boarding);
                }

                // PART B
                // Board from every arrival the previous round left here
                for parent in self.state.arrivals_at(stop, round - 1) {
                    let arrival = *self.state.arrival(parent);
                    let first_boarding = arrival.round == 0;
                    let required = if first_boarding {
                        board_slack
                    } else {
                        board_slack + slack.transfer
                    };
                    let earliest = direction.plus(arrival.time, required);
                    let Some(trip) = find_trip(transit, direction, pattern, pos, earliest) else {
                        continue;
                    };
                    let board_time = direction.board_time(&trip.schedule, pos);
                    let wait = direction.duration_between(arrival.time, board_time) - required;
                    debug_assert!(wait >= Duration::ZERO, "boarded before the slack ran out");
                    bag.add(Boarding {
                        parent,
                        trip,
                        board_pos: pos,
                        board_time,
                        cost: arrival.cost + cost_params.boarding_cost(first_boarding, wait),
                        c2: arrival.c2,
                    });
                }
            }
        }
    }

    fn relax_transfers(&mut self, round: usize) {
        let transit = self.ctx.transit();
        let direction = self.ctx.direction();
        let cost_params = self.ctx.cost();
        let pass_through = self.ctx.pass_through();
        let heuristics = self.ctx.heuristics();

        let sources: Vec<u32> = self
            .state
            .round_arrivals
            .iter()
            .copied()
            .filter(|&a| self.state.is_alive(a) && self.state.arrival(a).on_board)
            .collect();
        for source in sources {
            let from = *self.state.arrival(source);
            for transfer in direction.transfers(transit, from.stop) {
                let target = direction.transfer_target(transfer);
                self.state.add_arrival(
                    McArrival {
                        stop: target,
                        round: round as u32,
                        time: direction.plus(from.time, transfer.duration),
                        cost: from.cost + cost_params.walk_cost(transfer.duration),
                        c2: pass_through.update_c2(from.c2, target),
                        on_board: false,
                        parent: Some(source),
                        leg: McLeg::Transfer {
                            from_stop: from.stop,
                            duration: transfer.duration,
                        },
                    },
                    heuristics,
                );
            }
        }
    }

    fn arrive_at_destination(&mut self, round: usize) -> bool {
        let direction = self.ctx.direction();
        let pass_through = self.ctx.pass_through();
        let egress_paths = self.ctx.search_egress();
        let mut reached = false;

        let sources: Vec<u32> = self
            .state
            .round_arrivals
            .iter()
            .copied()
            .filter(|&a| self.state.is_alive(a) && self.state.arrival(a).on_board)
            .collect();
        for source in sources {
            let arrival = *self.state.arrival(source);
            if !pass_through.accept_at_destination(arrival.c2) {
                continue;
            }
            for &egress in self.ctx.egress_at(arrival.stop) {
                let path = &egress_paths[egress];
                let Some(time) = path.traverse(direction, arrival.time) else {
                    continue;
                };
                let label = DestinationLabel {
                    rank: direction.rank(time),
                    round: round as u32,
                    cost: arrival.cost + path.cost,
                    time,
                    arrival: source,
                    egress,
                };
                if self.state.add_destination(label) {
                    trace!("Destination reached at {time} in round {round}");
                    reached = true;
                }
            }
        }
        reached
    }

    fn is_round_improved(&self) -> bool {
        self.state.is_improved()
    }

    fn extract_results(&self) -> Result<Vec<Journey>, raptor::Error> {
        #[cfg(debug_assertions)]
        self.state.validate()?;

        self.state
            .destination_arrivals()?
            .iter()
            .map(|destination| {
                let legs = self.backtrack(destination)?;
                build_journey(self.ctx, &legs, Some(destination.cost))
            })
            .collect()
    }
}
