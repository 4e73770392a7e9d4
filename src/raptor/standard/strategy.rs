use crate::{
    raptor::{
        self, BoardableTrip, Journey, RoutingStrategy, SearchContext, collect_active_patterns,
        find_trip,
        path::{SearchLeg, build_journey},
        standard::state::{DestinationArrival, Parent, StdWorkerState, Update},
    },
    shared::Time,
    transit::TransitDataProvider,
};
use tracing::trace;

/// Earliest arrival per number of boardings.
pub(crate) struct StdRoutingStrategy<'a, T: TransitDataProvider> {
    ctx: &'a SearchContext<'a, T>,
    state: StdWorkerState,
}

impl<'a, T: TransitDataProvider> StdRoutingStrategy<'a, T> {
    pub fn new(ctx: &'a SearchContext<'a, T>) -> Self {
        let transit = ctx.transit();
        Self {
            ctx,
            state: StdWorkerState::new(
                ctx.direction(),
                transit.stop_count(),
                transit.pattern_count(),
                ctx.max_rounds(),
            ),
        }
    }

    /// Whether `found` is a better trip than the one already boarded.
    fn is_better_trip(&self, found: &BoardableTrip, current: &BoardableTrip) -> bool {
        if self.ctx.direction().is_forward() {
            found.schedule_idx < current.schedule_idx
        } else {
            found.schedule_idx > current.schedule_idx
        }
    }

    fn backtrack(
        &self,
        round: usize,
        destination: DestinationArrival,
    ) -> Result<Vec<SearchLeg>, raptor::Error> {
        let mut legs = vec![SearchLeg::Egress {
            path: destination.egress,
        }];
        let mut stop = destination.stop;
        let mut round = round;
        let mut on_transit = true;

        // every round adds at most a transit leg and a transfer
        for _ in 0..=2 * self.state.rounds() + 1 {
            let (parent, found_round) = if on_transit {
                (self.state.transit_parent(round, stop)?, round)
            } else {
                self.state.label_parent(round, stop)?
            };
            trace!("Backtracking stop {stop} in round {found_round}: {parent:?}");
            match parent {
                Parent::Transit {
                    pattern,
                    schedule,
                    board_stop,
                    board_pos,
                    alight_pos,
                } => {
                    legs.push(SearchLeg::Transit {
                        pattern,
                        schedule,
                        board_pos,
                        alight_pos,
                    });
                    stop = board_stop;
                    round = found_round.checked_sub(1).ok_or_else(|| {
                        raptor::Error::InvariantViolation("transit leg in round 0".into())
                    })?;
                    on_transit = false;
                }
                Parent::Transfer {
                    from_stop,
                    duration,
                } => {
                    legs.push(SearchLeg::Transfer {
                        from_stop,
                        to_stop: stop,
                        duration,
                    });
                    stop = from_stop;
                    round = found_round;
                    on_transit = true;
                }
                Parent::Access { path } => {
                    legs.push(SearchLeg::Access { path });
                    legs.reverse();
                    return Ok(legs);
                }
            }
        }
        Err(raptor::Error::InvariantViolation(format!(
            "path to stop {} in round {round} does not end at an access",
            destination.stop
        )))
    }
}

impl<T: TransitDataProvider> RoutingStrategy for StdRoutingStrategy<'_, T> {
    fn setup_iteration(&mut self, _departure: Time) {
        self.state.reset();
    }

    fn seed_access(&mut self, departure: Time) {
        let direction = self.ctx.direction();
        for (path, access) in self.ctx.search_access().iter().enumerate() {
            if let Some(time) = access.traverse(direction, departure) {
                self.state
                    .updates
                    .push(Update::new(access.stop, time, Parent::Access { path }));
            }
        }
        self.state.run_updates(0);
    }

    fn prepare_round(&mut self, round: usize) {
        self.state.new_round(round);
        let marked = self
            .state
            .prev_marked_stops
            .iter_ones()
            .map(|stop| stop as u32);
        collect_active_patterns(
            self.ctx.transit(),
            self.ctx.direction(),
            marked,
            &mut self.state.active,
        );
    }

    fn route_transit(&mut self, round: usize) {
        let transit = self.ctx.transit();
        let direction = self.ctx.direction();
        let slack = self.ctx.slack();
        let board_slack = direction.board_slack(slack);
        let alight_slack = direction.alight_slack(slack);
        let unreached = direction.unreached();

        for (pattern, start) in self.state.active.iter().enumerate() {
            let Some(start) = *start else {
                continue;
            };
            let pattern = pattern as u32;
            let pattern_data = transit.pattern(pattern);
            let schedules = transit.schedules(pattern);
            let mut on_board: Option<(BoardableTrip, usize, u32)> = None;

            for pos in direction.positions_from(pattern_data.len(), start) {
                let stop = pattern_data.stop(pos);

                // PART A
                // Ride the boarded trip and record any stop where we improve
                if let Some((trip, board_pos, board_stop)) = &on_board {
                    let time = direction.plus(direction.alight_time(&trip.schedule, pos), alight_slack);
                    if direction.is_better(time, self.state.tau_star_transit[stop as usize])
                        && direction.is_better(time, self.state.best_destination)
                    {
                        self.state.updates.push(Update::new(
                            stop,
                            time,
                            Parent::Transit {
                                pattern,
                                schedule: schedules[trip.schedule_idx],
                                board_stop: *board_stop,
                                board_pos: *board_pos,
                                alight_pos: pos,
                            },
                        ));
                    }
                }

                // PART B
                // See if the previous round lets us catch a better trip here
                let label = self.state.label(round - 1, stop);
                if label == unreached {
                    continue;
                }
                let mut earliest = direction.plus(label, board_slack);
                if !self.state.is_access_label(round - 1, stop) {
                    earliest = direction.plus(earliest, slack.transfer);
                }
                if let Some((trip, _, _)) = &on_board
                    && direction.is_better(direction.board_time(&trip.schedule, pos), earliest)
                {
                    continue;
                }
                if let Some(found) = find_trip(transit, direction, pattern, pos, earliest) {
                    let better = match &on_board {
                        Some((current, _, _)) => self.is_better_trip(&found, current),
                        None => true,
                    };
                    if better {
                        on_board = Some((found, pos, stop));
                    }
                }
            }
        }
        self.state.run_transit_updates(round);
    }

    fn relax_transfers(&mut self, round: usize) {
        let transit = self.ctx.transit();
        let direction = self.ctx.direction();
        for stop in self.state.transit_marked.iter_ones() {
            let stop = stop as u32;
            let departure = self.state.transit_label(round, stop);
            for transfer in direction.transfers(transit, stop) {
                let target = direction.transfer_target(transfer);
                let time = direction.plus(departure, transfer.duration);
                if direction.is_better(time, self.state.tau_star[target as usize])
                    && direction.is_better(time, self.state.best_destination)
                {
                    self.state.updates.push(Update::new(
                        target,
                        time,
                        Parent::Transfer {
                            from_stop: stop,
                            duration: transfer.duration,
                        },
                    ));
                }
            }
        }
        self.state.run_updates(round);
    }

    fn arrive_at_destination(&mut self, round: usize) -> bool {
        let direction = self.ctx.direction();
        let egress_paths = self.ctx.search_egress();
        let arrivals: Vec<DestinationArrival> = self
            .state
            .transit_marked
            .iter_ones()
            .flat_map(|stop| {
                let stop = stop as u32;
                let time = self.state.transit_label(round, stop);
                self.ctx.egress_at(stop).iter().filter_map(move |&egress| {
                    egress_paths[egress]
                        .traverse(direction, time)
                        .map(|arrival| DestinationArrival {
                            time: arrival,
                            stop,
                            egress,
                        })
                })
            })
            .collect();
        for arrival in arrivals {
            self.state.arrive_at_destination(round, arrival);
        }
        self.state.destination(round).is_some()
    }

    fn is_round_improved(&self) -> bool {
        self.state.is_improved()
    }

    fn extract_results(&self) -> Result<Vec<Journey>, raptor::Error> {
        (1..=self.state.rounds())
            .filter_map(|round| self.state.destination(round).map(|d| (round, d)))
            .map(|(round, destination)| {
                let legs = self.backtrack(round, destination)?;
                build_journey(self.ctx, &legs, None)
            })
            .collect()
    }
}
