use crate::{
    raptor::{self, AccessEgress, Journey, Leg, SearchContext, SearchDirection},
    shared::{Cost, Duration, Time},
    transit::{ScheduleRef, TransitDataProvider},
};
use tracing::trace;

/// A leg as the search found it: positions, stops and access/egress roles
/// are in search direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SearchLeg {
    /// Index into the search's access paths.
    Access { path: usize },
    Transit {
        pattern: u32,
        schedule: ScheduleRef,
        board_pos: usize,
        alight_pos: usize,
    },
    Transfer {
        from_stop: u32,
        to_stop: u32,
        duration: Duration,
    },
    /// Index into the search's egress paths.
    Egress { path: usize },
}

enum RealLeg<'r> {
    Access(&'r AccessEgress),
    Transit {
        pattern: u32,
        schedule: ScheduleRef,
        board_pos: usize,
        alight_pos: usize,
    },
    Transfer {
        from_stop: u32,
        to_stop: u32,
        duration: Duration,
    },
    Egress(&'r AccessEgress),
}

/// Turns the legs of one destination arrival, given in search order, into a
/// [`Journey`] in real travel order.
///
/// Transit times come straight from the schedule. Transfers are placed right
/// after alighting, the access leg is shifted to end just in time for the
/// first boarding and the egress leg starts right after the last alighting.
/// `search_cost` is used as the generalized cost when the search tracked one;
/// otherwise the cost is computed from the legs.
pub(crate) fn build_journey<T: TransitDataProvider>(
    ctx: &SearchContext<'_, T>,
    search_legs: &[SearchLeg],
    search_cost: Option<Cost>,
) -> Result<Journey, raptor::Error> {
    let real = to_real_order(ctx, search_legs)?;
    let transit = ctx.transit();
    let slack = ctx.slack();
    let cost_params = ctx.cost();

    let (Some(RealLeg::Access(access)), Some(RealLeg::Egress(egress))) =
        (real.first(), real.last())
    else {
        return Err(invariant("journey must start with access and end with egress"));
    };
    let middle = &real[1..real.len() - 1];

    let mut legs = Vec::with_capacity(real.len());
    let mut cost = access.cost + egress.cost;
    let mut rides = 0u32;
    // arrival of the last transit leg, and walking done since
    let mut last_alight: Option<(Time, Duration)> = None;
    let mut first_departure: Option<Time> = None;

    for leg in middle {
        match *leg {
            RealLeg::Transit {
                pattern,
                schedule,
                board_pos,
                alight_pos,
            } => {
                let trip = transit.trip_schedule(pattern, &schedule);
                let departure_time = trip.departure(board_pos);
                let arrival_time = trip.arrival(alight_pos);
                if board_pos >= alight_pos {
                    return Err(invariant("transit leg alights before it boards"));
                }
                match last_alight {
                    None => {
                        first_departure = Some(departure_time);
                        cost += cost_params.boarding_cost(true, Duration::ZERO);
                    }
                    Some((arrived, walked)) => {
                        let ready = arrived + slack.alight + walked + slack.board + slack.transfer;
                        if departure_time < ready {
                            return Err(invariant("connection is shorter than the required slack"));
                        }
                        cost += cost_params.boarding_cost(false, departure_time - ready);
                    }
                }
                cost += cost_params.ride_cost(arrival_time - departure_time);
                let pattern_data = transit.pattern(pattern);
                legs.push(Leg::Transit {
                    trip: trip.trip_ref(),
                    board_stop: pattern_data.stop(board_pos),
                    board_pos: board_pos as u32,
                    alight_stop: pattern_data.stop(alight_pos),
                    alight_pos: alight_pos as u32,
                    departure_time,
                    arrival_time,
                });
                rides += 1;
                last_alight = Some((arrival_time, Duration::ZERO));
            }
            RealLeg::Transfer {
                from_stop,
                to_stop,
                duration,
            } => {
                let Some((arrived, walked)) = last_alight else {
                    return Err(invariant("transfer before the first transit leg"));
                };
                let departure_time = arrived + slack.alight + walked;
                legs.push(Leg::Transfer {
                    from_stop,
                    to_stop,
                    departure_time,
                    arrival_time: departure_time + duration,
                });
                cost += cost_params.walk_cost(duration);
                last_alight = Some((arrived, walked + duration));
            }
            RealLeg::Access(_) | RealLeg::Egress(_) => {
                return Err(invariant("access or egress in the middle of a journey"));
            }
        }
    }

    let (Some(first_departure), Some((last_arrival, walked))) = (first_departure, last_alight)
    else {
        return Err(invariant("journey without transit"));
    };
    if walked > Duration::ZERO {
        return Err(invariant("journey ends with a transfer"));
    }

    let access_end = first_departure - slack.board;
    let access_start = access
        .latest_departure(access_end)
        .ok_or_else(|| invariant("access leg can not reach the first boarding"))?;
    legs.insert(
        0,
        Leg::Access {
            stop: access.stop,
            departure_time: access_start,
            arrival_time: access_start + access.duration,
            cost: access.cost,
        },
    );

    let egress_end = egress
        .earliest_arrival(last_arrival + slack.alight)
        .ok_or_else(|| invariant("egress leg is closed after the last alighting"))?;
    legs.push(Leg::Egress {
        stop: egress.stop,
        departure_time: egress_end - egress.duration,
        arrival_time: egress_end,
        cost: egress.cost,
    });

    let journey = Journey {
        departure_time: access_start,
        arrival_time: egress_end,
        transfers: rides - 1,
        generalized_cost: search_cost.unwrap_or(cost),
        legs,
    };
    trace!("Built journey {journey}");
    Ok(journey)
}

fn to_real_order<'r, T: TransitDataProvider>(
    ctx: &'r SearchContext<'_, T>,
    search_legs: &[SearchLeg],
) -> Result<Vec<RealLeg<'r>>, raptor::Error> {
    let access = ctx.request().access_paths();
    let egress = ctx.request().egress_paths();
    let lookup = |paths: &'r [AccessEgress], path: usize| {
        paths
            .get(path)
            .ok_or_else(|| invariant("unknown access or egress path"))
    };

    match ctx.direction() {
        SearchDirection::Forward => search_legs
            .iter()
            .map(|leg| {
                Ok(match *leg {
                    SearchLeg::Access { path } => RealLeg::Access(lookup(access, path)?),
                    SearchLeg::Egress { path } => RealLeg::Egress(lookup(egress, path)?),
                    SearchLeg::Transit {
                        pattern,
                        schedule,
                        board_pos,
                        alight_pos,
                    } => RealLeg::Transit {
                        pattern,
                        schedule,
                        board_pos,
                        alight_pos,
                    },
                    SearchLeg::Transfer {
                        from_stop,
                        to_stop,
                        duration,
                    } => RealLeg::Transfer {
                        from_stop,
                        to_stop,
                        duration,
                    },
                })
            })
            .collect(),
        SearchDirection::Reverse => search_legs
            .iter()
            .rev()
            .map(|leg| {
                Ok(match *leg {
                    SearchLeg::Access { path } => RealLeg::Egress(lookup(egress, path)?),
                    SearchLeg::Egress { path } => RealLeg::Access(lookup(access, path)?),
                    SearchLeg::Transit {
                        pattern,
                        schedule,
                        board_pos,
                        alight_pos,
                    } => RealLeg::Transit {
                        pattern,
                        schedule,
                        board_pos: alight_pos,
                        alight_pos: board_pos,
                    },
                    SearchLeg::Transfer {
                        from_stop,
                        to_stop,
                        duration,
                    } => RealLeg::Transfer {
                        from_stop: to_stop,
                        to_stop: from_stop,
                        duration,
                    },
                })
            })
            .collect(),
    }
}

fn invariant(msg: &str) -> raptor::Error {
    raptor::Error::InvariantViolation(format!("path reconstruction: {msg}"))
}
