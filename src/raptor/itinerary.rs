use crate::{
    shared::{Cost, Duration, Time},
    transit::{TransitDataProvider, TripRef},
};
use serde::Serialize;

/// One part of a journey, in real travel order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum Leg {
    /// Street leg from the origin to the first boarding stop.
    Access {
        stop: u32,
        departure_time: Time,
        arrival_time: Time,
        cost: Cost,
    },
    Transit {
        trip: TripRef,
        board_stop: u32,
        board_pos: u32,
        alight_stop: u32,
        alight_pos: u32,
        departure_time: Time,
        arrival_time: Time,
    },
    Transfer {
        from_stop: u32,
        to_stop: u32,
        departure_time: Time,
        arrival_time: Time,
    },
    /// Street leg from the last alighting stop to the destination.
    Egress {
        stop: u32,
        departure_time: Time,
        arrival_time: Time,
        cost: Cost,
    },
}

impl Leg {
    pub fn departure_time(&self) -> Time {
        match self {
            Leg::Access { departure_time, .. }
            | Leg::Transit { departure_time, .. }
            | Leg::Transfer { departure_time, .. }
            | Leg::Egress { departure_time, .. } => *departure_time,
        }
    }

    pub fn arrival_time(&self) -> Time {
        match self {
            Leg::Access { arrival_time, .. }
            | Leg::Transit { arrival_time, .. }
            | Leg::Transfer { arrival_time, .. }
            | Leg::Egress { arrival_time, .. } => *arrival_time,
        }
    }

    pub fn duration(&self) -> Duration {
        self.arrival_time() - self.departure_time()
    }

    pub fn is_transit(&self) -> bool {
        matches!(self, Leg::Transit { .. })
    }
}

/// A complete door-to-door result.
///
/// Field order matters: the derived ordering is the deterministic tie-break
/// between journeys with identical criteria.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Journey {
    pub departure_time: Time,
    pub arrival_time: Time,
    pub transfers: u32,
    pub generalized_cost: Cost,
    pub legs: Vec<Leg>,
}

impl Journey {
    pub fn duration(&self) -> Duration {
        self.arrival_time - self.departure_time
    }

    pub fn transit_legs(&self) -> impl Iterator<Item = &Leg> {
        self.legs.iter().filter(|leg| leg.is_transit())
    }

    /// Every stop the journey touches in travel order, including stops ridden
    /// through without alighting.
    pub fn visited_stops<T: TransitDataProvider>(&self, transit: &T) -> Vec<u32> {
        let mut stops = Vec::new();
        for leg in &self.legs {
            match leg {
                Leg::Access { stop, .. } | Leg::Egress { stop, .. } => stops.push(*stop),
                Leg::Transit {
                    trip,
                    board_pos,
                    alight_pos,
                    ..
                } => {
                    let pattern = transit.pattern(trip.pattern);
                    stops.extend((*board_pos..=*alight_pos).map(|pos| pattern.stop(pos as usize)));
                }
                Leg::Transfer {
                    from_stop, to_stop, ..
                } => {
                    stops.push(*from_stop);
                    stops.push(*to_stop);
                }
            }
        }
        stops.dedup();
        stops
    }
}

impl std::fmt::Display for Journey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} -> {} ({} transfers, cost {})",
            self.departure_time, self.arrival_time, self.transfers, self.generalized_cost
        )
    }
}
