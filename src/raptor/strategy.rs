use crate::{
    raptor::{
        self, Journey, Profile, SearchContext, multicriteria::McRoutingStrategy,
        standard::StdRoutingStrategy,
    },
    shared::Time,
    transit::TransitDataProvider,
};

/// The phases of one RAPTOR iteration. A strategy owns its worker state; the
/// worker drives the phases and decides when to stop.
pub(crate) trait RoutingStrategy {
    /// Clears all state from a previous iteration.
    fn setup_iteration(&mut self, departure: Time);

    /// Round 0: reach the stops of every access path.
    fn seed_access(&mut self, departure: Time);

    fn prepare_round(&mut self, round: usize);

    /// Scans every pattern touched by the previous round.
    fn route_transit(&mut self, round: usize);

    /// Walks from stops improved by transit in this round.
    fn relax_transfers(&mut self, round: usize);

    /// Records destination arrivals; returns whether any were made.
    fn arrive_at_destination(&mut self, round: usize) -> bool;

    /// Whether the last phase run improved anything.
    fn is_round_improved(&self) -> bool;

    fn extract_results(&self) -> Result<Vec<Journey>, raptor::Error>;
}

pub(crate) enum Strategy<'a, T: TransitDataProvider> {
    Standard(StdRoutingStrategy<'a, T>),
    MultiCriteria(McRoutingStrategy<'a, T>),
}

impl<'a, T: TransitDataProvider> Strategy<'a, T> {
    pub fn new(ctx: &'a SearchContext<'a, T>) -> Self {
        match ctx.profile() {
            Profile::Standard => Strategy::Standard(StdRoutingStrategy::new(ctx)),
            Profile::MultiCriteria => Strategy::MultiCriteria(McRoutingStrategy::new(ctx)),
        }
    }
}

macro_rules! dispatch {
    ($self:ident, $s:ident => $call:expr) => {
        match $self {
            Strategy::Standard($s) => $call,
            Strategy::MultiCriteria($s) => $call,
        }
    };
}

impl<T: TransitDataProvider> RoutingStrategy for Strategy<'_, T> {
    fn setup_iteration(&mut self, departure: Time) {
        dispatch!(self, s => s.setup_iteration(departure))
    }

    fn seed_access(&mut self, departure: Time) {
        dispatch!(self, s => s.seed_access(departure))
    }

    fn prepare_round(&mut self, round: usize) {
        dispatch!(self, s => s.prepare_round(round))
    }

    fn route_transit(&mut self, round: usize) {
        dispatch!(self, s => s.route_transit(round))
    }

    fn relax_transfers(&mut self, round: usize) {
        dispatch!(self, s => s.relax_transfers(round))
    }

    fn arrive_at_destination(&mut self, round: usize) -> bool {
        dispatch!(self, s => s.arrive_at_destination(round))
    }

    fn is_round_improved(&self) -> bool {
        dispatch!(self, s => s.is_round_improved())
    }

    fn extract_results(&self) -> Result<Vec<Journey>, raptor::Error> {
        dispatch!(self, s => s.extract_results())
    }
}
