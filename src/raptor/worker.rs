use crate::{
    raptor::{self, Journey, RoundTracker, RoutingStrategy, SearchContext, Strategy},
    shared::Time,
    transit::TransitDataProvider,
};
use tracing::trace;

/// Runs single RAPTOR iterations. A worker is reused across iterations; its
/// strategy clears the state when an iteration starts.
pub(crate) struct RangeRaptorWorker<'a, T: TransitDataProvider> {
    ctx: &'a SearchContext<'a, T>,
    strategy: Strategy<'a, T>,
}

impl<'a, T: TransitDataProvider> RangeRaptorWorker<'a, T> {
    pub fn new(ctx: &'a SearchContext<'a, T>) -> Self {
        Self {
            ctx,
            strategy: Strategy::new(ctx),
        }
    }

    /// One iteration departing (or, in reverse, arriving) at `instant`.
    pub fn run_iteration(&mut self, instant: Time) -> Result<Vec<Journey>, raptor::Error> {
        let lifecycle = self.ctx.lifecycle();
        lifecycle.setup_iteration(instant);
        self.strategy.setup_iteration(instant);
        self.strategy.seed_access(instant);

        let mut rounds = RoundTracker::new(self.ctx.max_rounds());
        let mut improved = self.strategy.is_round_improved();
        while rounds.has_more_rounds(improved) {
            let round = rounds.next_round();
            lifecycle.prepare_for_next_round(round);
            self.strategy.prepare_round(round);

            self.strategy.route_transit(round);
            lifecycle.transits_for_round_complete(round);
            let reached = self.strategy.arrive_at_destination(round);

            self.strategy.relax_transfers(round);
            lifecycle.transfers_for_round_complete(round);
            lifecycle.round_complete(round, reached);

            improved = self.strategy.is_round_improved();
            trace!("Round {round} at {instant}: improved {improved}, destination {reached}");
        }

        let journeys = self.strategy.extract_results()?;
        lifecycle.iteration_complete(instant, &journeys);
        Ok(journeys)
    }
}
