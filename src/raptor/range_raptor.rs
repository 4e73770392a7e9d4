use crate::{
    raptor::{
        self, Journey, ParetoComparator, ParetoSet, Profile, SearchContext, SearchWindow,
        worker::RangeRaptorWorker,
    },
    shared::{Duration, Time},
    transit::TransitDataProvider,
};
use rayon::{ThreadPool, prelude::*};
use serde::Serialize;
use std::time::Instant;
use tracing::debug;

/// Dominance between journeys found by different iterations. A journey is
/// covered by one that leaves no earlier, arrives no later and uses no more
/// transfers; the multi-criteria profile also compares generalized cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct JourneyCriteria {
    pub include_cost: bool,
}

impl ParetoComparator<Journey> for JourneyCriteria {
    fn covers(&self, left: &Journey, right: &Journey) -> bool {
        left.departure_time >= right.departure_time
            && left.arrival_time <= right.arrival_time
            && left.transfers <= right.transfers
            && (!self.include_cost || left.generalized_cost <= right.generalized_cost)
    }
}

pub type JourneySet = ParetoSet<Journey, JourneyCriteria>;

/// Adds `journey`, replacing an identically scored journey when it sorts
/// first, so the final set does not depend on merge order.
pub fn merge_journey(set: &mut JourneySet, journey: Journey) -> bool {
    set.add_with_tie_break(journey, |candidate, existing| candidate < existing)
}

#[derive(Debug, Clone, Serialize)]
pub struct RaptorResponse {
    /// Pareto optimal journeys, sorted by departure then arrival.
    pub journeys: Vec<Journey>,
    pub search_window: SearchWindow,
    pub iterations: usize,
    pub heuristics_used: bool,
}

/// A prepared search: one RAPTOR iteration per step of the search window,
/// merged into one Pareto set.
pub struct RangeRaptor<'a, T: TransitDataProvider> {
    ctx: SearchContext<'a, T>,
    window: SearchWindow,
    step: Duration,
    pool: Option<&'a ThreadPool>,
}

impl<'a, T: TransitDataProvider> RangeRaptor<'a, T> {
    pub fn new(
        ctx: SearchContext<'a, T>,
        window: SearchWindow,
        step: Duration,
        pool: Option<&'a ThreadPool>,
    ) -> Self {
        Self {
            ctx,
            window,
            step,
            pool,
        }
    }

    pub fn window(&self) -> &SearchWindow {
        &self.window
    }

    pub fn context(&self) -> &SearchContext<'a, T> {
        &self.ctx
    }

    pub fn journey_criteria(&self) -> JourneyCriteria {
        JourneyCriteria {
            include_cost: self.ctx.profile() == Profile::MultiCriteria,
        }
    }

    /// Runs the single iteration starting at `instant`.
    pub fn run_iteration(&self, instant: Time) -> Result<Vec<Journey>, raptor::Error> {
        RangeRaptorWorker::new(&self.ctx).run_iteration(instant)
    }

    pub fn run(&self) -> Result<RaptorResponse, raptor::Error> {
        let heuristics_used = self.ctx.heuristics().is_some();
        if let Some(heuristics) = self.ctx.heuristics()
            && !heuristics.destination_reachable(self.ctx.search_access())
        {
            debug!("No access stop can reach the destination, skipping all iterations");
            return Ok(self.response(Vec::new(), 0, heuristics_used));
        }

        let now = Instant::now();
        let instants = self.window.instants(self.step);
        debug!(
            "Running {} iterations from {} to {} ({:?})",
            instants.len(),
            self.window.start(),
            self.window.end(),
            self.ctx.profile()
        );

        let per_iteration = match self.pool {
            Some(pool) => pool.install(|| {
                instants
                    .par_iter()
                    .map_init(
                        || RangeRaptorWorker::new(&self.ctx),
                        |worker, &instant| worker.run_iteration(instant),
                    )
                    .collect::<Result<Vec<_>, _>>()
            })?,
            None => {
                let mut worker = RangeRaptorWorker::new(&self.ctx);
                instants
                    .iter()
                    .map(|&instant| worker.run_iteration(instant))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        let mut set = JourneySet::new(self.journey_criteria());
        for journey in per_iteration.into_iter().flatten() {
            merge_journey(&mut set, journey);
        }
        set.validate()?;

        let mut journeys = set.into_vec();
        journeys.sort();
        debug!(
            "Search found {} journeys in {:?}",
            journeys.len(),
            now.elapsed()
        );
        Ok(self.response(journeys, instants.len(), heuristics_used))
    }

    fn response(
        &self,
        journeys: Vec<Journey>,
        iterations: usize,
        heuristics_used: bool,
    ) -> RaptorResponse {
        RaptorResponse {
            journeys,
            search_window: self.window,
            iterations,
            heuristics_used,
        }
    }
}
