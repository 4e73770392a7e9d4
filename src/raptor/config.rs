use crate::{
    raptor::{
        self, DynamicSearchWindowCoefficients, Heuristics, Profile, RangeRaptor, RaptorRequest,
        RaptorResponse, SearchContext, SearchWindow, SearchWindowCalculator,
    },
    shared::Duration,
    transit::TransitDataProvider,
};
use rayon::{ThreadPool, ThreadPoolBuilder};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Long-lived settings shared by every search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RaptorTuningParameters {
    /// Threads used to run the iterations of one search. `0` runs them on the
    /// calling thread.
    pub search_thread_pool_size: usize,
    /// Upper bound for a request's `max_transfers`, and its default.
    pub max_number_of_transfers: usize,
    /// Distance between two Range-RAPTOR iterations.
    pub iteration_step: Duration,
    pub dynamic_search_window: DynamicSearchWindowCoefficients,
}

impl Default for RaptorTuningParameters {
    fn default() -> Self {
        Self {
            search_thread_pool_size: 0,
            max_number_of_transfers: 12,
            iteration_step: Duration::from_minutes(1),
            dynamic_search_window: DynamicSearchWindowCoefficients::default(),
        }
    }
}

impl RaptorTuningParameters {
    fn validate(&self) -> Result<(), raptor::Error> {
        if self.iteration_step <= Duration::ZERO {
            return Err(raptor::Error::InvalidTuning(format!(
                "iteration_step must be positive, got {}",
                self.iteration_step
            )));
        }
        self.dynamic_search_window
            .validate()
            .map_err(raptor::Error::InvalidTuning)
    }
}

/// Entry point of the routing core. Owns the tuning parameters and the
/// optional search thread pool.
///
/// ```
/// use rangeraptor::raptor::{RaptorConfig, RaptorTuningParameters};
///
/// let config = RaptorConfig::new(RaptorTuningParameters::default()).unwrap();
/// assert!(!config.is_multi_threaded());
/// config.shutdown();
/// ```
#[derive(Default)]
pub struct RaptorConfig {
    tuning: RaptorTuningParameters,
    thread_pool: Option<ThreadPool>,
}

impl RaptorConfig {
    pub fn new(tuning: RaptorTuningParameters) -> Result<Self, raptor::Error> {
        tuning.validate()?;
        let thread_pool = match tuning.search_thread_pool_size {
            0 => None,
            size => Some(
                ThreadPoolBuilder::new()
                    .num_threads(size)
                    .thread_name(|i| format!("raptor-{i}"))
                    .build()?,
            ),
        };
        debug!(
            "Raptor config ready ({} search threads)",
            tuning.search_thread_pool_size
        );
        Ok(Self {
            tuning,
            thread_pool,
        })
    }

    pub fn tuning(&self) -> &RaptorTuningParameters {
        &self.tuning
    }

    pub fn is_multi_threaded(&self) -> bool {
        self.thread_pool.is_some()
    }

    pub fn search_window_calculator(&self) -> SearchWindowCalculator {
        SearchWindowCalculator::new(self.tuning.dynamic_search_window.clone())
    }

    /// Validates `request` and prepares a search over `transit`. Heuristics
    /// are computed here when the profile or a dynamic window needs them.
    pub fn search<'a, T: TransitDataProvider>(
        &'a self,
        transit: &'a T,
        request: RaptorRequest,
    ) -> Result<RangeRaptor<'a, T>, raptor::Error> {
        let mut ctx = SearchContext::new(transit, &self.tuning, request)?;

        let needs_heuristics = ctx.profile() == Profile::MultiCriteria
            || ctx.request().search_window_width().is_none();
        if needs_heuristics {
            let heuristics = Heuristics::compute(&ctx);
            ctx.set_heuristics(heuristics);
        }

        let width = match ctx.request().search_window_width() {
            Some(width) => width,
            None => {
                let min_travel_time = ctx
                    .heuristics()
                    .and_then(|h| h.min_travel_time(ctx.search_access()));
                let width = self.search_window_calculator().calculate(min_travel_time);
                debug!("Dynamic search window: {width} (min travel time {min_travel_time:?})");
                width
            }
        };
        let window = SearchWindow::new(ctx.request().time(), width, ctx.direction());

        Ok(RangeRaptor::new(
            ctx,
            window,
            self.tuning.iteration_step,
            self.thread_pool.as_ref(),
        ))
    }

    /// Runs a search to completion.
    pub fn route<T: TransitDataProvider>(
        &self,
        transit: &T,
        request: RaptorRequest,
    ) -> Result<RaptorResponse, raptor::Error> {
        self.search(transit, request)?.run()
    }

    /// Releases the thread pool. Searches borrow the config, so none can be in
    /// flight here.
    pub fn shutdown(self) {
        if self.thread_pool.is_some() {
            debug!("Shutting down the search thread pool");
        }
    }
}
