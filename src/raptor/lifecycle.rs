use crate::{raptor::Journey, shared::Time};
use std::sync::Arc;

/// Hooks into the phases of a RAPTOR iteration, for debugging and tracing.
///
/// Iterations of one search may run on several threads, so observers must be
/// thread-safe. Every hook defaults to a no-op.
pub trait LifeCycleObserver: Send + Sync {
    fn setup_iteration(&self, _departure: Time) {}

    fn prepare_for_next_round(&self, _round: usize) {}

    fn transits_for_round_complete(&self, _round: usize) {}

    fn transfers_for_round_complete(&self, _round: usize) {}

    fn round_complete(&self, _round: usize, _destination_reached: bool) {}

    fn iteration_complete(&self, _departure: Time, _journeys: &[Journey]) {}
}

/// Fans lifecycle events out to every registered observer.
#[derive(Clone, Default)]
pub struct LifeCyclePublisher {
    observers: Vec<Arc<dyn LifeCycleObserver>>,
}

impl LifeCyclePublisher {
    pub fn new(observers: Vec<Arc<dyn LifeCycleObserver>>) -> Self {
        Self { observers }
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }

    pub fn setup_iteration(&self, departure: Time) {
        self.observers
            .iter()
            .for_each(|o| o.setup_iteration(departure));
    }

    pub fn prepare_for_next_round(&self, round: usize) {
        self.observers
            .iter()
            .for_each(|o| o.prepare_for_next_round(round));
    }

    pub fn transits_for_round_complete(&self, round: usize) {
        self.observers
            .iter()
            .for_each(|o| o.transits_for_round_complete(round));
    }

    pub fn transfers_for_round_complete(&self, round: usize) {
        self.observers
            .iter()
            .for_each(|o| o.transfers_for_round_complete(round));
    }

    pub fn round_complete(&self, round: usize, destination_reached: bool) {
        self.observers
            .iter()
            .for_each(|o| o.round_complete(round, destination_reached));
    }

    pub fn iteration_complete(&self, departure: Time, journeys: &[Journey]) {
        self.observers
            .iter()
            .for_each(|o| o.iteration_complete(departure, journeys));
    }
}

impl std::fmt::Debug for LifeCyclePublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LifeCyclePublisher")
            .field("observers", &self.observers.len())
            .finish()
    }
}
