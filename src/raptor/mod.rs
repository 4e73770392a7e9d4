//! The routing core.
//!
//! A request is validated into a [`SearchContext`], turned into a
//! [`RangeRaptor`] search by [`RaptorConfig::search`] and run over every
//! departure minute of its search window. Each minute is one RAPTOR
//! iteration executed by a worker pairing a [`RoutingStrategy`] with its
//! state; the per-iteration journeys are merged into one Pareto set.

mod calculator;
mod config;
mod context;
mod discovery;
mod heuristics;
mod itinerary;
mod lifecycle;
mod multicriteria;
mod pareto;
mod passthrough;
mod path;
mod range_raptor;
mod request;
mod round;
mod standard;
mod strategy;
mod window;
mod worker;

pub use calculator::*;
pub use config::*;
pub use context::*;
pub use heuristics::*;
pub use itinerary::*;
pub use lifecycle::*;
pub use pareto::*;
pub use passthrough::*;
pub use range_raptor::*;
pub use request::*;
pub use round::*;
pub use window::*;

pub(crate) use discovery::*;
pub(crate) use strategy::*;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid tuning parameters: {0}")]
    InvalidTuning(String),
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    #[error("An explicit search window must be wider than zero")]
    ZeroSearchWindow,
    #[error(transparent)]
    Transit(#[from] crate::transit::Error),
    #[error("Failed to build the search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("Internal invariant violated: {0}")]
    InvariantViolation(String),
}

/// Which worker the search runs with.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Profile {
    /// Best arrival time per number of transfers.
    #[default]
    Standard,
    /// Pareto optimal on arrival time, transfers, generalized cost and,
    /// with pass-through points, the visited points.
    MultiCriteria,
}
