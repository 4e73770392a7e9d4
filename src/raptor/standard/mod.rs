//! The standard profile: RAPTOR on arrival time and number of transfers.

mod state;
mod strategy;

pub(crate) use strategy::StdRoutingStrategy;
