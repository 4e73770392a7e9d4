//! The multi-criteria profile (McRAPTOR).

mod arrival;
mod state;
mod strategy;

pub(crate) use strategy::McRoutingStrategy;
