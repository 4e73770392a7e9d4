//! Round-based public transit routing.
//!
//! [`transit`] holds the immutable network snapshot, [`raptor`] the search
//! core (RAPTOR, Range-RAPTOR and multi-criteria RAPTOR) and [`shared`] the
//! time and cost primitives both sides agree on.

pub mod raptor;
pub mod shared;
pub mod transit;
