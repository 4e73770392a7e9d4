pub mod cost;
pub mod time;

pub use cost::*;
pub use time::{Duration, Time};
