use crate::shared::time::Duration;
use serde::{Deserialize, Serialize};
use std::{
    fmt,
    ops::{Add, AddAssign},
};

/// Generalized cost in cost units. One second of plain travel time is 100 units.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct Cost(i32);

const UNITS_PER_SECOND: f64 = 100.0;

impl Cost {
    pub const ZERO: Cost = Cost(0);
    pub const MAX: Cost = Cost(i32::MAX);

    pub const fn from_units(units: i32) -> Self {
        Self(units)
    }

    pub const fn from_seconds(secs: i32) -> Self {
        Self(secs.saturating_mul(100))
    }

    pub const fn as_units(&self) -> i32 {
        self.0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Cost of spending `duration` with the given reluctance, rounded to the nearest unit.
    pub fn of_duration(duration: Duration, reluctance: f64) -> Self {
        let units = duration.as_seconds() as f64 * reluctance * UNITS_PER_SECOND;
        Self(units.round() as i32)
    }

    /// Same as [`Cost::of_duration`] but rounded down. Summing floored parts never
    /// exceeds the rounded cost of the whole, which keeps lower bounds admissible.
    pub fn floor_of_duration(duration: Duration, reluctance: f64) -> Self {
        let units = duration.as_seconds() as f64 * reluctance * UNITS_PER_SECOND;
        Self(units.floor() as i32)
    }
}

impl Add for Cost {
    type Output = Self;

    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Cost {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0)
    }
}

impl fmt::Display for Cost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}", self.0 as f64 / UNITS_PER_SECOND)
    }
}
