use crate::{
    raptor::SearchDirection,
    shared::{Duration, Time},
};
use serde::{Deserialize, Serialize};

/// Sizes a dynamic search window from the shortest possible travel time:
/// `min_window + min_transit_time_coefficient * travel time`, rounded up to
/// `step` and clamped to `[min_window, max_window]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicSearchWindowCoefficients {
    pub min_transit_time_coefficient: f64,
    pub min_window: Duration,
    pub max_window: Duration,
    pub step: Duration,
}

impl Default for DynamicSearchWindowCoefficients {
    fn default() -> Self {
        Self {
            min_transit_time_coefficient: 0.75,
            min_window: Duration::from_minutes(40),
            max_window: Duration::from_hours(3),
            step: Duration::from_minutes(10),
        }
    }
}

impl DynamicSearchWindowCoefficients {
    pub(crate) fn validate(&self) -> Result<(), String> {
        if !self.min_transit_time_coefficient.is_finite() || self.min_transit_time_coefficient < 0.0
        {
            return Err("min_transit_time_coefficient must be a finite, non-negative number".into());
        }
        if self.min_window <= Duration::ZERO {
            return Err(format!("min_window must be positive, got {}", self.min_window));
        }
        if self.max_window < self.min_window {
            return Err(format!(
                "max_window {} is smaller than min_window {}",
                self.max_window, self.min_window
            ));
        }
        if self.step.is_negative() {
            return Err(format!("step must not be negative, got {}", self.step));
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SearchWindowCalculator {
    coefficients: DynamicSearchWindowCoefficients,
}

impl SearchWindowCalculator {
    pub fn new(coefficients: DynamicSearchWindowCoefficients) -> Self {
        Self { coefficients }
    }

    /// `min_travel_time` is `None` when the destination can not be reached at
    /// all; the window then falls back to its minimum.
    pub fn calculate(&self, min_travel_time: Option<Duration>) -> Duration {
        let c = &self.coefficients;
        let Some(travel_time) = min_travel_time else {
            return c.min_window;
        };
        let extra = travel_time.as_seconds() as f64 * c.min_transit_time_coefficient;
        let width = Duration::from_seconds(c.min_window.as_seconds().saturating_add(extra.round() as i32))
            .round_up_to(c.step);
        width.clamp(c.min_window, c.max_window)
    }
}

/// The range of departure times (forward) or arrival times (reverse) a
/// Range-RAPTOR search iterates over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SearchWindow {
    /// The requested time: earliest departure or latest arrival.
    pub time: Time,
    pub width: Duration,
    pub direction: SearchDirection,
}

impl SearchWindow {
    pub fn new(time: Time, width: Duration, direction: SearchDirection) -> Self {
        Self {
            time,
            width,
            direction,
        }
    }

    /// Earliest time inside the window.
    pub fn start(&self) -> Time {
        match self.direction {
            SearchDirection::Forward => self.time,
            SearchDirection::Reverse => self.time - self.width,
        }
    }

    /// Latest time inside the window.
    pub fn end(&self) -> Time {
        match self.direction {
            SearchDirection::Forward => self.time + self.width,
            SearchDirection::Reverse => self.time,
        }
    }

    /// Iteration times, one every `step`, beginning at the requested time and
    /// moving into the window. The far edge of the window is exclusive and
    /// there is always at least one iteration.
    pub fn instants(&self, step: Duration) -> Vec<Time> {
        let step = step.max(Duration::from_seconds(1));
        let count = ((self.width.as_seconds().max(1) - 1) / step.as_seconds()) + 1;
        (0..count)
            .map(|i| {
                self.direction
                    .plus(self.time, Duration::from_seconds(i * step.as_seconds()))
            })
            .collect()
    }
}
