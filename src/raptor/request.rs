use crate::{
    raptor::{LifeCycleObserver, PassThroughPoints, Profile, SearchDirection},
    shared::{Cost, Duration, Time},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A street leg between the origin or destination and a transit stop.
/// Produced by an external street search; only its outcome is stored here.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessEgress {
    pub stop: u32,
    pub duration: Duration,
    pub cost: Cost,
    /// The leg may only be walked between these two times, e.g. a bike rental
    /// or a station entrance.
    pub opening_hours: Option<(Time, Time)>,
}

impl AccessEgress {
    pub fn new(stop: u32, duration: Duration, cost: Cost) -> Self {
        Self {
            stop,
            duration,
            cost,
            opening_hours: None,
        }
    }

    pub fn with_opening_hours(mut self, open: Time, close: Time) -> Self {
        self.opening_hours = Some((open, close));
        self
    }

    /// When the leg ends if started no earlier than `start`, waiting for the
    /// leg to open if needed.
    pub fn earliest_arrival(&self, start: Time) -> Option<Time> {
        let start = match self.opening_hours {
            Some((open, close)) => {
                let start = start.max(open);
                if start + self.duration > close {
                    return None;
                }
                start
            }
            None => start,
        };
        Some(start + self.duration)
    }

    /// When the leg must start to end no later than `end`.
    pub fn latest_departure(&self, end: Time) -> Option<Time> {
        let end = match self.opening_hours {
            Some((open, close)) => {
                let end = end.min(close);
                if end - self.duration < open {
                    return None;
                }
                end
            }
            None => end,
        };
        Some(end - self.duration)
    }

    /// Traverses the leg in search direction starting at `time`.
    pub(crate) fn traverse(&self, direction: SearchDirection, time: Time) -> Option<Time> {
        match direction {
            SearchDirection::Forward => self.earliest_arrival(time),
            SearchDirection::Reverse => self.latest_departure(time),
        }
    }
}

/// Minimum times around boarding and alighting. `transfer` is added on top of
/// `board` whenever the passenger was already on a vehicle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Slack {
    pub board: Duration,
    pub alight: Duration,
    pub transfer: Duration,
}

/// Weights of the generalized cost. Only the multi-criteria profile optimizes
/// on it; the standard profile reports it for information.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CostParameters {
    pub board_cost: Cost,
    pub transfer_cost: Cost,
    pub transit_reluctance: f64,
    pub wait_reluctance: f64,
    pub walk_reluctance: f64,
}

impl Default for CostParameters {
    fn default() -> Self {
        Self {
            board_cost: Cost::from_seconds(60),
            transfer_cost: Cost::ZERO,
            transit_reluctance: 1.0,
            wait_reluctance: 1.0,
            walk_reluctance: 2.0,
        }
    }
}

impl CostParameters {
    /// Cost of boarding a vehicle. `wait` only applies when the passenger
    /// came from another vehicle; the first boarding is time-shifted and
    /// has no wait.
    pub fn boarding_cost(&self, first_boarding: bool, wait: Duration) -> Cost {
        if first_boarding {
            self.board_cost
        } else {
            self.board_cost
                + self.transfer_cost
                + Cost::of_duration(wait, self.wait_reluctance)
        }
    }

    pub fn ride_cost(&self, ride: Duration) -> Cost {
        Cost::of_duration(ride, self.transit_reluctance)
    }

    pub fn walk_cost(&self, walk: Duration) -> Cost {
        Cost::of_duration(walk, self.walk_reluctance)
    }

    pub(crate) fn validate(&self) -> Result<(), String> {
        if self.board_cost.is_negative() || self.transfer_cost.is_negative() {
            return Err("boarding and transfer costs must not be negative".into());
        }
        for (name, value) in [
            ("transit_reluctance", self.transit_reluctance),
            ("wait_reluctance", self.wait_reluctance),
            ("walk_reluctance", self.walk_reluctance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(format!("{name} must be a finite, non-negative number"));
            }
        }
        Ok(())
    }
}

/// One routing query.
///
/// Build it with [`RaptorRequest::depart_after`] or
/// [`RaptorRequest::arrive_by`] and the builder methods:
///
/// ```
/// use rangeraptor::raptor::{AccessEgress, RaptorRequest};
/// use rangeraptor::shared::{Cost, Duration, Time};
///
/// let request = RaptorRequest::depart_after(Time::from_hm(8, 0))
///     .access(AccessEgress::new(0, Duration::from_minutes(3), Cost::ZERO))
///     .egress(AccessEgress::new(7, Duration::ZERO, Cost::ZERO))
///     .search_window(Duration::from_minutes(30));
/// assert_eq!(request.access_paths().len(), 1);
/// ```
#[derive(Clone)]
pub struct RaptorRequest {
    pub(crate) direction: SearchDirection,
    pub(crate) time: Time,
    pub(crate) access: Vec<AccessEgress>,
    pub(crate) egress: Vec<AccessEgress>,
    pub(crate) search_window: Option<Duration>,
    pub(crate) profile: Profile,
    pub(crate) max_transfers: Option<usize>,
    pub(crate) slack: Slack,
    pub(crate) cost: CostParameters,
    pub(crate) pass_through: Option<PassThroughPoints>,
    pub(crate) observers: Vec<Arc<dyn LifeCycleObserver>>,
}

impl RaptorRequest {
    fn new(direction: SearchDirection, time: Time) -> Self {
        Self {
            direction,
            time,
            access: Vec::new(),
            egress: Vec::new(),
            search_window: None,
            profile: Profile::default(),
            max_transfers: None,
            slack: Slack::default(),
            cost: CostParameters::default(),
            pass_through: None,
            observers: Vec::new(),
        }
    }

    /// Find journeys departing at `time` or later.
    pub fn depart_after(time: Time) -> Self {
        Self::new(SearchDirection::Forward, time)
    }

    /// Find journeys arriving at `time` or earlier.
    pub fn arrive_by(time: Time) -> Self {
        Self::new(SearchDirection::Reverse, time)
    }

    pub fn access(mut self, access: AccessEgress) -> Self {
        self.access.push(access);
        self
    }

    pub fn egress(mut self, egress: AccessEgress) -> Self {
        self.egress.push(egress);
        self
    }

    /// Width of the range of departure (or arrival) times. Leave unset to let
    /// the search size it from the network.
    pub fn search_window(mut self, window: Duration) -> Self {
        self.search_window = Some(window);
        self
    }

    pub fn profile(mut self, profile: Profile) -> Self {
        self.profile = profile;
        self
    }

    pub fn max_transfers(mut self, max_transfers: usize) -> Self {
        self.max_transfers = Some(max_transfers);
        self
    }

    pub fn slack(mut self, slack: Slack) -> Self {
        self.slack = slack;
        self
    }

    pub fn cost(mut self, cost: CostParameters) -> Self {
        self.cost = cost;
        self
    }

    pub fn pass_through(mut self, points: PassThroughPoints) -> Self {
        self.pass_through = Some(points);
        self
    }

    pub fn observer(mut self, observer: Arc<dyn LifeCycleObserver>) -> Self {
        self.observers.push(observer);
        self
    }

    pub fn direction(&self) -> SearchDirection {
        self.direction
    }

    pub fn time(&self) -> Time {
        self.time
    }

    pub fn access_paths(&self) -> &[AccessEgress] {
        &self.access
    }

    pub fn egress_paths(&self) -> &[AccessEgress] {
        &self.egress
    }

    pub fn search_window_width(&self) -> Option<Duration> {
        self.search_window
    }

    pub fn search_profile(&self) -> Profile {
        self.profile
    }

    pub fn slack_settings(&self) -> &Slack {
        &self.slack
    }

    pub fn cost_parameters(&self) -> &CostParameters {
        &self.cost
    }
}

impl std::fmt::Debug for RaptorRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RaptorRequest")
            .field("direction", &self.direction)
            .field("time", &self.time)
            .field("access", &self.access)
            .field("egress", &self.egress)
            .field("search_window", &self.search_window)
            .field("profile", &self.profile)
            .field("max_transfers", &self.max_transfers)
            .field("slack", &self.slack)
            .field("cost", &self.cost)
            .field("pass_through", &self.pass_through)
            .field("observers", &self.observers.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_waits_for_opening_hours() {
        let access = AccessEgress::new(0, Duration::from_minutes(5), Cost::ZERO)
            .with_opening_hours(Time::from_hm(8, 0), Time::from_hm(9, 0));
        assert_eq!(
            access.earliest_arrival(Time::from_hm(7, 30)),
            Some(Time::from_hm(8, 5))
        );
        assert_eq!(access.earliest_arrival(Time::from_hm(8, 56)), None);
        assert_eq!(
            access.latest_departure(Time::from_hm(10, 0)),
            Some(Time::from_hm(8, 55))
        );
        assert_eq!(access.latest_departure(Time::from_hm(8, 4)), None);
    }

    #[test]
    fn traverse_follows_direction() {
        let access = AccessEgress::new(0, Duration::from_minutes(5), Cost::ZERO);
        let t = Time::from_hm(12, 0);
        assert_eq!(
            access.traverse(SearchDirection::Forward, t),
            Some(Time::from_hm(12, 5))
        );
        assert_eq!(
            access.traverse(SearchDirection::Reverse, t),
            Some(Time::from_hm(11, 55))
        );
    }

    #[test]
    fn first_boarding_has_no_wait_cost() {
        let cost = CostParameters::default();
        let wait = Duration::from_minutes(10);
        assert_eq!(cost.boarding_cost(true, wait), Cost::from_seconds(60));
        assert_eq!(cost.boarding_cost(false, wait), Cost::from_seconds(660));
    }

    #[test]
    fn builder_settings_read_back() {
        let slack = Slack {
            transfer: Duration::from_minutes(2),
            ..Default::default()
        };
        let request = RaptorRequest::arrive_by(Time::from_hm(9, 0))
            .profile(Profile::MultiCriteria)
            .slack(slack)
            .search_window(Duration::from_minutes(30));
        assert_eq!(request.direction(), SearchDirection::Reverse);
        assert_eq!(request.search_profile(), Profile::MultiCriteria);
        assert_eq!(request.slack_settings(), &slack);
        assert_eq!(request.search_window_width(), Some(Duration::from_minutes(30)));
        assert_eq!(
            RaptorRequest::depart_after(Time::from_hm(9, 0)).search_profile(),
            Profile::Standard
        );
    }

    #[test]
    fn rejects_negative_reluctance() {
        let cost = CostParameters {
            wait_reluctance: -1.0,
            ..Default::default()
        };
        assert!(cost.validate().is_err());
        assert!(CostParameters::default().validate().is_ok());
    }
}
