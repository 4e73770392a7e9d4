use crate::{
    raptor::Slack,
    shared::{Duration, Time},
    transit::{Transfer, TransitDataProvider, TripSchedule},
};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// The direction a search moves through time.
///
/// Every time comparison, stop traversal order and boarding rule in the
/// workers goes through this type, so a single implementation serves both
/// depart-after (forward) and arrive-by (reverse) searches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchDirection {
    #[default]
    Forward,
    Reverse,
}

impl SearchDirection {
    pub fn is_forward(self) -> bool {
        matches!(self, SearchDirection::Forward)
    }

    pub fn opposite(self) -> Self {
        match self {
            SearchDirection::Forward => SearchDirection::Reverse,
            SearchDirection::Reverse => SearchDirection::Forward,
        }
    }

    /// Moves `time` by `duration` in search direction.
    pub fn plus(self, time: Time, duration: Duration) -> Time {
        match self {
            SearchDirection::Forward => time + duration,
            SearchDirection::Reverse => time - duration,
        }
    }

    /// Moves `time` by `duration` against search direction.
    pub fn minus(self, time: Time, duration: Duration) -> Time {
        match self {
            SearchDirection::Forward => time - duration,
            SearchDirection::Reverse => time + duration,
        }
    }

    /// `true` if `a` is strictly better than `b`.
    pub fn is_better(self, a: Time, b: Time) -> bool {
        match self {
            SearchDirection::Forward => a < b,
            SearchDirection::Reverse => a > b,
        }
    }

    pub fn best(self, a: Time, b: Time) -> Time {
        if self.is_better(b, a) { b } else { a }
    }

    /// The worst possible time, used for unreached stops.
    pub fn unreached(self) -> Time {
        match self {
            SearchDirection::Forward => Time::MAX,
            SearchDirection::Reverse => Time::MIN,
        }
    }

    /// Orders times so that smaller is better in either direction.
    pub fn rank(self, time: Time) -> i64 {
        match self {
            SearchDirection::Forward => time.as_seconds() as i64,
            SearchDirection::Reverse => -(time.as_seconds() as i64),
        }
    }

    pub fn compare(self, a: Time, b: Time) -> Ordering {
        self.rank(a).cmp(&self.rank(b))
    }

    /// Time spent going from `from` to `to` in search direction.
    pub fn duration_between(self, from: Time, to: Time) -> Duration {
        match self {
            SearchDirection::Forward => to - from,
            SearchDirection::Reverse => from - to,
        }
    }

    /// The trip time the search boards at: departure going forward, arrival
    /// going backwards.
    pub fn board_time(self, trip: &TripSchedule, pos: usize) -> Time {
        match self {
            SearchDirection::Forward => trip.departure(pos),
            SearchDirection::Reverse => trip.arrival(pos),
        }
    }

    pub fn alight_time(self, trip: &TripSchedule, pos: usize) -> Time {
        match self {
            SearchDirection::Forward => trip.arrival(pos),
            SearchDirection::Reverse => trip.departure(pos),
        }
    }

    /// Slack applied between a stop label and boarding in search terms.
    pub fn board_slack(self, slack: &Slack) -> Duration {
        match self {
            SearchDirection::Forward => slack.board,
            SearchDirection::Reverse => slack.alight,
        }
    }

    pub fn alight_slack(self, slack: &Slack) -> Duration {
        match self {
            SearchDirection::Forward => slack.alight,
            SearchDirection::Reverse => slack.board,
        }
    }

    /// Positions of a pattern starting at `from`, in search order.
    pub fn positions_from(self, len: usize, from: usize) -> PatternPositions {
        match self {
            SearchDirection::Forward => PatternPositions {
                next: from as isize,
                end: len as isize,
                step: 1,
            },
            SearchDirection::Reverse => PatternPositions {
                next: from as isize,
                end: -1,
                step: -1,
            },
        }
    }

    /// The position after `pos` in search order, if any.
    pub fn next_position(self, len: usize, pos: usize) -> Option<usize> {
        match self {
            SearchDirection::Forward => (pos + 1 < len).then_some(pos + 1),
            SearchDirection::Reverse => pos.checked_sub(1),
        }
    }

    /// Whether position `a` comes before `b` in search order.
    pub fn is_before(self, a: usize, b: usize) -> bool {
        match self {
            SearchDirection::Forward => a < b,
            SearchDirection::Reverse => a > b,
        }
    }

    /// Walking edges leaving `stop` in search direction.
    pub fn transfers<T: TransitDataProvider>(self, transit: &T, stop: u32) -> &[Transfer] {
        match self {
            SearchDirection::Forward => transit.transfers_from(stop),
            SearchDirection::Reverse => transit.transfers_to(stop),
        }
    }

    /// The stop a transfer leads to when walked in search direction.
    pub fn transfer_target(self, transfer: &Transfer) -> u32 {
        match self {
            SearchDirection::Forward => transfer.to_stop_idx,
            SearchDirection::Reverse => transfer.from_stop_idx,
        }
    }
}

/// Stop positions of a pattern in search order.
#[derive(Debug, Clone)]
pub struct PatternPositions {
    next: isize,
    end: isize,
    step: isize,
}

impl Iterator for PatternPositions {
    type Item = usize;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next == self.end {
            return None;
        }
        let pos = self.next as usize;
        self.next += self.step;
        Some(pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forward_and_reverse_mirror_each_other() {
        let t = Time::from_hm(10, 0);
        let d = Duration::from_minutes(5);
        assert_eq!(SearchDirection::Forward.plus(t, d), Time::from_hm(10, 5));
        assert_eq!(SearchDirection::Reverse.plus(t, d), Time::from_hm(9, 55));
        assert!(SearchDirection::Forward.is_better(Time::from_hm(9, 0), t));
        assert!(SearchDirection::Reverse.is_better(t, Time::from_hm(9, 0)));
        assert!(!SearchDirection::Forward.is_better(t, t));
        assert_eq!(
            SearchDirection::Reverse.duration_between(t, Time::from_hm(9, 40)),
            Duration::from_minutes(20)
        );
    }

    #[test]
    fn unreached_is_worse_than_anything() {
        for direction in [SearchDirection::Forward, SearchDirection::Reverse] {
            let unreached = direction.unreached();
            assert!(direction.is_better(Time::from_hm(12, 0), unreached));
            assert_eq!(direction.best(unreached, Time::from_hm(1, 0)), Time::from_hm(1, 0));
        }
    }

    #[test]
    fn positions_follow_search_order() {
        let forward: Vec<_> = SearchDirection::Forward.positions_from(4, 1).collect();
        assert_eq!(forward, vec![1, 2, 3]);
        let reverse: Vec<_> = SearchDirection::Reverse.positions_from(4, 2).collect();
        assert_eq!(reverse, vec![2, 1, 0]);
        assert_eq!(SearchDirection::Reverse.next_position(4, 0), None);
        assert_eq!(SearchDirection::Forward.next_position(4, 3), None);
    }
}
