use crate::raptor::{self, SearchDirection};
use serde::{Deserialize, Serialize};

/// Unordered points are tracked as bits of a `u32`.
pub const MAX_UNORDERED_POINTS: usize = 32;

/// Stops a journey must pass through. Each point is a set of stops, any of
/// which satisfies it; riding through a stop on board counts as visiting it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassThroughPoints {
    pub points: Vec<Vec<u32>>,
    pub ordered: bool,
}

impl PassThroughPoints {
    /// Points that must be visited in the given order.
    pub fn ordered(points: Vec<Vec<u32>>) -> Self {
        Self {
            points,
            ordered: true,
        }
    }

    /// Points that must all be visited, in any order.
    pub fn unordered(points: Vec<Vec<u32>>) -> Self {
        Self {
            points,
            ordered: false,
        }
    }
}

/// How the `c2` criterion of two arrivals compares.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum C2Dominance {
    /// No pass-through points; `c2` never decides anything.
    Ignore,
    /// `c2` counts the ordered points visited so far.
    AtLeast,
    /// `c2` is a bitmask of the unordered points visited so far.
    Superset,
}

impl C2Dominance {
    pub fn covers(self, left: u32, right: u32) -> bool {
        match self {
            C2Dominance::Ignore => true,
            C2Dominance::AtLeast => left >= right,
            C2Dominance::Superset => left & right == right,
        }
    }
}

/// Tracks which pass-through points a partial journey has visited.
#[derive(Debug, Clone, Default)]
pub enum PassThroughPointsService {
    #[default]
    Noop,
    Ordered(Vec<Vec<u32>>),
    Unordered(Vec<Vec<u32>>),
}

impl PassThroughPointsService {
    /// A reverse search meets ordered points last to first, so their order is
    /// flipped here and nowhere else.
    pub fn new(
        points: Option<&PassThroughPoints>,
        direction: SearchDirection,
        stop_count: usize,
    ) -> Result<Self, raptor::Error> {
        let Some(points) = points else {
            return Ok(Self::Noop);
        };
        if points.points.is_empty() {
            return Err(raptor::Error::InvalidRequest(
                "pass-through points were given but the list is empty".into(),
            ));
        }
        for (i, point) in points.points.iter().enumerate() {
            if point.is_empty() {
                return Err(raptor::Error::InvalidRequest(format!(
                    "pass-through point {i} has no stops"
                )));
            }
            if let Some(stop) = point.iter().find(|&&stop| stop as usize >= stop_count) {
                return Err(raptor::Error::InvalidRequest(format!(
                    "pass-through point {i} references unknown stop {stop}"
                )));
            }
        }
        if points.ordered {
            let mut ordered = points.points.clone();
            if !direction.is_forward() {
                ordered.reverse();
            }
            Ok(Self::Ordered(ordered))
        } else {
            if points.points.len() > MAX_UNORDERED_POINTS {
                return Err(raptor::Error::InvalidRequest(format!(
                    "at most {MAX_UNORDERED_POINTS} unordered pass-through points are supported, got {}",
                    points.points.len()
                )));
            }
            Ok(Self::Unordered(points.points.clone()))
        }
    }

    pub fn is_noop(&self) -> bool {
        matches!(self, Self::Noop)
    }

    pub fn dominance(&self) -> C2Dominance {
        match self {
            Self::Noop => C2Dominance::Ignore,
            Self::Ordered(_) => C2Dominance::AtLeast,
            Self::Unordered(_) => C2Dominance::Superset,
        }
    }

    pub fn initial_c2(&self) -> u32 {
        0
    }

    /// `c2` after visiting `stop`.
    pub fn update_c2(&self, c2: u32, stop: u32) -> u32 {
        match self {
            Self::Noop => c2,
            Self::Ordered(points) => {
                let mut c2 = c2;
                while let Some(point) = points.get(c2 as usize)
                    && point.contains(&stop)
                {
                    c2 += 1;
                }
                c2
            }
            Self::Unordered(points) => points
                .iter()
                .enumerate()
                .filter(|(_, point)| point.contains(&stop))
                .fold(c2, |c2, (i, _)| c2 | (1 << i)),
        }
    }

    /// Whether a journey with this `c2` may reach the destination.
    pub fn accept_at_destination(&self, c2: u32) -> bool {
        match self {
            Self::Noop => true,
            Self::Ordered(points) => c2 as usize == points.len(),
            Self::Unordered(points) => c2 == full_mask(points.len()),
        }
    }

    pub fn c2_covers(&self, left: u32, right: u32) -> bool {
        self.dominance().covers(left, right)
    }
}

fn full_mask(len: usize) -> u32 {
    if len >= MAX_UNORDERED_POINTS {
        u32::MAX
    } else {
        (1u32 << len) - 1
    }
}
