/// Counts RAPTOR rounds and decides when an iteration is done.
///
/// Round 0 holds the access arrivals; round `k` holds arrivals that used `k`
/// transit boardings. The iteration stops once a round brings no improvement
/// or the boarding limit is hit.
#[derive(Debug, Clone)]
pub struct RoundTracker {
    round: usize,
    max_rounds: usize,
}

impl RoundTracker {
    /// `max_rounds` is the number of boardings allowed, i.e. max transfers + 1.
    pub fn new(max_rounds: usize) -> Self {
        Self {
            round: 0,
            max_rounds,
        }
    }

    pub fn round(&self) -> usize {
        self.round
    }

    pub fn max_rounds(&self) -> usize {
        self.max_rounds
    }

    /// `improved` tells whether the last round reached anything new.
    pub fn has_more_rounds(&self, improved: bool) -> bool {
        improved && self.round < self.max_rounds
    }

    pub fn next_round(&mut self) -> usize {
        debug_assert!(
            self.round < self.max_rounds,
            "round {} started past the limit of {}",
            self.round + 1,
            self.max_rounds
        );
        self.round += 1;
        self.round
    }
}
