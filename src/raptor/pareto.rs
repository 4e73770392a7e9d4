use crate::raptor;

/// Decides whether one element is at least as good as another in every
/// criterion. Dominance is derived from it: `a` dominates `b` when `a` covers
/// `b` but not the other way around.
pub trait ParetoComparator<T> {
    fn covers(&self, left: &T, right: &T) -> bool;
}

impl<T, F> ParetoComparator<T> for F
where
    F: Fn(&T, &T) -> bool,
{
    fn covers(&self, left: &T, right: &T) -> bool {
        self(left, right)
    }
}

/// A set of mutually non-dominated elements.
///
/// A candidate covered by an existing element is rejected, so on an exact tie
/// the incumbent wins unless [`ParetoSet::add_with_tie_break`] says otherwise.
/// Accepting a candidate evicts everything it covers.
#[derive(Debug, Clone)]
pub struct ParetoSet<T, C> {
    elements: Vec<T>,
    comparator: C,
}

impl<T, C: ParetoComparator<T>> ParetoSet<T, C> {
    pub fn new(comparator: C) -> Self {
        Self {
            elements: Vec::new(),
            comparator,
        }
    }

    pub fn dominates(&self, left: &T, right: &T) -> bool {
        self.comparator.covers(left, right) && !self.comparator.covers(right, left)
    }

    /// `true` if some element is at least as good as `candidate` everywhere.
    pub fn is_covered(&self, candidate: &T) -> bool {
        self.elements
            .iter()
            .any(|e| self.comparator.covers(e, candidate))
    }

    pub fn add(&mut self, candidate: T) -> bool {
        self.add_or_evict(candidate, |_| {})
    }

    /// Adds `candidate` and hands every element it evicts to `on_evict`.
    pub fn add_or_evict(&mut self, candidate: T, mut on_evict: impl FnMut(T)) -> bool {
        if self.is_covered(&candidate) {
            return false;
        }
        let comparator = &self.comparator;
        let mut kept = Vec::with_capacity(self.elements.len() + 1);
        for element in self.elements.drain(..) {
            if comparator.covers(&candidate, &element) {
                on_evict(element);
            } else {
                kept.push(element);
            }
        }
        kept.push(candidate);
        self.elements = kept;
        true
    }

    /// Like [`ParetoSet::add`], but an element with exactly the same criteria
    /// is replaced when `prefer(candidate, existing)` holds. This makes the
    /// final content independent of insertion order.
    pub fn add_with_tie_break(&mut self, candidate: T, prefer: impl Fn(&T, &T) -> bool) -> bool {
        let tie = self.elements.iter().position(|e| {
            self.comparator.covers(e, &candidate) && self.comparator.covers(&candidate, e)
        });
        match tie {
            Some(pos) if prefer(&candidate, &self.elements[pos]) => {
                self.elements[pos] = candidate;
                true
            }
            Some(_) => false,
            None => self.add(candidate),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.elements.iter()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn clear(&mut self) {
        self.elements.clear();
    }

    pub fn into_vec(self) -> Vec<T> {
        self.elements
    }

    /// Fails if two elements cover each other or one covers another.
    pub fn validate(&self) -> Result<(), raptor::Error> {
        for (i, left) in self.elements.iter().enumerate() {
            for (j, right) in self.elements.iter().enumerate() {
                if i != j && self.comparator.covers(left, right) {
                    return Err(raptor::Error::InvariantViolation(format!(
                        "pareto set element {i} covers element {j}"
                    )));
                }
            }
        }
        Ok(())
    }
}

impl<'a, T, C> IntoIterator for &'a ParetoSet<T, C> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.elements.iter()
    }
}
