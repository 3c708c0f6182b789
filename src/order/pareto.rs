use super::{Objective, PartialComparator, PartialOrdering};

/// Pareto dominance over sequences of objective values.
///
/// Given one comparator per objective, `a` is `Before` `b` iff `a` is no worse
/// than `b` on every objective and strictly better on at least one; `Same` iff
/// they are equivalent on every objective; `NotComparable` otherwise.
/// Sequences whose length differs from the number of comparators are
/// `NotComparable` with everything.
#[derive(Debug, Clone)]
pub struct ParetoDominance<C> {
    comparators: Vec<C>,
}

impl<C> ParetoDominance<C> {
    pub fn new(comparators: Vec<C>) -> Self {
        Self { comparators }
    }

    /// Returns the per-objective comparators.
    pub fn comparators(&self) -> &[C] {
        &self.comparators
    }

    /// Returns the number of objectives.
    pub fn len(&self) -> usize {
        self.comparators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.comparators.is_empty()
    }
}

impl ParetoDominance<Objective> {
    /// Pareto dominance where every objective is minimized.
    pub fn minimizing(n_of_objectives: usize) -> Self {
        Self::new(vec![Objective::Minimize; n_of_objectives])
    }
}

impl<O, C> PartialComparator<[O]> for ParetoDominance<C>
where
    C: PartialComparator<O>,
{
    fn compare(&self, a: &[O], b: &[O]) -> PartialOrdering {
        if a.len() != self.comparators.len() || b.len() != self.comparators.len() {
            return PartialOrdering::NotComparable;
        }
        let mut better = false;
        let mut worse = false;
        for ((comparator, x), y) in self.comparators.iter().zip(a).zip(b) {
            match comparator.compare(x, y) {
                PartialOrdering::Before => better = true,
                PartialOrdering::After => worse = true,
                PartialOrdering::Same => {}
                PartialOrdering::NotComparable => return PartialOrdering::NotComparable,
            }
            if better && worse {
                return PartialOrdering::NotComparable;
            }
        }
        match (better, worse) {
            (true, false) => PartialOrdering::Before,
            (false, true) => PartialOrdering::After,
            (false, false) => PartialOrdering::Same,
            (true, true) => PartialOrdering::NotComparable,
        }
    }
}

impl<O, C> PartialComparator<Vec<O>> for ParetoDominance<C>
where
    C: PartialComparator<O>,
{
    fn compare(&self, a: &Vec<O>, b: &Vec<O>) -> PartialOrdering {
        PartialComparator::<[O]>::compare(self, a.as_slice(), b.as_slice())
    }
}
