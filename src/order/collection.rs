//! # Partially Ordered Collections
//!
//! A [`PartiallyOrderedCollection`] is an immutable snapshot of a set of elements
//! decomposed into fronts: front 0 holds the elements no other element is
//! `Before`, front 1 the elements that become non-dominated once front 0 is
//! removed, and so on. Every element belongs to exactly one front.

use std::slice;

use super::{PartialComparator, PartialOrdering};

/// Decomposes `items` into fronts of indices using the fast non-dominated sort.
///
/// Front `i` contains exactly the indices that are non-dominated among the
/// items remaining after removing fronts `0..i`. Within a front, indices are in
/// ascending order. An empty input yields no fronts.
///
/// ```rust
/// use evosolve::order::{non_dominated_sort, ParetoDominance};
///
/// let points = vec![vec![1.0, 5.0], vec![2.0, 6.0], vec![5.0, 1.0]];
/// let fronts = non_dominated_sort(&points, &ParetoDominance::minimizing(2));
///
/// assert_eq!(fronts, vec![vec![0, 2], vec![1]]);
/// ```
pub fn non_dominated_sort<T, C>(items: &[T], comparator: &C) -> Vec<Vec<usize>>
where
    C: PartialComparator<T> + ?Sized,
{
    let n = items.len();
    // indices of the items dominated by each item
    let mut dominated: Vec<Vec<usize>> = vec![Vec::new(); n];
    // number of items dominating each item
    let mut dominators: Vec<usize> = vec![0; n];

    for p in 0..n {
        for q in (p + 1)..n {
            match comparator.compare(&items[p], &items[q]) {
                PartialOrdering::Before => {
                    dominated[p].push(q);
                    dominators[q] += 1;
                }
                PartialOrdering::After => {
                    dominated[q].push(p);
                    dominators[p] += 1;
                }
                PartialOrdering::Same | PartialOrdering::NotComparable => {}
            }
        }
    }

    let mut fronts = Vec::new();
    let mut current: Vec<usize> = (0..n).filter(|&i| dominators[i] == 0).collect();
    while !current.is_empty() {
        let mut next = Vec::new();
        for &p in &current {
            for &q in &dominated[p] {
                dominators[q] -= 1;
                if dominators[q] == 0 {
                    next.push(q);
                }
            }
        }
        next.sort_unstable();
        fronts.push(current);
        current = next;
    }

    debug_assert_eq!(
        fronts.iter().map(Vec::len).sum::<usize>(),
        n,
        "a well-formed partial order assigns every element to a front"
    );

    fronts
}

/// An immutable collection of elements decomposed into fronts.
///
/// ```rust
/// use evosolve::order::{Objective, PartiallyOrderedCollection};
///
/// let collection = PartiallyOrderedCollection::new(vec![3.0, 1.0, 2.0, 1.0], &Objective::Minimize);
///
/// assert_eq!(collection.firsts(), &[1.0, 1.0]);
/// assert_eq!(collection.lasts(), &[3.0]);
/// assert_eq!(collection.fronts().len(), 3);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct PartiallyOrderedCollection<T> {
    fronts: Vec<Vec<T>>,
    len: usize,
}

impl<T> PartiallyOrderedCollection<T> {
    /// Builds the collection by sorting `items` into fronts under `comparator`.
    ///
    /// Elements of the same front keep their relative order in `items`.
    pub fn new<C>(items: Vec<T>, comparator: &C) -> Self
    where
        C: PartialComparator<T> + ?Sized,
    {
        let indices = non_dominated_sort(&items, comparator);
        let mut slots: Vec<Option<T>> = items.into_iter().map(Some).collect();
        let fronts = indices
            .into_iter()
            .map(|front| front.into_iter().filter_map(|i| slots[i].take()).collect())
            .collect();
        Self::from_fronts(fronts)
    }

    /// Creates an empty collection.
    pub fn empty() -> Self {
        Self {
            fronts: Vec::new(),
            len: 0,
        }
    }

    /// Wraps an already computed decomposition. Empty fronts are dropped.
    ///
    /// The caller is responsible for `fronts` being a valid decomposition.
    pub(crate) fn from_fronts(fronts: Vec<Vec<T>>) -> Self {
        let fronts: Vec<Vec<T>> = fronts.into_iter().filter(|f| !f.is_empty()).collect();
        let len = fronts.iter().map(Vec::len).sum();
        Self { fronts, len }
    }

    /// Returns every element, front by front.
    pub fn all(&self) -> All<'_, T> {
        All {
            fronts: self.fronts.iter(),
            current: [].iter(),
        }
    }

    /// Returns the non-dominated elements (front 0).
    pub fn firsts(&self) -> &[T] {
        self.fronts.first().map_or(&[], Vec::as_slice)
    }

    /// Returns the elements of the worst front.
    pub fn lasts(&self) -> &[T] {
        self.fronts.last().map_or(&[], Vec::as_slice)
    }

    /// Returns the ordered decomposition into fronts.
    pub fn fronts(&self) -> &[Vec<T>] {
        &self.fronts
    }

    /// Returns every element paired with the index of its front.
    pub fn ranked(&self) -> impl Iterator<Item = (usize, &T)> {
        self.fronts
            .iter()
            .enumerate()
            .flat_map(|(rank, front)| front.iter().map(move |item| (rank, item)))
    }

    /// Returns the element at position `index` of [`all`](Self::all), with the
    /// index of its front.
    pub fn get(&self, index: usize) -> Option<(usize, &T)> {
        let mut remaining = index;
        for (rank, front) in self.fronts.iter().enumerate() {
            if remaining < front.len() {
                return Some((rank, &front[remaining]));
            }
            remaining -= front.len();
        }
        None
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns a new collection that also contains `item`.
    pub fn with<C>(&self, item: T, comparator: &C) -> Self
    where
        T: Clone,
        C: PartialComparator<T> + ?Sized,
    {
        let mut items: Vec<T> = self.all().cloned().collect();
        items.push(item);
        Self::new(items, comparator)
    }

    /// Consumes the collection returning its fronts.
    pub fn into_fronts(self) -> Vec<Vec<T>> {
        self.fronts
    }

    /// Consumes the collection returning its elements, front by front.
    pub fn into_vec(self) -> Vec<T> {
        self.fronts.into_iter().flatten().collect()
    }
}

impl<T> Default for PartiallyOrderedCollection<T> {
    fn default() -> Self {
        Self::empty()
    }
}

/// Iterator over all the elements of a [`PartiallyOrderedCollection`].
pub struct All<'a, T> {
    fronts: slice::Iter<'a, Vec<T>>,
    current: slice::Iter<'a, T>,
}

impl<'a, T> Iterator for All<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.current.next() {
                return Some(item);
            }
            self.current = self.fronts.next()?.iter();
        }
    }
}
