//! # Partial Orders
//!
//! Qualities are compared with a [`PartialComparator`], which answers with one of
//! four outcomes: [`PartialOrdering::Before`], [`PartialOrdering::After`],
//! [`PartialOrdering::Same`] or [`PartialOrdering::NotComparable`]. Total orders
//! (a single objective) never answer `NotComparable`; Pareto dominance over
//! several objectives does whenever two qualities trade off against each other.
//!
//! "Before" always means "better": minimization and maximization are encoded by
//! the comparator, typically through [`Objective`].
//!
//! ```rust
//! use evosolve::order::{Objective, ParetoDominance, PartialComparator, PartialOrdering};
//!
//! let dominance = ParetoDominance::new(vec![Objective::Minimize, Objective::Minimize]);
//!
//! assert_eq!(dominance.compare(&[1.0, 2.0][..], &[2.0, 3.0][..]), PartialOrdering::Before);
//! assert_eq!(dominance.compare(&[1.0, 5.0][..], &[2.0, 3.0][..]), PartialOrdering::NotComparable);
//! ```
pub mod collection;
pub mod pareto;

use std::cmp::Ordering;
use std::marker::PhantomData;

pub use collection::{non_dominated_sort, PartiallyOrderedCollection};
pub use pareto::ParetoDominance;

/// The outcome of comparing two elements under a partial order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PartialOrdering {
    /// The first element is strictly better than the second one.
    Before,
    /// The first element is strictly worse than the second one.
    After,
    /// The two elements are equivalent.
    Same,
    /// Neither element is better than the other.
    NotComparable,
}

impl PartialOrdering {
    /// Swaps `Before` and `After`.
    pub fn reverse(self) -> Self {
        match self {
            PartialOrdering::Before => PartialOrdering::After,
            PartialOrdering::After => PartialOrdering::Before,
            other => other,
        }
    }

    pub fn is_before(self) -> bool {
        self == PartialOrdering::Before
    }

    pub fn is_after(self) -> bool {
        self == PartialOrdering::After
    }
}

impl From<Ordering> for PartialOrdering {
    fn from(ordering: Ordering) -> Self {
        match ordering {
            Ordering::Less => PartialOrdering::Before,
            Ordering::Greater => PartialOrdering::After,
            Ordering::Equal => PartialOrdering::Same,
        }
    }
}

impl From<Option<Ordering>> for PartialOrdering {
    fn from(ordering: Option<Ordering>) -> Self {
        ordering.map_or(PartialOrdering::NotComparable, PartialOrdering::from)
    }
}

/// Compares two elements under a partial order.
///
/// Implementations are assumed to be well-formed partial orders (reflexive
/// `Same`, antisymmetric `Before`/`After`, transitive); this is not checked.
///
/// Closures of type `Fn(&T, &T) -> PartialOrdering` implement this trait.
pub trait PartialComparator<T: ?Sized> {
    /// Compares `a` with `b`.
    fn compare(&self, a: &T, b: &T) -> PartialOrdering;

    /// Returns a comparator with `Before` and `After` swapped.
    fn reversed(self) -> Reversed<Self>
    where
        Self: Sized,
    {
        Reversed(self)
    }
}

impl<T: ?Sized, F> PartialComparator<T> for F
where
    F: Fn(&T, &T) -> PartialOrdering,
{
    fn compare(&self, a: &T, b: &T) -> PartialOrdering {
        self(a, b)
    }
}

/// A comparator with `Before` and `After` swapped. See [`PartialComparator::reversed`].
#[derive(Debug, Clone)]
pub struct Reversed<C>(C);

impl<T: ?Sized, C: PartialComparator<T>> PartialComparator<T> for Reversed<C> {
    fn compare(&self, a: &T, b: &T) -> PartialOrdering {
        self.0.compare(a, b).reverse()
    }
}

/// Compares elements of type `U` by comparing a key of type `T` extracted from them.
///
/// ```rust
/// use evosolve::order::{comparing, Objective, PartialComparator, PartialOrdering};
///
/// struct Scored { score: f64 }
///
/// let by_score = comparing(Objective::Maximize, |s: &Scored| &s.score);
/// assert_eq!(
///     by_score.compare(&Scored { score: 2.0 }, &Scored { score: 1.0 }),
///     PartialOrdering::Before
/// );
/// ```
pub fn comparing<U, T, C, F>(comparator: C, key: F) -> Comparing<C, F, T>
where
    T: ?Sized,
    C: PartialComparator<T>,
    F: Fn(&U) -> &T,
{
    Comparing {
        comparator,
        key,
        _marker: PhantomData,
    }
}

/// See [`comparing`].
pub struct Comparing<C, F, T: ?Sized> {
    comparator: C,
    key: F,
    _marker: PhantomData<fn(&T)>,
}

impl<U, T, C, F> PartialComparator<U> for Comparing<C, F, T>
where
    T: ?Sized,
    C: PartialComparator<T>,
    F: Fn(&U) -> &T,
{
    fn compare(&self, a: &U, b: &U) -> PartialOrdering {
        self.comparator.compare((self.key)(a), (self.key)(b))
    }
}

/// The optimization direction of a single numeric objective.
///
/// An `Objective` is a total order over `f64` (NaN sorts after every number,
/// following `f64::total_cmp`), in which `Before` means better.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Objective {
    Minimize,
    Maximize,
}

impl Objective {
    /// Orders two values so that the better one comes first.
    pub fn order(&self, a: f64, b: f64) -> Ordering {
        match self {
            Objective::Minimize => a.total_cmp(&b),
            Objective::Maximize => b.total_cmp(&a),
        }
    }
}

impl PartialComparator<f64> for Objective {
    fn compare(&self, a: &f64, b: &f64) -> PartialOrdering {
        self.order(*a, *b).into()
    }
}

/// Adapts a total order, given as an `Ordering`-returning function, to a
/// [`PartialComparator`] where `Less` means `Before`.
#[derive(Debug, Clone)]
pub struct TotalOrder<F>(pub F);

impl<T: ?Sized, F> PartialComparator<T> for TotalOrder<F>
where
    F: Fn(&T, &T) -> Ordering,
{
    fn compare(&self, a: &T, b: &T) -> PartialOrdering {
        (self.0)(a, b).into()
    }
}
