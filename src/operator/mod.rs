//! # Genetic Operators
//!
//! A [`GeneticOperator`] turns `arity()` parent genotypes into one or more child
//! genotypes. Operators never modify their parents and keep no state between
//! calls: the children depend only on the parents and on the draws taken from
//! the random number generator.
//!
//! Most operators are either a [`Mutation`] (one parent, one child) or a
//! [`Crossover`] (two parents, one child). Wrap them in [`MutationOperator`] or
//! [`CrossoverOperator`] to use them where a `GeneticOperator` is expected, and
//! chain operators with [`GeneticOperator::and_then`].
//!
//! ## Example
//!
//! ```rust
//! use evosolve::operator::{GeneticOperator, GaussianMutation, MutationOperator, CrossoverOperator, UniformCrossover};
//! use evosolve::rng::RandomNumberGenerator;
//!
//! let mut rng = RandomNumberGenerator::from_seed(42);
//!
//! let crossover_then_mutation = CrossoverOperator::new(UniformCrossover)
//!     .and_then(MutationOperator::new(GaussianMutation::new(0.1).unwrap()))
//!     .unwrap();
//!
//! let parents = vec![vec![0.0, 0.0, 0.0], vec![1.0, 1.0, 1.0]];
//! let children = crossover_then_mutation.apply(&parents, &mut rng).unwrap();
//!
//! assert_eq!(GeneticOperator::<Vec<f64>>::arity(&crossover_then_mutation), 2);
//! assert_eq!(children.len(), 1);
//! assert_eq!(children[0].len(), 3);
//! ```

pub mod crossover;
pub mod mutation;

pub use crossover::UniformCrossover;
pub use mutation::{BitFlipMutation, GaussianMutation};

use crate::error::{Result, SolverError};
use crate::rng::RandomNumberGenerator;

/// A variation operator with a fixed number of parents.
pub trait GeneticOperator<G>: Send + Sync {
    /// Returns the number of parents `apply` expects.
    fn arity(&self) -> usize;

    /// Builds children from `parents`.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::Operator` when `parents.len()` differs from
    /// [`arity`](GeneticOperator::arity).
    fn apply(&self, parents: &[G], rng: &mut RandomNumberGenerator) -> Result<Vec<G>>;

    /// Chains `next` after this operator: every child of this operator is fed,
    /// alone, to `next`.
    ///
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `next` does not have arity 1.
    fn and_then<O>(self, next: O) -> Result<Sequence<Self, O>>
    where
        Self: Sized,
        O: GeneticOperator<G>,
    {
        Sequence::new::<G>(self, next)
    }
}

impl<G, O> GeneticOperator<G> for Box<O>
where
    O: GeneticOperator<G> + ?Sized,
{
    fn arity(&self) -> usize {
        (**self).arity()
    }

    fn apply(&self, parents: &[G], rng: &mut RandomNumberGenerator) -> Result<Vec<G>> {
        (**self).apply(parents, rng)
    }
}

fn check_arity(expected: usize, parents: usize) -> Result<()> {
    if expected != parents {
        return Err(SolverError::Operator(format!(
            "Expected {} parents, got {}",
            expected, parents
        )));
    }
    Ok(())
}

/// Builds one child from one parent.
///
/// Closures `Fn(&G, &mut RandomNumberGenerator) -> G` implement this trait.
pub trait Mutation<G>: Send + Sync {
    fn mutate(&self, parent: &G, rng: &mut RandomNumberGenerator) -> G;
}

impl<G, F> Mutation<G> for F
where
    F: Fn(&G, &mut RandomNumberGenerator) -> G + Send + Sync,
{
    fn mutate(&self, parent: &G, rng: &mut RandomNumberGenerator) -> G {
        self(parent, rng)
    }
}

/// Builds one child from two parents.
///
/// Closures `Fn(&G, &G, &mut RandomNumberGenerator) -> G` implement this trait.
pub trait Crossover<G>: Send + Sync {
    fn recombine(&self, first: &G, second: &G, rng: &mut RandomNumberGenerator) -> G;
}

impl<G, F> Crossover<G> for F
where
    F: Fn(&G, &G, &mut RandomNumberGenerator) -> G + Send + Sync,
{
    fn recombine(&self, first: &G, second: &G, rng: &mut RandomNumberGenerator) -> G {
        self(first, second, rng)
    }
}

/// Adapts a [`Mutation`] to a [`GeneticOperator`] of arity 1.
#[derive(Debug, Clone)]
pub struct MutationOperator<M>(M);

impl<M> MutationOperator<M> {
    pub fn new(mutation: M) -> Self {
        Self(mutation)
    }
}

impl<G, M> GeneticOperator<G> for MutationOperator<M>
where
    M: Mutation<G>,
{
    fn arity(&self) -> usize {
        1
    }

    fn apply(&self, parents: &[G], rng: &mut RandomNumberGenerator) -> Result<Vec<G>> {
        check_arity(1, parents.len())?;
        Ok(vec![self.0.mutate(&parents[0], rng)])
    }
}

/// Adapts a [`Crossover`] to a [`GeneticOperator`] of arity 2.
#[derive(Debug, Clone)]
pub struct CrossoverOperator<C>(C);

impl<C> CrossoverOperator<C> {
    pub fn new(crossover: C) -> Self {
        Self(crossover)
    }
}

impl<G, C> GeneticOperator<G> for CrossoverOperator<C>
where
    C: Crossover<G>,
{
    fn arity(&self) -> usize {
        2
    }

    fn apply(&self, parents: &[G], rng: &mut RandomNumberGenerator) -> Result<Vec<G>> {
        check_arity(2, parents.len())?;
        Ok(vec![self.0.recombine(&parents[0], &parents[1], rng)])
    }
}

/// Two operators applied one after the other. See [`GeneticOperator::and_then`].
#[derive(Debug, Clone)]
pub struct Sequence<A, B> {
    first: A,
    second: B,
}

impl<A, B> Sequence<A, B> {
    /// Creates the sequence, checking that `second` takes a single parent.
    pub fn new<G>(first: A, second: B) -> Result<Self>
    where
        A: GeneticOperator<G>,
        B: GeneticOperator<G>,
    {
        if second.arity() != 1 {
            return Err(SolverError::Configuration(format!(
                "The second operator of a sequence must have arity 1, found {}",
                second.arity()
            )));
        }
        Ok(Self { first, second })
    }
}

impl<G, A, B> GeneticOperator<G> for Sequence<A, B>
where
    A: GeneticOperator<G>,
    B: GeneticOperator<G>,
{
    fn arity(&self) -> usize {
        self.first.arity()
    }

    fn apply(&self, parents: &[G], rng: &mut RandomNumberGenerator) -> Result<Vec<G>> {
        let intermediate = self.first.apply(parents, rng)?;
        let mut children = Vec::with_capacity(intermediate.len());
        for child in intermediate {
            children.extend(self.second.apply(std::slice::from_ref(&child), rng)?);
        }
        Ok(children)
    }
}

/// A set of operators, each with a probability weight.
///
/// Weights are relative: an operator is picked with probability equal to its
/// weight divided by the sum of all weights.
pub struct WeightedOperators<G> {
    operators: Vec<Box<dyn GeneticOperator<G>>>,
    weights: Vec<f64>,
}

impl<G> WeightedOperators<G> {
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when there are no operators, when a
    /// weight is negative or not finite, when the weights sum to zero, or when an
    /// operator has arity zero.
    pub fn new(operators: Vec<(Box<dyn GeneticOperator<G>>, f64)>) -> Result<Self> {
        if operators.is_empty() {
            return Err(SolverError::Configuration(
                "At least one operator is required".to_string(),
            ));
        }
        let (operators, weights): (Vec<_>, Vec<_>) = operators.into_iter().unzip();
        if let Some(weight) = weights.iter().find(|w| !w.is_finite() || **w < 0.0) {
            return Err(SolverError::Configuration(format!(
                "Operator weights must be finite and non-negative, got {}",
                weight
            )));
        }
        if weights.iter().sum::<f64>() <= 0.0 {
            return Err(SolverError::Configuration(
                "Operator weights must not all be zero".to_string(),
            ));
        }
        if operators.iter().any(|operator| operator.arity() == 0) {
            return Err(SolverError::Configuration(
                "Operators must take at least one parent".to_string(),
            ));
        }
        Ok(Self { operators, weights })
    }

    /// Picks an operator with probability proportional to its weight.
    pub fn pick(&self, rng: &mut RandomNumberGenerator) -> Result<&dyn GeneticOperator<G>> {
        rng.pick_weighted(&self.weights)
            .map(|index| self.operators[index].as_ref())
            .ok_or_else(|| SolverError::Configuration("No operator can be picked".to_string()))
    }

    pub fn len(&self) -> usize {
        self.operators.len()
    }

    pub fn is_empty(&self) -> bool {
        self.operators.is_empty()
    }
}

impl<G> std::fmt::Debug for WeightedOperators<G> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeightedOperators")
            .field("weights", &self.weights)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn increment() -> MutationOperator<impl Mutation<i32>> {
        MutationOperator::new(|g: &i32, _: &mut RandomNumberGenerator| g + 1)
    }

    fn sum() -> CrossoverOperator<impl Crossover<i32>> {
        CrossoverOperator::new(|a: &i32, b: &i32, _: &mut RandomNumberGenerator| a + b)
    }

    #[test]
    fn test_wrong_parent_count() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        match increment().apply(&[1, 2], &mut rng) {
            Err(SolverError::Operator(_)) => {}
            _ => panic!("Expected Operator error"),
        }
        match sum().apply(&[1], &mut rng) {
            Err(SolverError::Operator(_)) => {}
            _ => panic!("Expected Operator error"),
        }
    }

    #[test]
    fn test_sequence() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        let operator = sum().and_then(increment()).unwrap();
        assert_eq!(GeneticOperator::<i32>::arity(&operator), 2);
        assert_eq!(operator.apply(&[3, 4], &mut rng).unwrap(), vec![8]);
    }

    #[test]
    fn test_sequence_requires_unary_second() {
        match increment().and_then(sum()) {
            Err(SolverError::Configuration(_)) => {}
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_parents_untouched() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        let parents = vec![5];
        let children = increment().apply(&parents, &mut rng).unwrap();
        assert_eq!(parents, vec![5]);
        assert_eq!(children, vec![6]);
    }

    #[test]
    fn test_weighted_operators_validation() {
        assert!(WeightedOperators::<i32>::new(vec![]).is_err());
        assert!(WeightedOperators::new(vec![(
            Box::new(increment()) as Box<dyn GeneticOperator<i32>>,
            -1.0
        )])
        .is_err());
        assert!(WeightedOperators::new(vec![(
            Box::new(increment()) as Box<dyn GeneticOperator<i32>>,
            0.0
        )])
        .is_err());
    }

    #[test]
    fn test_weighted_operators_pick() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        let operators = WeightedOperators::new(vec![
            (Box::new(increment()) as Box<dyn GeneticOperator<i32>>, 0.0),
            (Box::new(sum()) as Box<dyn GeneticOperator<i32>>, 1.0),
        ])
        .unwrap();
        assert_eq!(operators.len(), 2);
        for _ in 0..20 {
            assert_eq!(operators.pick(&mut rng).unwrap().arity(), 2);
        }
    }

    #[test]
    fn test_boxed_operator() {
        let mut rng = RandomNumberGenerator::from_seed(0);
        let boxed: Box<dyn GeneticOperator<i32>> = Box::new(increment());
        assert_eq!(boxed.arity(), 1);
        assert_eq!(boxed.apply(&[1], &mut rng).unwrap(), vec![2]);
    }
}
