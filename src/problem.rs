//! # Problems
//!
//! A problem maps a solution `S` to a quality `Q` and knows how to compare two
//! qualities. Solvers only ever see problems through [`QualityBasedProblem`].
//!
//! Two ready-made adapters cover the common cases:
//!
//! - [`SingleObjectiveProblem`]: one numeric objective, totally ordered.
//! - [`MultiObjectiveProblem`]: a vector of numeric objectives compared by
//!   Pareto dominance.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::order::{Objective, PartialOrdering};
//! use evosolve::problem::{MultiObjectiveProblem, QualityBasedProblem};
//!
//! let problem = MultiObjectiveProblem::new(
//!     vec![Objective::Minimize, Objective::Minimize],
//!     |x: &f64| vec![x * x, (x - 2.0) * (x - 2.0)],
//! )
//! .unwrap();
//!
//! let a = problem.quality(&0.0).unwrap();
//! let b = problem.quality(&2.0).unwrap();
//! assert_eq!(problem.compare(&a, &b), PartialOrdering::NotComparable);
//! ```

use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, SolverError};
use crate::order::{Objective, ParetoDominance, PartialComparator, PartialOrdering};

/// A problem defined by a quality function and a partial order over qualities.
///
/// Implementations are shared by concurrent evaluation tasks, so `quality` must
/// only read from `self`.
pub trait QualityBasedProblem<S, Q>: Send + Sync {
    /// Computes the quality of `solution`.
    ///
    /// # Errors
    ///
    /// Any error aborts the solver step that requested the evaluation.
    fn quality(&self, solution: &S) -> Result<Q>;

    /// Compares two qualities; `Before` means the first one is better.
    fn compare(&self, a: &Q, b: &Q) -> PartialOrdering;
}

impl<S, Q, P> QualityBasedProblem<S, Q> for Box<P>
where
    P: QualityBasedProblem<S, Q> + ?Sized,
{
    fn quality(&self, solution: &S) -> Result<Q> {
        (**self).quality(solution)
    }

    fn compare(&self, a: &Q, b: &Q) -> PartialOrdering {
        (**self).compare(a, b)
    }
}

/// A problem whose quality is a vector of numeric objectives.
pub trait MultiHomogeneousObjectiveProblem<S>: QualityBasedProblem<S, Vec<f64>> {
    /// Returns the direction of each objective, in quality order.
    fn objectives(&self) -> &[Objective];
}

fn check_number(value: f64, index: usize) -> Result<f64> {
    if value.is_nan() {
        return Err(SolverError::InvalidNumericValue(format!(
            "Objective {} evaluated to NaN",
            index
        )));
    }
    Ok(value)
}

/// A single numeric objective to minimize or maximize.
pub struct SingleObjectiveProblem<S, F> {
    objective: Objective,
    function: F,
    _marker: PhantomData<fn(&S)>,
}

impl<S, F> SingleObjectiveProblem<S, F>
where
    F: Fn(&S) -> f64 + Send + Sync,
{
    pub fn new(objective: Objective, function: F) -> Self {
        Self {
            objective,
            function,
            _marker: PhantomData,
        }
    }

    pub fn minimizing(function: F) -> Self {
        Self::new(Objective::Minimize, function)
    }

    pub fn maximizing(function: F) -> Self {
        Self::new(Objective::Maximize, function)
    }

    pub fn get_objective(&self) -> Objective {
        self.objective
    }
}

impl<S, F: Clone> Clone for SingleObjectiveProblem<S, F> {
    fn clone(&self) -> Self {
        Self {
            objective: self.objective,
            function: self.function.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, F> fmt::Debug for SingleObjectiveProblem<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleObjectiveProblem")
            .field("objective", &self.objective)
            .finish_non_exhaustive()
    }
}

impl<S, F> QualityBasedProblem<S, f64> for SingleObjectiveProblem<S, F>
where
    F: Fn(&S) -> f64 + Send + Sync,
{
    fn quality(&self, solution: &S) -> Result<f64> {
        check_number((self.function)(solution), 0)
    }

    fn compare(&self, a: &f64, b: &f64) -> PartialOrdering {
        self.objective.compare(a, b)
    }
}

/// Several numeric objectives compared by Pareto dominance.
pub struct MultiObjectiveProblem<S, F> {
    objectives: Vec<Objective>,
    dominance: ParetoDominance<Objective>,
    function: F,
    _marker: PhantomData<fn(&S)>,
}

impl<S, F> MultiObjectiveProblem<S, F>
where
    F: Fn(&S) -> Vec<f64> + Send + Sync,
{
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `objectives` is empty.
    pub fn new(objectives: Vec<Objective>, function: F) -> Result<Self> {
        if objectives.is_empty() {
            return Err(SolverError::Configuration(
                "At least one objective is required".to_string(),
            ));
        }
        Ok(Self {
            dominance: ParetoDominance::new(objectives.clone()),
            objectives,
            function,
            _marker: PhantomData,
        })
    }
}

impl<S, F: Clone> Clone for MultiObjectiveProblem<S, F> {
    fn clone(&self) -> Self {
        Self {
            objectives: self.objectives.clone(),
            dominance: self.dominance.clone(),
            function: self.function.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S, F> fmt::Debug for MultiObjectiveProblem<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MultiObjectiveProblem")
            .field("objectives", &self.objectives)
            .finish_non_exhaustive()
    }
}

impl<S, F> QualityBasedProblem<S, Vec<f64>> for MultiObjectiveProblem<S, F>
where
    F: Fn(&S) -> Vec<f64> + Send + Sync,
{
    fn quality(&self, solution: &S) -> Result<Vec<f64>> {
        let values = (self.function)(solution);
        if values.len() != self.objectives.len() {
            return Err(SolverError::Evaluation(format!(
                "Expected {} objective values, got {}",
                self.objectives.len(),
                values.len()
            )));
        }
        values
            .into_iter()
            .enumerate()
            .map(|(index, value)| check_number(value, index))
            .collect()
    }

    fn compare(&self, a: &Vec<f64>, b: &Vec<f64>) -> PartialOrdering {
        self.dominance.compare(a, b)
    }
}

impl<S, F> MultiHomogeneousObjectiveProblem<S> for MultiObjectiveProblem<S, F>
where
    F: Fn(&S) -> Vec<f64> + Send + Sync,
{
    fn objectives(&self) -> &[Objective] {
        &self.objectives
    }
}
