//! # Solver States
//!
//! A [`State`] is the immutable snapshot a solver produces at every step:
//! `init` builds the first one and every `update` builds a new one from the
//! previous. Listeners and stop conditions only ever read states.

use std::time::{Duration, SystemTime};

use crate::order::PartiallyOrderedCollection;

use super::Individual;

/// How far a run is from its end, as a rate in `[0, 1]`, if known.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Progress {
    rate: Option<f64>,
}

impl Progress {
    /// Progress that cannot be estimated.
    pub const NA: Progress = Progress { rate: None };

    /// Creates a progress, clamping `rate` to `[0, 1]`. NaN means not available.
    pub fn new(rate: f64) -> Self {
        if rate.is_nan() {
            return Self::NA;
        }
        Self {
            rate: Some(rate.clamp(0.0, 1.0)),
        }
    }

    pub fn rate(&self) -> Option<f64> {
        self.rate
    }

    pub fn is_na(&self) -> bool {
        self.rate.is_none()
    }
}

/// The bookkeeping shared by the states of every solver.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct State {
    started_at: SystemTime,
    elapsed: Duration,
    n_of_iterations: u64,
    progress: Progress,
    n_of_births: u64,
    n_of_fitness_evaluations: u64,
}

impl State {
    /// Creates the state of a run starting now, after `n_of_births` genotypes were
    /// built and `n_of_fitness_evaluations` qualities computed.
    pub fn new(n_of_births: u64, n_of_fitness_evaluations: u64) -> Self {
        Self {
            started_at: SystemTime::now(),
            elapsed: Duration::ZERO,
            n_of_iterations: 0,
            progress: Progress::NA,
            n_of_births,
            n_of_fitness_evaluations,
        }
    }

    /// Returns the state of the next iteration, adding `n_of_births` and
    /// `n_of_fitness_evaluations` to the counters.
    pub fn next(&self, n_of_births: u64, n_of_fitness_evaluations: u64) -> Self {
        Self {
            started_at: self.started_at,
            elapsed: self.started_at.elapsed().unwrap_or(self.elapsed),
            n_of_iterations: self.n_of_iterations + 1,
            progress: self.progress,
            n_of_births: self.n_of_births + n_of_births,
            n_of_fitness_evaluations: self.n_of_fitness_evaluations + n_of_fitness_evaluations,
        }
    }

    /// Returns a copy of this state with the given progress.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.progress = progress;
        self
    }

    pub fn started_at(&self) -> SystemTime {
        self.started_at
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    pub fn elapsed_millis(&self) -> u128 {
        self.elapsed.as_millis()
    }

    pub fn n_of_iterations(&self) -> u64 {
        self.n_of_iterations
    }

    pub fn progress(&self) -> Progress {
        self.progress
    }

    pub fn n_of_births(&self) -> u64 {
        self.n_of_births
    }

    pub fn n_of_fitness_evaluations(&self) -> u64 {
        self.n_of_fitness_evaluations
    }
}

/// Gives access to the bookkeeping part of a solver state.
pub trait SolverState {
    fn state(&self) -> &State;
}

impl SolverState for State {
    fn state(&self) -> &State {
        self
    }
}

/// The state of a population-based solver: the bookkeeping plus the current
/// population, decomposed into fronts.
#[derive(Debug, Clone)]
pub struct PopulationState<G, S, Q> {
    state: State,
    population: PartiallyOrderedCollection<Individual<G, S, Q>>,
}

impl<G, S, Q> PopulationState<G, S, Q> {
    pub fn new(state: State, population: PartiallyOrderedCollection<Individual<G, S, Q>>) -> Self {
        Self { state, population }
    }

    /// Returns a copy of this state with the given progress.
    pub fn with_progress(mut self, progress: Progress) -> Self {
        self.state = self.state.with_progress(progress);
        self
    }

    pub fn population(&self) -> &PartiallyOrderedCollection<Individual<G, S, Q>> {
        &self.population
    }

    /// Returns every individual of the population, front by front.
    pub fn all(&self) -> impl Iterator<Item = &Individual<G, S, Q>> {
        self.population.all()
    }

    /// Returns the non-dominated individuals of the population.
    pub fn firsts(&self) -> &[Individual<G, S, Q>] {
        self.population.firsts()
    }

    pub fn fronts(&self) -> &[Vec<Individual<G, S, Q>>] {
        self.population.fronts()
    }
}

impl<G, S, Q> SolverState for PopulationState<G, S, Q> {
    fn state(&self) -> &State {
        &self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_next_accumulates_counters() {
        let first = State::new(10, 10);
        let second = first.next(5, 7);
        assert_eq!(first.n_of_iterations(), 0);
        assert_eq!(second.n_of_iterations(), 1);
        assert_eq!(second.n_of_births(), 15);
        assert_eq!(second.n_of_fitness_evaluations(), 17);
        assert_eq!(second.started_at(), first.started_at());
        assert!(second.elapsed() >= first.elapsed());
    }

    #[test]
    fn test_progress() {
        assert!(Progress::NA.is_na());
        assert!(Progress::new(f64::NAN).is_na());
        assert_eq!(Progress::new(1.5).rate(), Some(1.0));
        assert_eq!(Progress::new(0.25).rate(), Some(0.25));
        let state = State::new(0, 0).with_progress(Progress::new(0.5));
        assert_eq!(state.progress().rate(), Some(0.5));
    }
}
