//! # Stop Conditions
//!
//! A [`StopCondition`] decides, looking only at a state, whether a run is over.
//! It may also estimate how far the run has got, which solvers store in the
//! [`Progress`] of every state they produce.
//!
//! Any closure `Fn(&St) -> bool` is a stop condition.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::solver::{MaxIterations, State, StopCondition};
//!
//! let condition = MaxIterations::new(2);
//! let state = State::new(1, 1);
//!
//! assert!(!condition.should_stop(&state));
//! assert!(condition.should_stop(&state.next(1, 1).next(1, 1)));
//! assert_eq!(condition.progress(&state.next(1, 1)).rate(), Some(0.5));
//! ```

use std::time::Duration;

use super::state::{Progress, SolverState};

/// Decides when a run ends. Must not have side effects.
pub trait StopCondition<St>: Send + Sync {
    fn should_stop(&self, state: &St) -> bool;

    fn progress(&self, _state: &St) -> Progress {
        Progress::NA
    }
}

impl<St, F> StopCondition<St> for F
where
    F: Fn(&St) -> bool + Send + Sync,
{
    fn should_stop(&self, state: &St) -> bool {
        self(state)
    }
}

fn ratio(done: f64, total: f64) -> Progress {
    if total <= 0.0 {
        return Progress::new(1.0);
    }
    Progress::new(done / total)
}

/// Stops after a number of iterations.
#[derive(Debug, Clone, Copy)]
pub struct MaxIterations {
    n: u64,
}

impl MaxIterations {
    pub fn new(n: u64) -> Self {
        Self { n }
    }
}

impl<St: SolverState> StopCondition<St> for MaxIterations {
    fn should_stop(&self, state: &St) -> bool {
        state.state().n_of_iterations() >= self.n
    }

    fn progress(&self, state: &St) -> Progress {
        ratio(state.state().n_of_iterations() as f64, self.n as f64)
    }
}

/// Stops after a number of quality evaluations.
#[derive(Debug, Clone, Copy)]
pub struct MaxFitnessEvaluations {
    n: u64,
}

impl MaxFitnessEvaluations {
    pub fn new(n: u64) -> Self {
        Self { n }
    }
}

impl<St: SolverState> StopCondition<St> for MaxFitnessEvaluations {
    fn should_stop(&self, state: &St) -> bool {
        state.state().n_of_fitness_evaluations() >= self.n
    }

    fn progress(&self, state: &St) -> Progress {
        ratio(state.state().n_of_fitness_evaluations() as f64, self.n as f64)
    }
}

/// Stops once a run has been going for a given time.
#[derive(Debug, Clone, Copy)]
pub struct MaxElapsed {
    duration: Duration,
}

impl MaxElapsed {
    pub fn new(duration: Duration) -> Self {
        Self { duration }
    }
}

impl<St: SolverState> StopCondition<St> for MaxElapsed {
    fn should_stop(&self, state: &St) -> bool {
        state.state().elapsed() >= self.duration
    }

    fn progress(&self, state: &St) -> Progress {
        ratio(
            state.state().elapsed().as_secs_f64(),
            self.duration.as_secs_f64(),
        )
    }
}
