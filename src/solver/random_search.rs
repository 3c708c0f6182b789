use std::fmt;

use tracing::{instrument, trace};

use super::{
    Individual, IterativeSolver, PopulationSolver, PopulationState, SolverOptions, SolverState,
    State, StopCondition,
};
use crate::error::{OptionExt, Result, SolverError};
use crate::executor::Executor;
use crate::factory::IndependentFactory;
use crate::order::{PartialOrdering, PartiallyOrderedCollection};
use crate::problem::QualityBasedProblem;
use crate::rng::RandomNumberGenerator;

/// The baseline solver: keeps a single incumbent and, at every iteration,
/// compares it with a freshly built random genotype.
///
/// The incumbent is replaced only when the new individual is strictly better,
/// so on a plateau the earliest individual found is kept.
pub struct RandomSearch<G, S, Q, F, M> {
    core: PopulationSolver<G, S, F, M>,
    stop_condition: Box<dyn StopCondition<PopulationState<G, S, Q>>>,
}

impl<G, S, Q, F, M> RandomSearch<G, S, Q, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    Q: Clone + Send,
    F: IndependentFactory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    /// Creates a random search that never re-evaluates its incumbent.
    pub fn new<C>(solution_mapper: M, genotype_factory: F, stop_condition: C) -> Result<Self>
    where
        C: StopCondition<PopulationState<G, S, Q>> + 'static,
    {
        Ok(Self {
            core: PopulationSolver::new(
                solution_mapper,
                genotype_factory,
                SolverOptions::new(1, 0, false),
            )?,
            stop_condition: Box::new(stop_condition),
        })
    }

    /// Sets whether the incumbent is re-evaluated at every iteration.
    pub fn with_remap(mut self, remap: bool) -> Self {
        self.core.options.set_remap(remap);
        self
    }

    fn next_state(&self, state: State, incumbent: Individual<G, S, Q>) -> PopulationState<G, S, Q> {
        let population = PartiallyOrderedCollection::from_fronts(vec![vec![incumbent]]);
        let next = PopulationState::new(state, population);
        let progress = self.stop_condition.progress(&next);
        next.with_progress(progress)
    }
}

impl<G, S, Q, F, M> fmt::Debug for RandomSearch<G, S, Q, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomSearch")
            .field("core", &self.core)
            .finish_non_exhaustive()
    }
}

impl<G, S, Q, F, M, P> IterativeSolver<P> for RandomSearch<G, S, Q, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    Q: Clone + Send,
    F: IndependentFactory<G>,
    M: Fn(&G) -> S + Send + Sync,
    P: QualityBasedProblem<S, Q>,
{
    type State = PopulationState<G, S, Q>;

    fn init<E: Executor>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
    ) -> Result<Self::State> {
        let genotype = self.core.genotype_factory().build_one(rng);
        let (mut individuals, evaluations) =
            self.core.map(vec![genotype], Vec::new(), 0, problem, executor)?;
        let incumbent = individuals
            .pop()
            .ok_or_else_solver(|| SolverError::EmptyPopulation)?;
        Ok(self.next_state(State::new(1, evaluations), incumbent))
    }

    #[instrument(level = "debug", skip_all, fields(iteration = state.state().n_of_iterations() + 1))]
    fn update<E: Executor>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
        state: &Self::State,
    ) -> Result<Self::State> {
        let iteration = state.state().n_of_iterations() + 1;
        let incumbent = state
            .firsts()
            .first()
            .cloned()
            .ok_or_else_solver(|| SolverError::EmptyPopulation)?;

        let genotype = self.core.genotype_factory().build_one(rng);
        let (individuals, evaluations) =
            self.core
                .map(vec![genotype], vec![incumbent], iteration, problem, executor)?;
        let mut individuals = individuals.into_iter();
        let (candidate, incumbent) = match (individuals.next(), individuals.next()) {
            (Some(candidate), Some(incumbent)) => (candidate, incumbent),
            _ => return Err(SolverError::EmptyPopulation),
        };

        let survivor = if problem.compare(&candidate.quality, &incumbent.quality)
            == PartialOrdering::Before
        {
            trace!(iteration, "Incumbent replaced");
            candidate
        } else {
            incumbent
        };
        Ok(self.next_state(state.state().next(1, evaluations), survivor))
    }

    fn is_done(&self, state: &Self::State) -> bool {
        self.stop_condition.should_stop(state)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SequentialExecutor;
    use crate::factory::UniformDoubleFactory;
    use crate::problem::SingleObjectiveProblem;
    use crate::solver::MaxIterations;

    #[test]
    fn test_ties_keep_the_incumbent() {
        let problem = SingleObjectiveProblem::minimizing(|_: &f64| 0.0);
        let solver = RandomSearch::new(
            |g: &f64| *g,
            UniformDoubleFactory::new(0.0, 1.0),
            MaxIterations::new(20),
        )
        .unwrap();
        let mut rng = RandomNumberGenerator::from_seed(2);

        let first = solver.init(&problem, &mut rng, &SequentialExecutor).unwrap();
        let mut rng = RandomNumberGenerator::from_seed(2);
        let last = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
        assert_eq!(last.firsts()[0].genotype, first.firsts()[0].genotype);
        assert_eq!(last.firsts()[0].genotype_birth_iteration, 0);
    }

    #[test]
    fn test_counters() {
        let problem = SingleObjectiveProblem::minimizing(|x: &f64| *x);
        let solver = RandomSearch::new(
            |g: &f64| *g,
            UniformDoubleFactory::new(0.0, 1.0),
            MaxIterations::new(10),
        )
        .unwrap()
        .with_remap(true);
        let mut rng = RandomNumberGenerator::from_seed(2);

        let state = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
        assert_eq!(state.state().n_of_iterations(), 10);
        assert_eq!(state.state().n_of_births(), 11);
        // one birth plus one remap per iteration
        assert_eq!(state.state().n_of_fitness_evaluations(), 21);
        assert_eq!(state.state().progress().rate(), Some(1.0));
    }
}
