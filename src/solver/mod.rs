//! # Solvers
//!
//! Every solver follows the same life cycle, captured by [`IterativeSolver`]:
//! `init` builds and evaluates a first population, each `update` produces the
//! next state from the previous one, and a run ends at the first state for
//! which the solver's stop condition holds.
//!
//! Population-based solvers share their mechanics through [`PopulationSolver`]:
//! building genotypes, mapping them to solutions and qualities on an
//! [`Executor`], re-evaluating survivors when `remap` is set and breeding
//! offspring with weighted operators under a uniqueness budget. The concrete
//! algorithms only decide which genotypes to build and which individuals to
//! keep:
//!
//! - [`RandomSearch`]: one incumbent, replaced by strictly better random samples.
//! - [`NsgaII`]: multi-objective, survival by front rank then crowding distance.
//! - [`StandardEvolver`]: selection, variation and front-based trimming.
//! - [`SimpleEvolutionaryStrategy`]: Gaussian sampling around the mean of the best.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::executor::SequentialExecutor;
//! use evosolve::factory::UniformDoubleFactory;
//! use evosolve::problem::SingleObjectiveProblem;
//! use evosolve::rng::RandomNumberGenerator;
//! use evosolve::solver::{IterativeSolver, MaxIterations, RandomSearch, SolverState};
//!
//! let problem = SingleObjectiveProblem::minimizing(|x: &f64| (x - 1.0).abs());
//! let solver = RandomSearch::new(
//!     |g: &f64| *g,
//!     UniformDoubleFactory::new(-5.0, 5.0),
//!     MaxIterations::new(50),
//! )
//! .unwrap();
//! let mut rng = RandomNumberGenerator::from_seed(7);
//!
//! let state = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
//! assert_eq!(state.state().n_of_iterations(), 50);
//! assert_eq!(state.firsts().len(), 1);
//! ```

mod es;
mod individual;
mod nsga2;
mod options;
mod random_search;
mod standard;
mod state;
mod stop;

pub use es::SimpleEvolutionaryStrategy;
pub use individual::{Individual, RankedIndividual};
pub use nsga2::{crowding_distances, NsgaII, NsgaIIBuilder, NsgaIIState};
pub use options::{SolverOptions, SolverOptionsBuilder};
pub use random_search::RandomSearch;
pub use standard::StandardEvolver;
pub use state::{PopulationState, Progress, SolverState, State};
pub use stop::{MaxElapsed, MaxFitnessEvaluations, MaxIterations, StopCondition};

use std::fmt;
use std::marker::PhantomData;

use tracing::{debug, error, info, instrument, trace};

use crate::error::{Result, SolverError};
use crate::executor::Executor;
use crate::factory::Factory;
use crate::operator::WeightedOperators;
use crate::order::PartiallyOrderedCollection;
use crate::problem::QualityBasedProblem;
use crate::rng::RandomNumberGenerator;

/// Receives every state produced by a run.
///
/// Closures `FnMut(&St)` are listeners.
pub trait Listener<St> {
    /// Called with the state produced by `init` and by every `update`.
    fn listen(&mut self, state: &St);

    /// Called once, after the last state of a successful run.
    fn done(&mut self) {}
}

impl<St, F> Listener<St> for F
where
    F: FnMut(&St),
{
    fn listen(&mut self, state: &St) {
        self(state)
    }
}

/// A solver that proceeds by discrete steps over a problem of type `P`.
pub trait IterativeSolver<P> {
    type State: SolverState;

    /// Builds the initial state.
    ///
    /// # Errors
    ///
    /// Returns an error if any quality evaluation fails.
    fn init<E: Executor>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
    ) -> Result<Self::State>;

    /// Builds the state following `state`.
    ///
    /// # Errors
    ///
    /// Returns an error if variation or any quality evaluation fails; `state`
    /// is left untouched and no partial state is produced.
    fn update<E: Executor>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
        state: &Self::State,
    ) -> Result<Self::State>;

    /// Returns whether `state` is the last state of a run.
    fn is_done(&self, state: &Self::State) -> bool;

    /// Runs `init` then `update` until [`is_done`](IterativeSolver::is_done)
    /// holds, returning the final state.
    fn solve<E: Executor>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
    ) -> Result<Self::State> {
        self.solve_with_listener(problem, rng, executor, &mut |_: &Self::State| {})
    }

    /// Same as [`solve`](IterativeSolver::solve), passing every state to `listener`.
    fn solve_with_listener<E, L>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
        listener: &mut L,
    ) -> Result<Self::State>
    where
        E: Executor,
        L: Listener<Self::State> + ?Sized,
    {
        info!("Starting run");
        let mut state = self.init(problem, rng, executor).map_err(|e| {
            error!(error = %e, "Initialization failed");
            e
        })?;
        listener.listen(&state);

        while !self.is_done(&state) {
            state = self.update(problem, rng, executor, &state).map_err(|e| {
                error!(
                    error = %e,
                    iteration = state.state().n_of_iterations() + 1,
                    "Update failed"
                );
                e
            })?;
            let current = state.state();
            debug!(
                iteration = current.n_of_iterations(),
                births = current.n_of_births(),
                evaluations = current.n_of_fitness_evaluations(),
                progress = ?current.progress().rate(),
                "Iteration completed"
            );
            listener.listen(&state);
        }

        listener.done();
        let last = state.state();
        info!(
            iterations = last.n_of_iterations(),
            births = last.n_of_births(),
            evaluations = last.n_of_fitness_evaluations(),
            elapsed_millis = last.elapsed_millis() as u64,
            "Run completed"
        );
        Ok(state)
    }
}

enum MappingTask<G, S, Q> {
    Birth(G),
    Remap(Individual<G, S, Q>),
}

/// The machinery shared by population-based solvers.
///
/// It owns the solution mapper, turning genotypes into solutions, the genotype
/// factory and the [`SolverOptions`].
pub struct PopulationSolver<G, S, F, M> {
    solution_mapper: M,
    genotype_factory: F,
    options: SolverOptions,
    _marker: PhantomData<fn(&G) -> S>,
}

impl<G, S, F, M> PopulationSolver<G, S, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `options` are invalid.
    pub fn new(solution_mapper: M, genotype_factory: F, options: SolverOptions) -> Result<Self> {
        options.validate()?;
        Ok(Self {
            solution_mapper,
            genotype_factory,
            options,
            _marker: PhantomData,
        })
    }

    pub fn get_options(&self) -> &SolverOptions {
        &self.options
    }

    pub fn genotype_factory(&self) -> &F {
        &self.genotype_factory
    }

    /// Builds the individual of a genotype born at `iteration`.
    pub fn new_individual<P, Q>(
        &self,
        genotype: G,
        iteration: u64,
        problem: &P,
    ) -> Result<Individual<G, S, Q>>
    where
        P: QualityBasedProblem<S, Q>,
    {
        let solution = (self.solution_mapper)(&genotype);
        let quality = problem.quality(&solution)?;
        Ok(Individual {
            genotype,
            solution,
            quality,
            quality_mapping_iteration: iteration,
            genotype_birth_iteration: iteration,
        })
    }

    /// Re-evaluates the quality of `individual` at `iteration`.
    pub fn update_individual<P, Q>(
        &self,
        individual: Individual<G, S, Q>,
        iteration: u64,
        problem: &P,
    ) -> Result<Individual<G, S, Q>>
    where
        P: QualityBasedProblem<S, Q>,
    {
        let quality = problem.quality(&individual.solution)?;
        Ok(Individual {
            quality,
            quality_mapping_iteration: iteration,
            ..individual
        })
    }

    /// Maps newborn `genotypes` to individuals and, when remapping, re-evaluates
    /// `survivors`, all in one batch on `executor`.
    ///
    /// Returns the newborns, in genotype order, followed by the survivors, in
    /// their order, together with the number of quality evaluations performed.
    #[instrument(
        level = "debug",
        skip_all,
        fields(
            iteration = iteration,
            n_of_genotypes = genotypes.len(),
            n_of_survivors = survivors.len()
        )
    )]
    pub fn map<P, Q, E>(
        &self,
        genotypes: Vec<G>,
        survivors: Vec<Individual<G, S, Q>>,
        iteration: u64,
        problem: &P,
        executor: &E,
    ) -> Result<(Vec<Individual<G, S, Q>>, u64)>
    where
        P: QualityBasedProblem<S, Q>,
        Q: Send,
        E: Executor,
    {
        let n_of_births = genotypes.len();
        if !self.options.get_remap() {
            let mut individuals = executor.execute(genotypes, |genotype| {
                self.new_individual(genotype, iteration, problem)
            })?;
            individuals.extend(survivors);
            return Ok((individuals, n_of_births as u64));
        }

        let n_of_evaluations = (n_of_births + survivors.len()) as u64;
        let tasks: Vec<MappingTask<G, S, Q>> = genotypes
            .into_iter()
            .map(MappingTask::Birth)
            .chain(survivors.into_iter().map(MappingTask::Remap))
            .collect();
        let individuals = executor.execute(tasks, |task| match task {
            MappingTask::Birth(genotype) => self.new_individual(genotype, iteration, problem),
            MappingTask::Remap(individual) => {
                self.update_individual(individual, iteration, problem)
            }
        })?;
        Ok((individuals, n_of_evaluations))
    }

    /// Builds `n` offspring genotypes.
    ///
    /// For every child, an operator is picked by weight and its parents are
    /// drawn with `pick_parent`. Children equal to a genotype of `existing` or
    /// to an already accepted child are discarded, at most
    /// `max_uniqueness_attempts` times in a row; the next application is then
    /// accepted as is and the budget starts over for the following child.
    ///
    /// Duplicates are found by linear search, so a call costs
    /// `O((existing + n) * n)` genotype comparisons when uniqueness is enforced.
    pub fn breed<'p, Pick>(
        &self,
        n: usize,
        operators: &WeightedOperators<G>,
        existing: impl IntoIterator<Item = &'p G>,
        mut pick_parent: Pick,
        rng: &mut RandomNumberGenerator,
    ) -> Result<Vec<G>>
    where
        G: 'p,
        Pick: FnMut(&mut RandomNumberGenerator) -> Result<&'p G>,
    {
        let max_attempts = self.options.get_max_uniqueness_attempts();
        let mut seen: Vec<G> = if max_attempts > 0 {
            existing.into_iter().cloned().collect()
        } else {
            Vec::new()
        };
        let mut offspring: Vec<G> = Vec::with_capacity(n);
        let mut attempts = 0;
        let mut n_of_duplicates = 0;

        while offspring.len() < n {
            let operator = operators.pick(rng)?;
            let mut parents = Vec::with_capacity(operator.arity());
            for _ in 0..operator.arity() {
                parents.push(pick_parent(rng)?.clone());
            }
            let children = operator.apply(&parents, rng)?;
            if children.is_empty() {
                return Err(SolverError::Operator(
                    "Operator produced no children".to_string(),
                ));
            }

            let duplicated = max_attempts > 0 && children.iter().any(|c| seen.contains(c));
            if duplicated && attempts < max_attempts {
                attempts += 1;
                continue;
            }
            if duplicated {
                trace!(attempts, "Uniqueness budget exhausted, accepting a duplicate");
                n_of_duplicates += 1;
            }
            if max_attempts > 0 {
                seen.extend(children.iter().cloned());
            }
            offspring.extend(children);
            attempts = 0;
        }

        if n_of_duplicates > 0 {
            debug!(n_of_duplicates, n, "Offspring built with duplicate genotypes");
        }
        offspring.truncate(n);
        Ok(offspring)
    }
}

impl<G, S, F, M> fmt::Debug for PopulationSolver<G, S, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PopulationSolver")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Decomposes `individuals` into fronts under the problem's partial order.
pub(crate) fn partially_order<G, S, Q, P>(
    individuals: Vec<Individual<G, S, Q>>,
    problem: &P,
) -> PartiallyOrderedCollection<Individual<G, S, Q>>
where
    P: QualityBasedProblem<S, Q>,
{
    let comparator =
        |a: &Individual<G, S, Q>, b: &Individual<G, S, Q>| problem.compare(&a.quality, &b.quality);
    PartiallyOrderedCollection::new(individuals, &comparator)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::SequentialExecutor;
    use crate::factory::UniformDoubleFactory;
    use crate::operator::{GeneticOperator, MutationOperator};
    use crate::problem::SingleObjectiveProblem;

    type Core = PopulationSolver<
        f64,
        f64,
        UniformDoubleFactory,
        fn(&f64) -> f64,
    >;

    fn core(options: SolverOptions) -> Core {
        fn identity(g: &f64) -> f64 {
            *g
        }
        PopulationSolver::new(
            identity as fn(&f64) -> f64,
            UniformDoubleFactory::new(0.0, 1.0),
            options,
        )
        .unwrap()
    }

    fn constant_operator() -> WeightedOperators<f64> {
        let operator = MutationOperator::new(|_: &f64, _: &mut RandomNumberGenerator| 1.0);
        WeightedOperators::new(vec![(Box::new(operator) as Box<dyn GeneticOperator<f64>>, 1.0)])
            .unwrap()
    }

    #[test]
    fn test_invalid_options() {
        let result = PopulationSolver::<f64, f64, _, _>::new(
            |g: &f64| *g,
            UniformDoubleFactory::new(0.0, 1.0),
            SolverOptions::new(0, 0, false),
        );
        match result {
            Err(SolverError::Configuration(_)) => {}
            _ => panic!("Expected Configuration error"),
        }
    }

    #[test]
    fn test_map_without_remap() {
        let core = core(SolverOptions::new(10, 0, false));
        let problem = SingleObjectiveProblem::minimizing(|x: &f64| x * 2.0);
        let survivor = core.new_individual(3.0, 0, &problem).unwrap();

        let (individuals, evaluations) = core
            .map(vec![1.0, 2.0], vec![survivor], 4, &problem, &SequentialExecutor)
            .unwrap();
        assert_eq!(evaluations, 2);
        let qualities: Vec<f64> = individuals.iter().map(|i| i.quality).collect();
        assert_eq!(qualities, vec![2.0, 4.0, 6.0]);
        assert_eq!(individuals[0].genotype_birth_iteration, 4);
        assert_eq!(individuals[2].quality_mapping_iteration, 0);
    }

    #[test]
    fn test_map_with_remap() {
        let core = core(SolverOptions::new(10, 0, true));
        let problem = SingleObjectiveProblem::minimizing(|x: &f64| x * 2.0);
        let survivor = core.new_individual(3.0, 1, &problem).unwrap();

        let (individuals, evaluations) = core
            .map(vec![1.0], vec![survivor], 5, &problem, &SequentialExecutor)
            .unwrap();
        assert_eq!(evaluations, 2);
        assert_eq!(individuals[1].genotype_birth_iteration, 1);
        assert_eq!(individuals[1].quality_mapping_iteration, 5);
    }

    #[test]
    fn test_breed_gives_up_on_uniqueness() {
        let core = core(SolverOptions::new(10, 3, false));
        let operators = constant_operator();
        let parent = 0.5;
        let mut rng = RandomNumberGenerator::from_seed(1);
        let offspring = core
            .breed(4, &operators, [&parent], |_| Ok(&parent), &mut rng)
            .unwrap();
        assert_eq!(offspring, vec![1.0; 4]);
    }

    #[test]
    fn test_breed_budget_starts_over_for_each_child() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let core = core(SolverOptions::new(10, 1, false));
        // the first three applications repeat the parent, later ones are all distinct
        let calls = AtomicUsize::new(0);
        let operator = MutationOperator::new(move |_: &f64, _: &mut RandomNumberGenerator| {
            let call = calls.fetch_add(1, Ordering::SeqCst);
            if call < 3 {
                0.5
            } else {
                call as f64
            }
        });
        let operators =
            WeightedOperators::new(vec![(Box::new(operator) as Box<dyn GeneticOperator<f64>>, 1.0)])
                .unwrap();
        let parent = 0.5;
        let mut rng = RandomNumberGenerator::from_seed(1);

        let offspring = core
            .breed(2, &operators, [&parent], |_| Ok(&parent), &mut rng)
            .unwrap();
        assert_eq!(offspring, vec![0.5, 3.0]);
    }

    #[test]
    fn test_breed_propagates_parent_errors() {
        let core = core(SolverOptions::new(10, 3, false));
        let operators = constant_operator();
        let mut rng = RandomNumberGenerator::from_seed(1);
        let result = core.breed(
            2,
            &operators,
            std::iter::empty(),
            |_| Err(SolverError::EmptyPopulation),
            &mut rng,
        );
        assert!(matches!(result, Err(SolverError::EmptyPopulation)));
    }

    #[test]
    fn test_listener_closure() {
        let mut seen = Vec::new();
        let mut listener = |state: &State| seen.push(state.n_of_iterations());
        listener.listen(&State::new(0, 0));
        listener.listen(&State::new(0, 0).next(0, 0));
        Listener::<State>::done(&mut listener);
        assert_eq!(seen, vec![0, 1]);
    }
}
