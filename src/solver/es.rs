use std::fmt;

use tracing::{instrument, trace};

use super::{
    partially_order, Individual, IterativeSolver, PopulationSolver, PopulationState, SolverOptions,
    SolverState, State, StopCondition,
};
use crate::error::{Result, SolverError};
use crate::executor::Executor;
use crate::factory::Factory;
use crate::operator::{GaussianMutation, Mutation};
use crate::order::PartiallyOrderedCollection;
use crate::problem::QualityBasedProblem;
use crate::rng::RandomNumberGenerator;

/// A simple evolutionary strategy over real vectors.
///
/// At every iteration, the genotypes of the best `n_of_parents` individuals are
/// averaged coordinate by coordinate, and `population_size - n_of_elites`
/// offspring are sampled around the mean with a Gaussian perturbation of
/// standard deviation `sigma`. The best `n_of_elites` individuals survive
/// unchanged, re-evaluated when `remap` is set.
///
/// "Best" follows the front decomposition: individuals are taken front by front.
pub struct SimpleEvolutionaryStrategy<S, Q, F, M> {
    core: PopulationSolver<Vec<f64>, S, F, M>,
    mutation: GaussianMutation,
    n_of_parents: usize,
    n_of_elites: usize,
    stop_condition: Box<dyn StopCondition<PopulationState<Vec<f64>, S, Q>>>,
}

impl<S, Q, F, M> SimpleEvolutionaryStrategy<S, Q, F, M>
where
    S: Clone + Send + Sync,
    Q: Clone + Send,
    F: Factory<Vec<f64>>,
    M: Fn(&Vec<f64>) -> S + Send + Sync,
{
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `sigma` is invalid, when
    /// `n_of_parents` is not in `1..=population_size` or when `n_of_elites` is
    /// not below `population_size`.
    pub fn new<C>(
        solution_mapper: M,
        genotype_factory: F,
        sigma: f64,
        n_of_parents: usize,
        n_of_elites: usize,
        options: SolverOptions,
        stop_condition: C,
    ) -> Result<Self>
    where
        C: StopCondition<PopulationState<Vec<f64>, S, Q>> + 'static,
    {
        let population_size = options.get_population_size();
        if n_of_parents == 0 || n_of_parents > population_size {
            return Err(SolverError::Configuration(format!(
                "Number of parents must be between 1 and {}, got {}",
                population_size, n_of_parents
            )));
        }
        if n_of_elites >= population_size {
            return Err(SolverError::Configuration(format!(
                "Number of elites must be below {}, got {}",
                population_size, n_of_elites
            )));
        }
        Ok(Self {
            core: PopulationSolver::new(solution_mapper, genotype_factory, options)?,
            mutation: GaussianMutation::new(sigma)?,
            n_of_parents,
            n_of_elites,
            stop_condition: Box::new(stop_condition),
        })
    }

    pub fn get_options(&self) -> &SolverOptions {
        self.core.get_options()
    }

    pub fn get_sigma(&self) -> f64 {
        self.mutation.get_sigma()
    }

    pub fn get_n_of_parents(&self) -> usize {
        self.n_of_parents
    }

    pub fn get_n_of_elites(&self) -> usize {
        self.n_of_elites
    }

    fn next_state(
        &self,
        state: State,
        population: PartiallyOrderedCollection<Individual<Vec<f64>, S, Q>>,
    ) -> PopulationState<Vec<f64>, S, Q> {
        let next = PopulationState::new(state, population);
        let progress = self.stop_condition.progress(&next);
        next.with_progress(progress)
    }
}

/// Averages real vectors coordinate by coordinate.
fn mean(genotypes: &[&Vec<f64>]) -> Result<Vec<f64>> {
    let (first, rest) = genotypes
        .split_first()
        .ok_or(SolverError::EmptyPopulation)?;
    if rest.iter().any(|genotype| genotype.len() != first.len()) {
        return Err(SolverError::Operator(
            "Cannot average genotypes of different lengths".to_string(),
        ));
    }
    let mut sum = (*first).clone();
    for genotype in rest {
        for (total, value) in sum.iter_mut().zip(genotype.iter()) {
            *total += value;
        }
    }
    let n = genotypes.len() as f64;
    Ok(sum.into_iter().map(|total| total / n).collect())
}

impl<S, Q, F, M> fmt::Debug for SimpleEvolutionaryStrategy<S, Q, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimpleEvolutionaryStrategy")
            .field("core", &self.core)
            .field("sigma", &self.mutation.get_sigma())
            .field("n_of_parents", &self.n_of_parents)
            .field("n_of_elites", &self.n_of_elites)
            .finish_non_exhaustive()
    }
}

impl<S, Q, F, M, P> IterativeSolver<P> for SimpleEvolutionaryStrategy<S, Q, F, M>
where
    S: Clone + Send + Sync,
    Q: Clone + Send,
    F: Factory<Vec<f64>>,
    M: Fn(&Vec<f64>) -> S + Send + Sync,
    P: QualityBasedProblem<S, Q>,
{
    type State = PopulationState<Vec<f64>, S, Q>;

    fn init<E: Executor>(
        &self,
        problem: &P,
        rng: &mut RandomNumberGenerator,
        executor: &E,
    ) -> Result<Self::State> {
        let population_size = self.core.get_options().get_population_size();
        let genotypes = self.core.genotype_factory().build(population_size, rng);
        let n_of_births = genotypes.len() as u64;
        let (individuals, evaluations) =
            self.core.map(genotypes, Vec::new(), 0, problem, executor)?;
        let population = partially_order(individuals, problem);
        Ok(self.next_state(State::new(n_of_births, evaluations), population))
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
        let parents: Vec<&Vec<f64>> = state
            .all()
            .take(self.n_of_parents)
            .map(|individual| &individual.genotype)
            .collect();
        let mean = mean(&parents)?;
        trace!(n_of_parents = parents.len(), "Mean genotype computed");

        let population_size = self.core.get_options().get_population_size();
        let offspring: Vec<Vec<f64>> = (0..population_size - self.n_of_elites)
            .map(|_| self.mutation.mutate(&mean, rng))
            .collect();
        let n_of_births = offspring.len() as u64;
        let elites: Vec<Individual<Vec<f64>, S, Q>> =
            state.all().take(self.n_of_elites).cloned().collect();

        let (individuals, evaluations) =
            self.core
                .map(offspring, elites, iteration, problem, executor)?;
        let population = partially_order(individuals, problem);
        Ok(self.next_state(state.state().next(n_of_births, evaluations), population))
    }

    fn is_done(&self, state: &Self::State) -> bool {
        self.stop_condition.should_stop(state)
    }
}
