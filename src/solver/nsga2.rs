//! # NSGA-II
//!
//! The non-dominated sorting genetic algorithm for multi-objective problems.
//!
//! At every iteration, `population_size` children are bred from parents drawn
//! with a bias towards the best ranked ones; parents and children are then
//! merged, decomposed into Pareto fronts and sorted by front index first and
//! crowding distance (descending) second, and the first `population_size`
//! individuals survive.
//!
//! ## Example
//!
//! ```rust
//! use evosolve::executor::SequentialExecutor;
//! use evosolve::factory::{FixedLengthListFactory, UniformDoubleFactory};
//! use evosolve::operator::{CrossoverOperator, GaussianMutation, MutationOperator, UniformCrossover};
//! use evosolve::order::Objective;
//! use evosolve::problem::MultiObjectiveProblem;
//! use evosolve::rng::RandomNumberGenerator;
//! use evosolve::solver::{IterativeSolver, MaxIterations, NsgaII, SolverOptions};
//!
//! let problem = MultiObjectiveProblem::new(
//!     vec![Objective::Minimize, Objective::Minimize],
//!     |x: &Vec<f64>| vec![x[0] * x[0], (x[0] - 2.0) * (x[0] - 2.0)],
//! )
//! .unwrap();
//!
//! let solver = NsgaII::builder()
//!     .with_solution_mapper(|g: &Vec<f64>| g.clone())
//!     .with_genotype_factory(FixedLengthListFactory::new(1, UniformDoubleFactory::new(-5.0, 5.0)))
//!     .with_operator(MutationOperator::new(GaussianMutation::new(0.1).unwrap()), 0.8)
//!     .with_operator(CrossoverOperator::new(UniformCrossover), 0.2)
//!     .with_options(SolverOptions::builder().population_size(20).build().unwrap())
//!     .with_stop_condition(MaxIterations::new(10))
//!     .build()
//!     .unwrap();
//!
//! let mut rng = RandomNumberGenerator::from_seed(1);
//! let state = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
//!
//! assert_eq!(state.ranked().len(), 20);
//! assert!(!state.firsts().is_empty());
//! ```

use std::fmt;

use tracing::instrument;

use super::{
    partially_order, Individual, IterativeSolver, PopulationSolver, Progress, RankedIndividual,
    SolverOptions, SolverState, State, StopCondition,
};
use crate::error::{Result, SolverError};
use crate::executor::Executor;
use crate::factory::Factory;
use crate::operator::{GeneticOperator, WeightedOperators};
use crate::order::{Objective, PartiallyOrderedCollection};
use crate::problem::MultiHomogeneousObjectiveProblem;
use crate::rng::RandomNumberGenerator;

type MultiObjectiveIndividual<G, S> = Individual<G, S, Vec<f64>>;

/// Computes the crowding distance of every element of a front.
///
/// For each objective, the elements are sorted by their value on that objective
/// (ties keep their order in `front`); every interior element accumulates the
/// absolute difference between the values of its two neighbours, and the two
/// boundary elements accumulate infinity.
///
/// ```rust
/// use evosolve::order::Objective;
/// use evosolve::solver::crowding_distances;
///
/// let front = vec![vec![1.0, 5.0], vec![3.0, 3.0], vec![5.0, 1.0]];
/// let distances = crowding_distances(&front, &[Objective::Minimize, Objective::Minimize]);
///
/// assert_eq!(distances, vec![f64::INFINITY, 8.0, f64::INFINITY]);
/// ```
///
/// # Panics
///
/// Panics if a quality of `front` has fewer values than `objectives`. The
/// solver checks quality lengths before ranking.
pub fn crowding_distances<Q>(front: &[Q], objectives: &[Objective]) -> Vec<f64>
where
    Q: AsRef<[f64]>,
{
    let n = front.len();
    let mut distances = vec![0.0; n];
    if n == 0 {
        return distances;
    }
    for (index, objective) in objectives.iter().enumerate() {
        let value = |i: usize| front[i].as_ref()[index];
        let mut sorted: Vec<usize> = (0..n).collect();
        sorted.sort_by(|&a, &b| objective.order(value(a), value(b)));
        for window in sorted.windows(3) {
            distances[window[1]] += (value(window[0]) - value(window[2])).abs();
        }
        distances[sorted[0]] += f64::INFINITY;
        distances[sorted[n - 1]] += f64::INFINITY;
    }
    distances
}

/// The state of [`NsgaII`]: the population as fronts and as a ranked list, best first.
#[derive(Debug, Clone)]
pub struct NsgaIIState<G, S> {
    state: State,
    population: PartiallyOrderedCollection<MultiObjectiveIndividual<G, S>>,
    ranked: Vec<RankedIndividual<G, S, Vec<f64>>>,
}

impl<G, S> NsgaIIState<G, S> {
    pub fn population(&self) -> &PartiallyOrderedCollection<MultiObjectiveIndividual<G, S>> {
        &self.population
    }

    /// Returns the population sorted by front index, then by decreasing crowding distance.
    pub fn ranked(&self) -> &[RankedIndividual<G, S, Vec<f64>>] {
        &self.ranked
    }

    pub fn all(&self) -> impl Iterator<Item = &MultiObjectiveIndividual<G, S>> {
        self.population.all()
    }

    pub fn firsts(&self) -> &[MultiObjectiveIndividual<G, S>] {
        self.population.firsts()
    }

    pub fn fronts(&self) -> &[Vec<MultiObjectiveIndividual<G, S>>] {
        self.population.fronts()
    }

    fn with_progress(mut self, progress: Progress) -> Self {
        self.state = self.state.with_progress(progress);
        self
    }
}

impl<G, S> SolverState for NsgaIIState<G, S> {
    fn state(&self) -> &State {
        &self.state
    }
}

/// The NSGA-II solver. See the [module documentation](self).
pub struct NsgaII<G, S, F, M> {
    core: PopulationSolver<G, S, F, M>,
    operators: WeightedOperators<G>,
    stop_condition: Box<dyn StopCondition<NsgaIIState<G, S>>>,
}

impl<G, S, F, M> NsgaII<G, S, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when `options` are invalid.
    pub fn new<C>(
        solution_mapper: M,
        genotype_factory: F,
        operators: WeightedOperators<G>,
        options: SolverOptions,
        stop_condition: C,
    ) -> Result<Self>
    where
        C: StopCondition<NsgaIIState<G, S>> + 'static,
    {
        Ok(Self {
            core: PopulationSolver::new(solution_mapper, genotype_factory, options)?,
            operators,
            stop_condition: Box::new(stop_condition),
        })
    }

    pub fn builder() -> NsgaIIBuilder<G, S, F, M> {
        NsgaIIBuilder::new()
    }

    pub fn get_options(&self) -> &SolverOptions {
        self.core.get_options()
    }

    /// Ranks `individuals` and keeps the best `population_size` of them.
    fn rank<P>(
        &self,
        individuals: Vec<MultiObjectiveIndividual<G, S>>,
        problem: &P,
    ) -> Result<(
        PartiallyOrderedCollection<MultiObjectiveIndividual<G, S>>,
        Vec<RankedIndividual<G, S, Vec<f64>>>,
    )>
    where
        P: MultiHomogeneousObjectiveProblem<S>,
    {
        let objectives = problem.objectives();
        if let Some(individual) = individuals
            .iter()
            .find(|individual| individual.quality.len() != objectives.len())
        {
            return Err(SolverError::Evaluation(format!(
                "Expected {} objective values, got {}",
                objectives.len(),
                individual.quality.len()
            )));
        }

        let fronts = partially_order(individuals, problem).into_fronts();
        let mut ranked = Vec::with_capacity(fronts.iter().map(Vec::len).sum());
        for (rank, front) in fronts.into_iter().enumerate() {
            let distances = {
                let qualities: Vec<&[f64]> = front.iter().map(|i| i.quality.as_slice()).collect();
                crowding_distances(&qualities, objectives)
            };
            ranked.extend(front.into_iter().zip(distances).map(
                |(individual, crowding_distance)| RankedIndividual {
                    individual,
                    rank,
                    crowding_distance,
                },
            ));
        }
        ranked.sort_by(|a, b| {
            a.rank
                .cmp(&b.rank)
                .then_with(|| b.crowding_distance.total_cmp(&a.crowding_distance))
        });
        ranked.truncate(self.core.get_options().get_population_size());

        let mut fronts: Vec<Vec<MultiObjectiveIndividual<G, S>>> = Vec::new();
        for r in &ranked {
            while fronts.len() <= r.rank {
                fronts.push(Vec::new());
            }
            fronts[r.rank].push(r.individual.clone());
        }
        Ok((PartiallyOrderedCollection::from_fronts(fronts), ranked))
    }

    fn next_state(
        &self,
        state: State,
        population: PartiallyOrderedCollection<MultiObjectiveIndividual<G, S>>,
        ranked: Vec<RankedIndividual<G, S, Vec<f64>>>,
    ) -> NsgaIIState<G, S> {
        let next = NsgaIIState {
            state,
            population,
            ranked,
        };
        let progress = self.stop_condition.progress(&next);
        next.with_progress(progress)
    }
}

impl<G, S, F, M> fmt::Debug for NsgaII<G, S, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NsgaII")
            .field("core", &self.core)
            .field("operators", &self.operators)
            .finish_non_exhaustive()
    }
}

impl<G, S, F, M, P> IterativeSolver<P> for NsgaII<G, S, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
    P: MultiHomogeneousObjectiveProblem<S>,
{
    type State = NsgaIIState<G, S>;

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
        let (population, ranked) = self.rank(individuals, problem)?;
        Ok(self.next_state(State::new(n_of_births, evaluations), population, ranked))
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
        let ranked = state.ranked();
        let size = ranked.len();
        if size == 0 {
            return Err(SolverError::EmptyPopulation);
        }

        let offspring = self.core.breed(
            self.core.get_options().get_population_size(),
            &self.operators,
            ranked.iter().map(|r| &r.individual.genotype),
            move |rng: &mut RandomNumberGenerator| {
                // the ranked list is sorted best first
                let first = rng.gen_index(size);
                let second = rng.gen_index(size);
                Ok(&ranked[first.min(second)].individual.genotype)
            },
            rng,
        )?;
        let n_of_births = offspring.len() as u64;
        let parents: Vec<MultiObjectiveIndividual<G, S>> =
            ranked.iter().map(|r| r.individual.clone()).collect();

        let (individuals, evaluations) =
            self.core
                .map(offspring, parents, iteration, problem, executor)?;
        let (population, ranked) = self.rank(individuals, problem)?;
        Ok(self.next_state(
            state.state().next(n_of_births, evaluations),
            population,
            ranked,
        ))
    }

    fn is_done(&self, state: &Self::State) -> bool {
        self.stop_condition.should_stop(state)
    }
}

/// Builder for [`NsgaII`].
pub struct NsgaIIBuilder<G, S, F, M> {
    solution_mapper: Option<M>,
    genotype_factory: Option<F>,
    operators: Vec<(Box<dyn GeneticOperator<G>>, f64)>,
    options: SolverOptions,
    stop_condition: Option<Box<dyn StopCondition<NsgaIIState<G, S>>>>,
}

impl<G, S, F, M> NsgaIIBuilder<G, S, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            solution_mapper: None,
            genotype_factory: None,
            operators: Vec::new(),
            options: SolverOptions::default(),
            stop_condition: None,
        }
    }

    pub fn with_solution_mapper(mut self, solution_mapper: M) -> Self {
        self.solution_mapper = Some(solution_mapper);
        self
    }

    pub fn with_genotype_factory(mut self, genotype_factory: F) -> Self {
        self.genotype_factory = Some(genotype_factory);
        self
    }

    /// Adds an operator picked with a probability proportional to `weight`.
    pub fn with_operator<O>(mut self, operator: O, weight: f64) -> Self
    where
        O: GeneticOperator<G> + 'static,
    {
        self.operators.push((Box::new(operator), weight));
        self
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stop_condition<C>(mut self, stop_condition: C) -> Self
    where
        C: StopCondition<NsgaIIState<G, S>> + 'static,
    {
        self.stop_condition = Some(Box::new(stop_condition));
        self
    }

    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when a component is missing or invalid.
    pub fn build(self) -> Result<NsgaII<G, S, F, M>> {
        let solution_mapper = self.solution_mapper.ok_or_else(|| {
            SolverError::Configuration("Solution mapper not specified".to_string())
        })?;

        let genotype_factory = self.genotype_factory.ok_or_else(|| {
            SolverError::Configuration("Genotype factory not specified".to_string())
        })?;

        let stop_condition = self.stop_condition.ok_or_else(|| {
            SolverError::Configuration("Stop condition not specified".to_string())
        })?;

        Ok(NsgaII {
            core: PopulationSolver::new(solution_mapper, genotype_factory, self.options)?,
            operators: WeightedOperators::new(self.operators)?,
            stop_condition,
        })
    }
}

impl<G, S, F, M> Default for NsgaIIBuilder<G, S, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
