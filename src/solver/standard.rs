use std::fmt;

use tracing::{instrument, trace};

use super::{
    partially_order, Individual, IterativeSolver, PopulationSolver, PopulationState, SolverOptions,
    SolverState, State, StopCondition,
};
use crate::error::{Result, SolverError};
use crate::executor::Executor;
use crate::factory::Factory;
use crate::operator::{GeneticOperator, WeightedOperators};
use crate::order::PartiallyOrderedCollection;
use crate::problem::QualityBasedProblem;
use crate::rng::RandomNumberGenerator;
use crate::selection::Selector;

/// A generic evolutionary algorithm.
///
/// At every iteration `offspring_size` children are bred from parents chosen by
/// the parent selector. With overlapping generations, parents and children
/// compete for survival; otherwise only children do. The population is then
/// brought back to `population_size` by repeatedly discarding a random element
/// of the worst front.
pub struct StandardEvolver<G, S, Q, F, M> {
    core: PopulationSolver<G, S, F, M>,
    operators: WeightedOperators<G>,
    parent_selector: Box<dyn Selector<Individual<G, S, Q>>>,
    offspring_size: usize,
    overlapping: bool,
    stop_condition: Box<dyn StopCondition<PopulationState<G, S, Q>>>,
}

impl<G, S, Q, F, M> StandardEvolver<G, S, Q, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    Q: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    pub fn builder() -> StandardEvolverBuilder<G, S, Q, F, M> {
        StandardEvolverBuilder::new()
    }

    pub fn get_options(&self) -> &SolverOptions {
        self.core.get_options()
    }

    pub fn get_offspring_size(&self) -> usize {
        self.offspring_size
    }

    pub fn is_overlapping(&self) -> bool {
        self.overlapping
    }

    fn trim<P>(
        &self,
        individuals: Vec<Individual<G, S, Q>>,
        problem: &P,
        rng: &mut RandomNumberGenerator,
    ) -> PartiallyOrderedCollection<Individual<G, S, Q>>
    where
        P: QualityBasedProblem<S, Q>,
    {
        let population_size = self.core.get_options().get_population_size();
        let mut fronts = partially_order(individuals, problem).into_fronts();
        let mut size: usize = fronts.iter().map(Vec::len).sum();
        while size > population_size {
            let Some(last) = fronts.last_mut() else {
                break;
            };
            let index = rng.gen_index(last.len());
            last.remove(index);
            size -= 1;
            if last.is_empty() {
                fronts.pop();
            }
        }
        PartiallyOrderedCollection::from_fronts(fronts)
    }

    fn next_state(
        &self,
        state: State,
        population: PartiallyOrderedCollection<Individual<G, S, Q>>,
    ) -> PopulationState<G, S, Q> {
        let next = PopulationState::new(state, population);
        let progress = self.stop_condition.progress(&next);
        next.with_progress(progress)
    }
}

impl<G, S, Q, F, M> fmt::Debug for StandardEvolver<G, S, Q, F, M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StandardEvolver")
            .field("core", &self.core)
            .field("operators", &self.operators)
            .field("offspring_size", &self.offspring_size)
            .field("overlapping", &self.overlapping)
            .finish_non_exhaustive()
    }
}

impl<G, S, Q, F, M, P> IterativeSolver<P> for StandardEvolver<G, S, Q, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    Q: Clone + Send + Sync,
    F: Factory<G>,
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
        let population_size = self.core.get_options().get_population_size();
        let genotypes = self.core.genotype_factory().build(population_size, rng);
        let n_of_births = genotypes.len() as u64;
        let (individuals, evaluations) =
            self.core.map(genotypes, Vec::new(), 0, problem, executor)?;
        let population = self.trim(individuals, problem, rng);
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
        let population = state.population();
        if population.is_empty() {
            return Err(SolverError::EmptyPopulation);
        }

        let selector = &self.parent_selector;
        let offspring = self.core.breed(
            self.offspring_size,
            &self.operators,
            population.all().map(|individual| &individual.genotype),
            move |rng: &mut RandomNumberGenerator| {
                selector
                    .select(population, rng)
                    .map(|individual| &individual.genotype)
                    .ok_or(SolverError::EmptyPopulation)
            },
            rng,
        )?;
        let n_of_births = offspring.len() as u64;

        let survivors: Vec<Individual<G, S, Q>> = if self.overlapping {
            population.all().cloned().collect()
        } else {
            Vec::new()
        };
        let (individuals, evaluations) =
            self.core
                .map(offspring, survivors, iteration, problem, executor)?;
        let candidates = individuals.len();
        let population = self.trim(individuals, problem, rng);
        trace!(
            candidates,
            survivors = population.len(),
            "Population trimmed"
        );
        Ok(self.next_state(state.state().next(n_of_births, evaluations), population))
    }

    fn is_done(&self, state: &Self::State) -> bool {
        self.stop_condition.should_stop(state)
    }
}

/// Builder for [`StandardEvolver`].
///
/// Unless set, offspring are as many as the population and generations overlap.
pub struct StandardEvolverBuilder<G, S, Q, F, M> {
    solution_mapper: Option<M>,
    genotype_factory: Option<F>,
    operators: Vec<(Box<dyn GeneticOperator<G>>, f64)>,
    parent_selector: Option<Box<dyn Selector<Individual<G, S, Q>>>>,
    offspring_size: Option<usize>,
    overlapping: bool,
    options: SolverOptions,
    stop_condition: Option<Box<dyn StopCondition<PopulationState<G, S, Q>>>>,
}

impl<G, S, Q, F, M> StandardEvolverBuilder<G, S, Q, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    Q: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    pub fn new() -> Self {
        Self {
            solution_mapper: None,
            genotype_factory: None,
            operators: Vec::new(),
            parent_selector: None,
            offspring_size: None,
            overlapping: true,
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

    pub fn with_operator<O>(mut self, operator: O, weight: f64) -> Self
    where
        O: GeneticOperator<G> + 'static,
    {
        self.operators.push((Box::new(operator), weight));
        self
    }

    pub fn with_parent_selector<Sel>(mut self, parent_selector: Sel) -> Self
    where
        Sel: Selector<Individual<G, S, Q>> + 'static,
    {
        self.parent_selector = Some(Box::new(parent_selector));
        self
    }

    pub fn with_offspring_size(mut self, offspring_size: usize) -> Self {
        self.offspring_size = Some(offspring_size);
        self
    }

    pub fn with_overlapping(mut self, overlapping: bool) -> Self {
        self.overlapping = overlapping;
        self
    }

    pub fn with_options(mut self, options: SolverOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stop_condition<C>(mut self, stop_condition: C) -> Self
    where
        C: StopCondition<PopulationState<G, S, Q>> + 'static,
    {
        self.stop_condition = Some(Box::new(stop_condition));
        self
    }

    /// # Errors
    ///
    /// Returns `SolverError::Configuration` when a component is missing or invalid.
    pub fn build(self) -> Result<StandardEvolver<G, S, Q, F, M>> {
        let solution_mapper = self.solution_mapper.ok_or_else(|| {
            SolverError::Configuration("Solution mapper not specified".to_string())
        })?;

        let genotype_factory = self.genotype_factory.ok_or_else(|| {
            SolverError::Configuration("Genotype factory not specified".to_string())
        })?;

        let parent_selector = self.parent_selector.ok_or_else(|| {
            SolverError::Configuration("Parent selector not specified".to_string())
        })?;

        let stop_condition = self.stop_condition.ok_or_else(|| {
            SolverError::Configuration("Stop condition not specified".to_string())
        })?;

        let offspring_size = self
            .offspring_size
            .unwrap_or_else(|| self.options.get_population_size());
        if offspring_size == 0 {
            return Err(SolverError::Configuration(
                "Offspring size cannot be zero".to_string(),
            ));
        }

        Ok(StandardEvolver {
            core: PopulationSolver::new(solution_mapper, genotype_factory, self.options)?,
            operators: WeightedOperators::new(self.operators)?,
            parent_selector,
            offspring_size,
            overlapping: self.overlapping,
            stop_condition,
        })
    }
}

impl<G, S, Q, F, M> Default for StandardEvolverBuilder<G, S, Q, F, M>
where
    G: Clone + PartialEq + Send + Sync,
    S: Clone + Send + Sync,
    Q: Clone + Send + Sync,
    F: Factory<G>,
    M: Fn(&G) -> S + Send + Sync,
{
    fn default() -> Self {
        Self::new()
    }
}
