use evosolve::executor::{ParallelExecutor, SequentialExecutor};
use evosolve::factory::{BitStringFactory, FixedLengthListFactory, UniformDoubleFactory, UniqueFactory};
use evosolve::operator::{BitFlipMutation, CrossoverOperator, MutationOperator, UniformCrossover};
use evosolve::problem::SingleObjectiveProblem;
use evosolve::rng::RandomNumberGenerator;
use evosolve::selection::{RandomSelector, Tournament};
use evosolve::solver::{
    IterativeSolver, MaxIterations, PopulationState, SimpleEvolutionaryStrategy, SolverOptions,
    SolverState, StandardEvolver,
};

type BitString = Vec<bool>;
type OneMaxState = PopulationState<BitString, BitString, f64>;

fn ones(bits: &BitString) -> f64 {
    bits.iter().filter(|&&bit| bit).count() as f64
}

fn best_ones(state: &OneMaxState) -> f64 {
    state.firsts()[0].quality
}

fn one_max_evolver(
    options: SolverOptions,
    overlapping: bool,
    iterations: u64,
) -> StandardEvolver<BitString, BitString, f64, BitStringFactory, fn(&BitString) -> BitString> {
    fn identity(bits: &BitString) -> BitString {
        bits.clone()
    }
    StandardEvolver::builder()
        .with_solution_mapper(identity as fn(&BitString) -> BitString)
        .with_genotype_factory(BitStringFactory::new(24))
        .with_operator(MutationOperator::new(BitFlipMutation::new(0.05).unwrap()), 0.7)
        .with_operator(CrossoverOperator::new(UniformCrossover), 0.3)
        .with_parent_selector(Tournament::new(3).unwrap())
        .with_overlapping(overlapping)
        .with_options(options)
        .with_stop_condition(MaxIterations::new(iterations))
        .build()
        .unwrap()
}

#[test]
fn test_standard_evolver_keeps_its_best() {
    let problem = SingleObjectiveProblem::maximizing(ones);
    let solver = one_max_evolver(SolverOptions::new(20, 50, false), true, 30);
    let mut rng = RandomNumberGenerator::from_seed(4);

    let mut history = Vec::new();
    let state = solver
        .solve_with_listener(&problem, &mut rng, &SequentialExecutor, &mut |state: &OneMaxState| {
            history.push((best_ones(state), state.population().len()))
        })
        .unwrap();

    assert_eq!(history.len(), 31);
    for pair in history.windows(2) {
        assert!(pair[1].0 >= pair[0].0);
    }
    assert!(history.iter().all(|&(_, size)| size == 20));
    assert_eq!(state.state().n_of_births(), 20 + 30 * 20);
    assert_eq!(state.state().n_of_fitness_evaluations(), 20 + 30 * 20);
}

#[test]
fn test_standard_evolver_remap_accounting() {
    let problem = SingleObjectiveProblem::maximizing(ones);
    let solver = one_max_evolver(SolverOptions::new(10, 0, true), true, 4);
    let mut rng = RandomNumberGenerator::from_seed(9);

    let state = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
    assert_eq!(state.state().n_of_births(), 10 + 4 * 10);
    // offspring plus the whole previous population
    assert_eq!(state.state().n_of_fitness_evaluations(), 10 + 4 * 20);
    assert!(state
        .all()
        .all(|individual| individual.quality_mapping_iteration == 4));
}

#[test]
fn test_standard_evolver_parallel_run_is_reproducible() {
    let problem = SingleObjectiveProblem::maximizing(ones);
    let solver = one_max_evolver(SolverOptions::new(16, 20, false), true, 10);
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(3)
        .build()
        .unwrap();

    let mut rng = RandomNumberGenerator::from_seed(77);
    let sequential = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(77);
    let parallel = solver
        .solve(&problem, &mut rng, &ParallelExecutor::with_threshold(&pool, 4))
        .unwrap();

    let genotypes = |state: &OneMaxState| -> Vec<BitString> {
        state.all().map(|individual| individual.genotype.clone()).collect()
    };
    assert_eq!(genotypes(&sequential), genotypes(&parallel));
}

#[test]
fn test_standard_evolver_with_smaller_offspring() {
    let problem = SingleObjectiveProblem::maximizing(ones);
    let solver = StandardEvolver::builder()
        .with_solution_mapper(|bits: &BitString| bits.clone())
        .with_genotype_factory(BitStringFactory::new(8))
        .with_operator(MutationOperator::new(BitFlipMutation::new(0.2).unwrap()), 1.0)
        .with_parent_selector(RandomSelector)
        .with_offspring_size(5)
        .with_options(SolverOptions::new(12, 10, false))
        .with_stop_condition(MaxIterations::new(3))
        .build()
        .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(5);

    let state = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
    assert_eq!(solver.get_offspring_size(), 5);
    assert_eq!(state.population().len(), 12);
    assert_eq!(state.state().n_of_births(), 12 + 3 * 5);
}

#[test]
fn test_standard_evolver_with_unique_factory() {
    let problem = SingleObjectiveProblem::maximizing(ones);
    let solver = StandardEvolver::builder()
        .with_solution_mapper(|bits: &BitString| bits.clone())
        .with_genotype_factory(UniqueFactory::new(BitStringFactory::new(3), 1000))
        .with_operator(MutationOperator::new(BitFlipMutation::new(0.3).unwrap()), 1.0)
        .with_parent_selector(Tournament::new(2).unwrap())
        .with_options(SolverOptions::new(8, 10, false))
        .with_stop_condition(MaxIterations::new(2))
        .build()
        .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(6);

    // all 8 strings of 3 bits in the initial population
    let initial = solver.init(&problem, &mut rng, &SequentialExecutor).unwrap();
    let mut genotypes: Vec<BitString> = initial
        .all()
        .map(|individual| individual.genotype.clone())
        .collect();
    genotypes.sort();
    genotypes.dedup();
    assert_eq!(genotypes.len(), 8);

    let state = solver.update(&problem, &mut rng, &SequentialExecutor, &initial).unwrap();
    assert_eq!(best_ones(&state), 3.0);
    assert_eq!(state.population().len(), 8);
}

fn sphere(x: &Vec<f64>) -> f64 {
    x.iter().map(|value| value * value).sum()
}

#[test]
fn test_evolutionary_strategy_converges_on_sphere() {
    let problem = SingleObjectiveProblem::minimizing(sphere);
    let solver = SimpleEvolutionaryStrategy::new(
        |genotype: &Vec<f64>| genotype.clone(),
        FixedLengthListFactory::new(3, UniformDoubleFactory::new(-5.0, 5.0)),
        0.3,
        5,
        1,
        SolverOptions::new(20, 0, false),
        MaxIterations::new(80),
    )
    .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(31);

    let mut best = Vec::new();
    let state = solver
        .solve_with_listener(
            &problem,
            &mut rng,
            &SequentialExecutor,
            &mut |state: &PopulationState<Vec<f64>, Vec<f64>, f64>| {
                best.push(state.firsts()[0].quality)
            },
        )
        .unwrap();

    for pair in best.windows(2) {
        assert!(pair[1] <= pair[0]);
    }
    assert!(state.firsts()[0].quality < 1.0);
    assert_eq!(state.population().len(), 20);
    assert_eq!(state.state().n_of_births(), 20 + 80 * 19);
}

#[test]
fn test_evolutionary_strategy_remaps_elites() {
    let problem = SingleObjectiveProblem::minimizing(sphere);
    let solver = SimpleEvolutionaryStrategy::new(
        |genotype: &Vec<f64>| genotype.clone(),
        FixedLengthListFactory::new(2, UniformDoubleFactory::new(-1.0, 1.0)),
        0.1,
        3,
        2,
        SolverOptions::new(10, 0, true),
        MaxIterations::new(5),
    )
    .unwrap();
    let mut rng = RandomNumberGenerator::from_seed(8);

    let state = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
    // 8 offspring and 2 remapped elites per iteration
    assert_eq!(state.state().n_of_fitness_evaluations(), 10 + 5 * 10);
    assert_eq!(state.state().n_of_births(), 10 + 5 * 8);
}
