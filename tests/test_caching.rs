use evosolve::caching::{CacheKey, CacheType, CachingProblem};
use evosolve::executor::{ParallelExecutor, SequentialExecutor};
use evosolve::factory::BitStringFactory;
use evosolve::operator::{BitFlipMutation, MutationOperator};
use evosolve::order::{Objective, PartialComparator, PartialOrdering};
use evosolve::problem::QualityBasedProblem;
use evosolve::rng::RandomNumberGenerator;
use evosolve::selection::Tournament;
use evosolve::solver::{
    IterativeSolver, MaxIterations, RandomSearch, SolverOptions, SolverState, StandardEvolver,
};
use evosolve::Result;
use std::sync::{
    atomic::{AtomicUsize, Ordering},
    Arc,
};

// A solution wrapping a short bit string, so that equal solutions recur often
#[derive(Clone, Debug, PartialEq)]
struct Bits(Vec<bool>);

impl CacheKey for Bits {
    type Key = Vec<bool>;

    fn cache_key(&self) -> Self::Key {
        self.0.clone()
    }
}

fn to_bits(genotype: &Vec<bool>) -> Bits {
    Bits(genotype.clone())
}

// Define a problem that tracks the number of evaluations
#[derive(Clone)]
struct CostlyProblem {
    // Use Arc<AtomicUsize> to track evaluations across clones
    evaluations: Arc<AtomicUsize>,
}

impl CostlyProblem {
    fn new() -> Self {
        Self {
            evaluations: Arc::new(AtomicUsize::new(0)),
        }
    }

    fn get_evaluations(&self) -> usize {
        self.evaluations.load(Ordering::SeqCst)
    }
}

impl QualityBasedProblem<Bits, f64> for CostlyProblem {
    fn quality(&self, solution: &Bits) -> Result<f64> {
        self.evaluations.fetch_add(1, Ordering::SeqCst);

        // Simulate an expensive computation
        std::thread::sleep(std::time::Duration::from_millis(1));

        Ok(solution.0.iter().filter(|&&bit| bit).count() as f64)
    }

    fn compare(&self, a: &f64, b: &f64) -> PartialOrdering {
        Objective::Maximize.compare(a, b)
    }
}

type Evolver = StandardEvolver<Vec<bool>, Bits, f64, BitStringFactory, fn(&Vec<bool>) -> Bits>;

fn evolver(iterations: u64) -> Evolver {
    StandardEvolver::builder()
        .with_solution_mapper(to_bits as fn(&Vec<bool>) -> Bits)
        .with_genotype_factory(BitStringFactory::new(4))
        .with_operator(MutationOperator::new(BitFlipMutation::new(0.25).unwrap()), 1.0)
        .with_parent_selector(Tournament::new(2).unwrap())
        .with_options(SolverOptions::new(10, 0, false))
        .with_stop_condition(MaxIterations::new(iterations))
        .build()
        .unwrap()
}

#[test]
fn test_direct_caching() {
    let problem = CostlyProblem::new();
    let cached = problem.with_global_cache();

    let solution = Bits(vec![true, false, true]);
    assert_eq!(cached.quality(&solution).unwrap(), 2.0);
    assert_eq!(problem.get_evaluations(), 1);

    // Second evaluation should use the cache
    assert_eq!(cached.quality(&solution).unwrap(), 2.0);
    assert_eq!(problem.get_evaluations(), 1);

    assert_eq!(cached.quality(&Bits(vec![true])).unwrap(), 1.0);
    assert_eq!(problem.get_evaluations(), 2);
    assert_eq!(cached.cache_size(), 2);
}

#[test]
fn test_thread_local_caching() {
    let problem = CostlyProblem::new();
    let cached = problem.with_thread_local_cache();
    let solution = Bits(vec![true, true]);

    assert_eq!(cached.quality(&solution).unwrap(), 2.0);
    assert_eq!(cached.quality(&solution).unwrap(), 2.0);
    assert_eq!(problem.get_evaluations(), 1);

    let thread_cached = cached.clone();
    let thread_solution = solution.clone();
    let handle = std::thread::spawn(move || {
        assert_eq!(thread_cached.quality(&thread_solution).unwrap(), 2.0);
    });
    handle.join().unwrap();

    // The other thread has its own cache
    assert_eq!(problem.get_evaluations(), 2);
}

#[test]
fn test_global_cache_in_a_run() {
    let problem = CostlyProblem::new();
    let cached = problem.with_global_cache();
    let solver = evolver(5);
    let mut rng = RandomNumberGenerator::from_seed(12);

    let state = solver.solve(&cached, &mut rng, &SequentialExecutor).unwrap();
    let requested = state.state().n_of_fitness_evaluations() as usize;
    assert_eq!(requested, 60);

    // only 16 distinct 4-bit strings exist
    assert!(problem.get_evaluations() <= 16);
    assert_eq!(problem.get_evaluations(), cached.cache_size());
}

#[test]
fn test_caches_with_a_thread_pool() {
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(4)
        .build()
        .unwrap();
    let executor = ParallelExecutor::new(&pool);

    for cache_type in [CacheType::Global, CacheType::ThreadLocal] {
        let problem = CostlyProblem::new();
        let cached: Box<dyn QualityBasedProblem<Bits, f64>> = problem.with_cache(cache_type);
        let solver = evolver(20);
        let mut rng = RandomNumberGenerator::from_seed(12);

        let state = solver.solve(&cached, &mut rng, &executor).unwrap();
        let requested = state.state().n_of_fitness_evaluations() as usize;
        assert_eq!(requested, 210);
        // at most one miss per distinct string and thread
        assert!(problem.get_evaluations() <= 16 * 4);
        assert_eq!(state.population().len(), 10);
    }
}

#[test]
fn test_cached_problem_gives_the_same_run() {
    let problem = CostlyProblem::new();
    let solver = RandomSearch::new(
        to_bits,
        BitStringFactory::new(6),
        MaxIterations::new(40),
    )
    .unwrap();

    let mut rng = RandomNumberGenerator::from_seed(3);
    let plain = solver.solve(&problem, &mut rng, &SequentialExecutor).unwrap();
    let mut rng = RandomNumberGenerator::from_seed(3);
    let cached = solver
        .solve(&problem.with_global_cache(), &mut rng, &SequentialExecutor)
        .unwrap();

    assert_eq!(plain.firsts()[0].solution, cached.firsts()[0].solution);
    assert_eq!(plain.firsts()[0].quality, cached.firsts()[0].quality);
}

#[test]
fn test_cache_sharing() {
    let problem = CostlyProblem::new();

    // Each with_global_cache call creates a separate cache...
    let first = problem.with_global_cache();
    let second = problem.with_global_cache();
    let solution = Bits(vec![false, true]);

    first.quality(&solution).unwrap();
    second.quality(&solution).unwrap();
    assert_eq!(problem.get_evaluations(), 2);

    // ...while clones of a cached problem share theirs
    let shared = first.clone();
    shared.quality(&solution).unwrap();
    assert_eq!(problem.get_evaluations(), 2);
    assert_eq!(first.cache_size(), 1);
}
