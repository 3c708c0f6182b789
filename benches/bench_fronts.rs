use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use evosolve::factory::{Factory, FixedLengthListFactory, UniformDoubleFactory};
use evosolve::order::{non_dominated_sort, Objective, ParetoDominance};
use evosolve::rng::RandomNumberGenerator;
use evosolve::solver::crowding_distances;

fn random_points(n: usize, n_of_objectives: usize) -> Vec<Vec<f64>> {
    let mut rng = RandomNumberGenerator::from_seed(42);
    FixedLengthListFactory::new(n_of_objectives, UniformDoubleFactory::new(0.0, 1.0))
        .build(n, &mut rng)
}

fn bench_non_dominated_sort(c: &mut Criterion) {
    let mut group = c.benchmark_group("non_dominated_sort");

    // Test with different population sizes and objective counts
    for n_of_objectives in [2, 3].iter() {
        let dominance = ParetoDominance::minimizing(*n_of_objectives);
        for size in [50, 200, 800].iter() {
            let points = random_points(*size, *n_of_objectives);
            group.bench_with_input(
                BenchmarkId::new(format!("{}_objectives", n_of_objectives), size),
                &points,
                |b, points| b.iter(|| non_dominated_sort(black_box(points), black_box(&dominance))),
            );
        }
    }

    group.finish();
}

fn bench_crowding_distance(c: &mut Criterion) {
    let mut group = c.benchmark_group("crowding_distance");
    let objectives = [Objective::Minimize, Objective::Minimize, Objective::Minimize];

    for size in [50, 200, 800].iter() {
        let points = random_points(*size, objectives.len());
        group.bench_with_input(BenchmarkId::new("front", size), &points, |b, points| {
            b.iter(|| crowding_distances(black_box(points), black_box(&objectives)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_non_dominated_sort, bench_crowding_distance);
criterion_main!(benches);
