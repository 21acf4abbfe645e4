//! Criterion benchmarks for Pareto archiving and composed streams.
//!
//! Fitness vectors are drawn uniformly from the unit square; a large share
//! of them is mutually non-dominated near the upper-right boundary.

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use u_evostream::compose::{ConcatEngine, CyclicEngine};
use u_evostream::engine::{self, EvolutionEngine, EvolutionResult, EvolutionStart, Limited};
use u_evostream::moea::{pareto, ParetoSet, SizeRange};

fn points(n: usize, seed: u64) -> Vec<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..n)
        .map(|_| vec![rng.random_range(0.0..1.0), rng.random_range(0.0..1.0)])
        .collect()
}

/// Points on the line x + y = 1: every one of them is non-dominated.
fn trade_off(n: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|i| {
            let x = i as f64 / n as f64;
            vec![x, 1.0 - x]
        })
        .collect()
}

fn bench_front(c: &mut Criterion) {
    let mut group = c.benchmark_group("pareto_front");
    for &n in &[100, 1000] {
        let data = points(n, 42);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| pareto::front(black_box(data.clone())))
        });
    }
    group.finish();
}

fn bench_ranks(c: &mut Criterion) {
    let mut group = c.benchmark_group("pareto_ranks");
    group.sample_size(20);
    for &n in &[100, 500] {
        let data = points(n, 7);
        group.bench_with_input(BenchmarkId::from_parameter(n), &data, |b, data| {
            b.iter(|| pareto::ranks(black_box(data)))
        });
    }
    group.finish();
}

fn bench_pareto_set(c: &mut Criterion) {
    let mut group = c.benchmark_group("pareto_set_trim");
    group.sample_size(10);
    for &n in &[200, 400] {
        let population = trade_off(n);
        group.bench_with_input(
            BenchmarkId::from_parameter(n),
            &population,
            |b, population| {
                b.iter(|| {
                    let mut set = ParetoSet::new(SizeRange::default(), |v: &Vec<f64>| v);
                    set.add(&EvolutionResult::new(population.clone(), 1));
                    black_box(set.len())
                })
            },
        );
    }
    group.finish();
}

fn counting(start: EvolutionStart<u64>) -> engine::EvolutionStream<u64> {
    engine::boxed((start.generation..).map(|g| Ok(EvolutionResult::new(vec![g], g))))
}

fn bench_composed_streams(c: &mut Criterion) {
    let mut group = c.benchmark_group("composed_streams");

    let concat = ConcatEngine::new(
        (0..10)
            .map(|_| engine::handle(Limited::generations(engine::from_fn(counting), 100)))
            .collect(),
    );
    group.bench_function("concat_10x100", |b| {
        b.iter(|| concat.stream(EvolutionStart::empty()).count())
    });

    let cyclic = CyclicEngine::empty()
        .with_engine(Limited::generations(engine::from_fn(counting), 3))
        .with_engine(Limited::generations(engine::from_fn(counting), 5));
    group.bench_function("cyclic_take_1000", |b| {
        b.iter(|| cyclic.stream(EvolutionStart::empty()).take(1000).count())
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_front,
    bench_ranks,
    bench_pareto_set,
    bench_composed_streams
);
criterion_main!(benches);
