use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use bsmvol::core::OptionContract;
use bsmvol::mc::{McConfig, simulate_with};
use std::hint::black_box;

// Monte Carlo performance benchmarks
// Goals:
// - cost linear in paths x steps
// - antithetic and control-variate runs within 10% of plain sampling

fn contract() -> OptionContract {
    OptionContract::new(100.0, 105.0, 1.0, 0.05)
}

fn bench_mc_paths(c: &mut Criterion) {
    let contract = contract();
    let mut group = c.benchmark_group("mc_paths");

    for paths in [10_000, 50_000, 100_000].iter() {
        let config = McConfig::new(50, *paths, 42);
        group.bench_with_input(BenchmarkId::from_parameter(paths), paths, |b, _| {
            b.iter(|| {
                let est = simulate_with(black_box(&contract), black_box(0.2), &config)
                    .expect("simulation should succeed");
                black_box(est.price)
            })
        });
    }

    group.finish();
}

fn bench_mc_timesteps(c: &mut Criterion) {
    let contract = contract();
    let mut group = c.benchmark_group("mc_timesteps");

    for steps in [1, 10, 50, 252].iter() {
        let config = McConfig::new(*steps, 20_000, 42);
        group.bench_with_input(BenchmarkId::from_parameter(steps), steps, |b, _| {
            b.iter(|| {
                let est = simulate_with(black_box(&contract), black_box(0.2), &config)
                    .expect("simulation should succeed");
                black_box(est.price)
            })
        });
    }

    group.finish();
}

fn bench_mc_variance_reduction(c: &mut Criterion) {
    let contract = contract();
    let base = McConfig::new(50, 50_000, 42);
    let mut group = c.benchmark_group("mc_variance_reduction");

    for (name, config) in [
        ("plain", base),
        ("antithetic", base.with_antithetic(true)),
        ("moment_matching", base.with_moment_matching(true)),
        ("control_variate", base.with_control_variate(true)),
    ] {
        group.bench_function(name, |b| {
            b.iter(|| {
                let est = simulate_with(black_box(&contract), black_box(0.2), &config)
                    .expect("simulation should succeed");
                black_box(est.price)
            })
        });
    }

    group.finish();
}

criterion_group!(
    mc_benches,
    bench_mc_paths,
    bench_mc_timesteps,
    bench_mc_variance_reduction
);
criterion_main!(mc_benches);
