//! Criterion micro-benchmarks for the episode step and reset loops.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use quarry_env::{EnvConfig, PursuitEnv, TerrainMode};
use quarry_test_utils::MockSim;

fn bench_step_flat(c: &mut Criterion) {
    let mut env =
        PursuitEnv::new(MockSim::pursuit(), MockSim::pursuit(), EnvConfig::default()).unwrap();
    env.reset().unwrap();
    let action = vec![0.0; 35];
    c.bench_function("step_flat", |b| {
        b.iter(|| {
            let out = env.step(black_box(&action)).unwrap();
            black_box(out.reward)
        })
    });
}

fn bench_step_random_terrain(c: &mut Criterion) {
    let mut config = EnvConfig::default();
    config.terrain = TerrainMode::Random;
    let mut env = PursuitEnv::new(MockSim::pursuit(), MockSim::pursuit(), config).unwrap();
    env.reset().unwrap();
    let action = vec![0.0; 35];
    c.bench_function("step_random_terrain", |b| {
        b.iter(|| {
            let out = env.step(black_box(&action)).unwrap();
            black_box(out.obs.len())
        })
    });
}

fn bench_reset_random_terrain(c: &mut Criterion) {
    let mut config = EnvConfig::default();
    config.terrain = TerrainMode::Random;
    let mut env = PursuitEnv::new(MockSim::pursuit(), MockSim::pursuit(), config).unwrap();
    c.bench_function("reset_random_terrain", |b| {
        b.iter(|| black_box(env.reset().unwrap().len()))
    });
}

criterion_group!(
    benches,
    bench_step_flat,
    bench_step_random_terrain,
    bench_reset_random_terrain
);
criterion_main!(benches);
