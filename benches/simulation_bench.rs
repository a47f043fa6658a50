use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};

use genesis::core::config::SimulationConfig;
use genesis::simulation::Simulation;

fn full_run(c: &mut Criterion) {
    c.bench_function("adam_eve_capped_run", |b| {
        b.iter(|| {
            let config = SimulationConfig {
                seed: black_box(42),
                max_population: 1000,
                ..SimulationConfig::default()
            };
            let mut sim = Simulation::new(config).expect("default config is valid");
            black_box(sim.run())
        })
    });
}

fn single_tick(c: &mut Criterion) {
    c.bench_function("tick_after_warmup", |b| {
        let config = SimulationConfig {
            max_population: 1000,
            ..SimulationConfig::default()
        };
        let mut warm = Simulation::new(config).expect("default config is valid");
        for _ in 0..200 {
            if warm.is_finished() {
                break;
            }
            warm.tick();
        }
        // Every iteration steps the same warmed-up population
        b.iter_batched(
            || warm.clone(),
            |mut sim| black_box(sim.tick()),
            BatchSize::LargeInput,
        )
    });
}

criterion_group!(benches, full_run, single_tick);
criterion_main!(benches);
