use criterion::{criterion_group, criterion_main, Criterion};
use energy_projection_engine::domain::Scenario;
use energy_projection_engine::projection::{ScenarioProjectionEngine, DEFAULT_CLEAN_BUFFER};
use energy_projection_engine::runner::{self, RunSettings};
use energy_projection_engine::store::{ConfigStore, Horizon};
use std::hint::black_box;

fn bench_projection(c: &mut Criterion) {
    let store = ConfigStore::embedded(Horizon::default()).expect("embedded documents are valid");
    let mut group = c.benchmark_group("projection");

    for scenario in Scenario::all() {
        let label = format!("deployment_{scenario}");
        group.bench_function(&label, |b| {
            b.iter(|| {
                let engine = ScenarioProjectionEngine::new(&store, scenario, DEFAULT_CLEAN_BUFFER);
                let records = engine.project().expect("projection should succeed");
                black_box(records.len());
            })
        });
    }

    let settings = RunSettings::default();
    group.bench_function("full_grid", |b| {
        b.iter(|| {
            let output = runner::run(&store, &settings).expect("run should succeed");
            black_box(output.scenarios.len());
        })
    });

    group.finish();
}

criterion_group!(benches, bench_projection);
criterion_main!(benches);
