use criterion::{black_box, criterion_group, criterion_main, Criterion};

use matching_engine::{MatchingEngine, NoopStorage, Side};

fn setup_engine() -> MatchingEngine {
    MatchingEngine::new(Box::new(NoopStorage))
}

fn bench_mixed_workload(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();
    let mut engine = setup_engine();
    let mut group = c.benchmark_group("mixed_workload");

    group.bench_function("realistic_mixed_operations", |b| {
        b.iter(|| {
            rt.block_on(async {
                // 60% new resting orders
                let mut ids = Vec::new();
                for i in 0..6 {
                    let outcome = engine
                        .place(Side::Buy, 100 - i, 1)
                        .await
                        .unwrap();
                    ids.push(outcome.order_id);
                }

                // 20% cancellations of what was just rested
                for id in ids.into_iter().take(2) {
                    black_box(engine.cancel(id).await.unwrap());
                }

                // 20% crossing orders
                for _ in 0..2 {
                    black_box(engine.place(Side::Sell, 95, 1).await.unwrap());
                }
            })
        });
    });

    group.finish();
}

fn bench_deep_sweep(c: &mut Criterion) {
    let rt = tokio::runtime::Runtime::new().unwrap();

    c.bench_function("sweep_100_levels", |b| {
        b.iter_batched(
            || {
                let mut engine = setup_engine();
                rt.block_on(async {
                    for price in 1..=100 {
                        engine.place(Side::Sell, price, 1).await.unwrap();
                    }
                });
                engine
            },
            |mut engine| {
                rt.block_on(async {
                    black_box(engine.place(Side::Buy, 100, 100).await.unwrap());
                });
            },
            criterion::BatchSize::SmallInput,
        );
    });
}

criterion_group!(benches, bench_mixed_workload, bench_deep_sweep);
criterion_main!(benches);
