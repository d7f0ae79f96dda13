use canopy_store::module::{ActionFuture, ModuleDef};
use canopy_store::store::Store;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use futures_util::FutureExt;
use serde_json::{json, Value};
use tokio::runtime::Runtime;

const BATCH_SIZES: &[usize] = &[64, 256, 1024];

fn counter_store() -> Store {
    Store::new(
        ModuleDef::new()
            .with_state(json!({"count": 0}))
            .with_mutation("inc", |state: &mut Value, _: &[Value]| {
                state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1);
                Ok(())
            })
            .with_action("inc_async", |store: Store, _: Vec<Value>| -> ActionFuture {
                async move {
                    store.commit("inc", &[])?;
                    Ok(())
                }
                .boxed()
            }),
    )
    .expect("store")
}

fn commit_throughput(c: &mut Criterion) {
    let mut group = c.benchmark_group("store_commit");

    for &batch in BATCH_SIZES {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &size| {
            b.iter(|| {
                let store = counter_store();
                for _ in 0..size {
                    store.commit("inc", &[]).expect("commit");
                }
            });
        });
    }

    group.finish();
}

fn dispatch_throughput(c: &mut Criterion) {
    let runtime = Runtime::new().expect("runtime");
    let mut group = c.benchmark_group("store_dispatch");

    for &batch in BATCH_SIZES {
        group.throughput(Throughput::Elements(batch as u64));
        group.bench_with_input(BenchmarkId::from_parameter(batch), &batch, |b, &size| {
            b.to_async(&runtime).iter(|| async {
                let store = counter_store();
                for _ in 0..size {
                    store
                        .dispatch("inc_async", vec![])
                        .expect("dispatch")
                        .join()
                        .await
                        .expect("join");
                }
            });
        });
    }

    group.finish();
}

criterion_group!(benches, commit_throughput, dispatch_throughput);
criterion_main!(benches);
