//! # Statehouse Store Benchmarks
//!
//! | Operation | Cost driver |
//! |-----------|-------------|
//! | commit | handler lookup, copy-on-write state, subscriber fan-out |
//! | getter read | memoized until the next commit |
//! | register/unregister | full registry rebuild |

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use serde_json::{json, Value};
use statehouse_core::{Mutation, RawModule, Store, StoreConfig, StoreOptions};
use statehouse_reactive::{ImmediateScheduler, Runtime};
use std::sync::Arc;

fn counter_store(modules: usize) -> Store {
    let mut root = RawModule::new()
        .state(json!({ "count": 0 }))
        .mutation("increment", |state, _| {
            state["count"] = json!(state["count"].as_i64().unwrap_or(0) + 1)
        })
        .getter("doubled", |ctx| json!(ctx.state["count"].as_i64().unwrap_or(0) * 2));
    for i in 0..modules {
        root = root.module(
            format!("m{}", i),
            RawModule::new()
                .namespaced(true)
                .state(json!({ "n": i }))
                .getter("n", |ctx| ctx.state["n"].clone()),
        );
    }
    Store::with_options(
        StoreOptions::new(root)
            .config(StoreConfig::default())
            .engine(Arc::new(Runtime::new(ImmediateScheduler))),
    )
}

fn bench_commit(c: &mut Criterion) {
    let mut group = c.benchmark_group("commit");

    for modules in [0, 10, 100] {
        let store = counter_store(modules);
        group.throughput(Throughput::Elements(1));
        group.bench_with_input(BenchmarkId::new("increment", modules), &store, |b, store| {
            b.iter(|| store.commit(black_box("increment")))
        });
    }

    let store = counter_store(0);
    let mut unsubscribes = Vec::new();
    for _ in 0..16 {
        unsubscribes.push(store.subscribe(Arc::new(|m: &Mutation, _: &Value| {
            black_box(&m.kind);
        })));
    }
    group.bench_function("increment_16_subscribers", |b| {
        b.iter(|| store.commit(black_box("increment")))
    });
    group.finish();
}

fn bench_getters(c: &mut Criterion) {
    let store = counter_store(10);
    c.bench_function("getter_memoized", |b| {
        b.iter(|| black_box(store.getter("doubled")))
    });
}

fn bench_registration(c: &mut Criterion) {
    let store = counter_store(10);
    c.bench_function("register_unregister", |b| {
        b.iter(|| {
            store.register_module("dyn", RawModule::new().namespaced(true).state(json!({})));
            store.unregister_module("dyn");
        })
    });
}

criterion_group!(benches, bench_commit, bench_getters, bench_registration);
criterion_main!(benches);
