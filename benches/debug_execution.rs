use criterion::{black_box, criterion_group, criterion_main, Criterion};
use handler_debugger::routing::ParameterSpec;
use handler_debugger::runtime::binder;
use handler_debugger::sample::{sample_routes, Item};
use handler_debugger::tracer::value;
use handler_debugger::DebugOrchestrator;
use serde_json::{json, Map, Value};
use std::sync::Arc;

fn bench_value_snapshot(c: &mut Criterion) {
    let nested = json!({
        "items": [{ "name": "Foo", "price": 50.2 }, { "name": "Bar", "price": 62.0 }],
        "count": 2
    });

    c.bench_function("value_snapshot_structural", |b| {
        b.iter(|| {
            let encoded = value::serialize(black_box(&nested));
            black_box(encoded);
        })
    });

    c.bench_function("value_snapshot_debug_fallback", |b| {
        b.iter(|| {
            let encoded = value::serialize(black_box(&f64::NAN));
            black_box(encoded);
        })
    });
}

fn bench_bind_model(c: &mut Criterion) {
    let specs = [ParameterSpec::model::<Item>("item")];
    let payload: Map<String, Value> = [
        ("name".to_string(), json!("Foo")),
        ("price".to_string(), json!(50.2)),
    ]
    .into_iter()
    .collect();

    c.bench_function("bind_model_payload", |b| {
        b.iter(|| {
            let bound = binder::bind(black_box(&specs), black_box(&payload)).unwrap();
            black_box(bound);
        })
    });
}

fn bench_debug_invocation(c: &mut Criterion) {
    let orchestrator = DebugOrchestrator::new(Arc::new(sample_routes()));
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();

    c.bench_function("debug_traced_read_item", |b| {
        b.iter(|| {
            let outcome =
                runtime.block_on(orchestrator.debug(black_box("/items/1"), "GET", Map::new()));
            black_box(outcome);
        })
    });
}

criterion_group!(
    benches,
    bench_value_snapshot,
    bench_bind_model,
    bench_debug_invocation
);
criterion_main!(benches);
