use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::io;

use xml_bench::discovery::discover_triples;
use xml_bench::engine::Engine;
use xml_bench::processors::{copy_events, copy_stream};
use xml_bench::registry::Registry;

use setup::MONDIAL_XML;

fn bench_engines(c: &mut Criterion) {
    let xml_data = &*MONDIAL_XML;
    let registry = Registry::host();
    let triples = discover_triples(&registry).expect("engine roles are paired");

    let mut group = c.benchmark_group("Mondial Processing");
    group.throughput(Throughput::Bytes(xml_data.len() as u64));
    group.sample_size(20);
    group.measurement_time(std::time::Duration::from_secs(10));

    for triple in &triples {
        let engine = Engine::from_selection(&registry, triple).expect("discovered engine");
        let name = registry
            .input_factory(&triple.input_factory)
            .map(|r| r.engine.clone())
            .unwrap_or_else(|| triple.input_factory.clone());

        group.bench_with_input(BenchmarkId::new("events", &name), &engine, |b, engine| {
            b.iter(|| {
                let mut source = xml_data.as_slice();
                copy_events(
                    &mut source,
                    &mut io::sink(),
                    engine.event_factory(),
                    engine.input_factory(),
                    engine.output_factory(),
                )
                .unwrap()
            })
        });

        group.bench_with_input(BenchmarkId::new("stream", &name), &engine, |b, engine| {
            b.iter(|| {
                let mut source = xml_data.as_slice();
                copy_stream(
                    &mut source,
                    &mut io::sink(),
                    engine.input_factory(),
                    engine.output_factory(),
                )
                .unwrap()
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_engines);
criterion_main!(benches);
