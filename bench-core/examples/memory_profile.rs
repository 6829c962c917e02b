use std::io;

use xml_bench::discovery::default_triple;
use xml_bench::engine::Engine;
use xml_bench::processors::{copy_events, copy_stream};
use xml_bench::registry::Registry;

#[global_allocator]
static ALLOC: dhat::Alloc = dhat::Alloc;

fn get_test_data() -> Vec<u8> {
    let path = std::env::args().nth(1).unwrap_or_else(|| "mondial.xml".to_owned());
    std::fs::read(&path).expect("Test input not found")
}

// Usage: memory_profile [FILE] [events|stream]
// DHAT works best when profiling one distinct workload per run, so the
// style is picked on the command line. The engine follows the
// XML_BENCH_*_FACTORY variables, defaulting to xml-rs.
fn main() {
    let data = get_test_data();
    let style = std::env::args().nth(2).unwrap_or_else(|| "events".to_owned());

    let mut selection = default_triple();
    for (var, role) in [
        ("XML_BENCH_EVENT_FACTORY", &mut selection.event_factory),
        ("XML_BENCH_INPUT_FACTORY", &mut selection.input_factory),
        ("XML_BENCH_OUTPUT_FACTORY", &mut selection.output_factory),
    ] {
        if let Ok(id) = std::env::var(var) {
            *role = id;
        }
    }
    let engine = Engine::from_selection(&Registry::host(), &selection).expect("unknown engine");

    let _profiler = dhat::Profiler::new_heap();

    let mut source = data.as_slice();
    let count = match style.as_str() {
        "stream" => copy_stream(
            &mut source,
            &mut io::sink(),
            engine.input_factory(),
            engine.output_factory(),
        ),
        _ => copy_events(
            &mut source,
            &mut io::sink(),
            engine.event_factory(),
            engine.input_factory(),
            engine.output_factory(),
        ),
    }
    .expect("processing failed");
    println!("{} {}: {}", selection.input_factory, style, count);
}
