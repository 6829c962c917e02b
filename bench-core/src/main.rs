use std::io::{self, Write};

use xml_bench::config::Options;
use xml_bench::discovery::discover_triples;
use xml_bench::driver::Benchmark;
use xml_bench::registry::Registry;
use xml_bench::report;
use xml_bench::{diagnostic, Result};

fn main() {
    if std::env::var_os("RUST_LOG").is_none() {
        pretty_env_logger::formatted_builder()
            .filter_level(log::LevelFilter::Error)
            .init();
    } else {
        pretty_env_logger::init();
    }

    if let Err(err) = run(Options::from_env_and_command_line()) {
        log::error!("{}", diagnostic(&err));
        std::process::exit(1);
    }
}

fn run(options: Options) -> Result<()> {
    log::debug!("{:?}", options);

    let registry = Registry::host();
    let stdout = io::stdout();
    let mut reporter = report::reporter(options.format, stdout.lock());

    let triples = match options.selection {
        Some(selection) => vec![selection],
        None => discover_triples(&registry)?,
    };

    if options.list_engines {
        reporter.engines(&triples)?;
        return Ok(());
    }

    let benchmark = Benchmark::new(options.input, options.trials);
    benchmark.report_input_size(reporter.as_mut())?;
    benchmark.run(&registry, &triples, reporter.as_mut())?;

    drop(reporter);
    io::stdout().flush()?;
    Ok(())
}
