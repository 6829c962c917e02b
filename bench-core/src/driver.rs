//! Runs the trials for every engine and hands the results to a reporter.

use std::path::PathBuf;
use std::time::Instant;

use crate::discovery::EngineTriple;
use crate::engine::Engine;
use crate::errors::{diagnostic, BenchError, Result};
use crate::processors;
use crate::registry::Registry;
use crate::report::Reporter;
use crate::stats::{DurationSeries, Summary};

pub const DEFAULT_TRIALS: usize = 100;

#[derive(Debug, Clone)]
pub struct Benchmark {
    input: PathBuf,
    trials: usize,
}

impl Benchmark {
    pub fn new(input: impl Into<PathBuf>, trials: usize) -> Self {
        Self {
            input: input.into(),
            trials,
        }
    }

    /// Reports the input size. A missing or unreadable input is logged and
    /// the run goes on.
    pub fn report_input_size(&self, reporter: &mut dyn Reporter) -> Result<()> {
        match std::fs::metadata(&self.input) {
            Ok(metadata) => reporter.input_size(metadata.len()),
            Err(source) => {
                let err = BenchError::Input {
                    path: self.input.display().to_string(),
                    source,
                };
                log::error!("{}", diagnostic(&err));
                Ok(())
            }
        }
    }

    /// Runs every trial of one engine. The first failing trial aborts the
    /// remaining ones.
    pub fn run_engine(&self, engine: &Engine) -> Result<(DurationSeries, DurationSeries)> {
        let mut events = DurationSeries::with_capacity(self.trials);
        let mut streams = DurationSeries::with_capacity(self.trials);

        for trial in 0..self.trials {
            let start = Instant::now();
            let forwarded = processors::process_as_events(
                &self.input,
                engine.event_factory(),
                engine.input_factory(),
                engine.output_factory(),
            )?;
            events.push(start.elapsed());

            let start = Instant::now();
            let visited = processors::process_as_stream(
                &self.input,
                engine.event_factory(),
                engine.input_factory(),
                engine.output_factory(),
            )?;
            streams.push(start.elapsed());

            log::trace!(
                "trial {}: {} events forwarded, {} tokens visited",
                trial,
                forwarded,
                visited
            );
        }

        Ok((events, streams))
    }

    /// Benchmarks each triple in turn. Engine failures are logged and
    /// reported; only reporter errors end the run.
    pub fn run(
        &self,
        registry: &Registry,
        triples: &[EngineTriple],
        reporter: &mut dyn Reporter,
    ) -> Result<()> {
        for triple in triples {
            log::info!("benchmarking {}", triple);
            reporter.engine_started(triple)?;
            let outcome = Engine::from_selection(registry, triple)
                .map_err(BenchError::from)
                .and_then(|engine| self.run_engine(&engine));

            match outcome {
                Ok((events, streams)) => {
                    match (Summary::from_series(&events), Summary::from_series(&streams)) {
                        (Some(events), Some(streams)) => {
                            reporter.engine(triple, &events, &streams)?
                        }
                        _ => log::warn!("no trials were run for {}", triple),
                    }
                }
                Err(err) => {
                    log::error!("{} failed: {}", triple.event_factory, diagnostic(&err));
                    reporter.engine_failed(triple, &err)?;
                }
            }
        }
        Ok(())
    }
}
