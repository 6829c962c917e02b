//! Compares event-style and cursor-style XML processing across the XML
//! engines compiled into the crate.
//!
//! ```no_run
//! use xml_bench::{discovery, driver::Benchmark, registry::Registry, report::TextReporter};
//!
//! let registry = Registry::host();
//! let triples = discovery::discover_triples(&registry)?;
//! let mut reporter = TextReporter::new(std::io::stdout());
//! Benchmark::new("mondial.xml", 100).run(&registry, &triples, &mut reporter)?;
//! # Ok::<(), xml_bench::BenchError>(())
//! ```

pub mod config;
pub mod discovery;
pub mod driver;
pub mod engine;
pub mod engines;
mod errors;
pub mod events;
pub mod factory;
pub mod processors;
pub mod registry;
pub mod report;
pub mod stats;

pub use errors::*;
pub use events::*;
pub use factory::*;
