//! Report output: plain text or JSON lines.

use std::io::Write;

use serde::Serialize;

use crate::discovery::EngineTriple;
use crate::errors::{diagnostic, Result};
use crate::stats::Summary;

pub const SEPARATOR: &str = "##############################";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Format {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "text" => Ok(Format::Text),
            "json" => Ok(Format::Json),
            other => Err(format!("unknown format `{}`, expected `text` or `json`", other)),
        }
    }
}

pub trait Reporter {
    fn input_size(&mut self, bytes: u64) -> Result<()>;

    /// Called before the first trial of an engine.
    fn engine_started(&mut self, triple: &EngineTriple) -> Result<()>;

    fn engine(&mut self, triple: &EngineTriple, events: &Summary, streams: &Summary)
        -> Result<()>;

    fn engine_failed(
        &mut self,
        triple: &EngineTriple,
        error: &(dyn std::error::Error + 'static),
    ) -> Result<()>;

    fn engines(&mut self, triples: &[EngineTriple]) -> Result<()>;
}

pub fn reporter<'a, W: Write + 'a>(format: Format, out: W) -> Box<dyn Reporter + 'a> {
    match format {
        Format::Text => Box::new(TextReporter::new(out)),
        Format::Json => Box::new(JsonReporter::new(out)),
    }
}

pub struct TextReporter<W> {
    out: W,
}

impl<W: Write> TextReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn banner(&mut self) -> Result<()> {
        writeln!(self.out)?;
        writeln!(self.out, "{}", SEPARATOR)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Reporter for TextReporter<W> {
    fn input_size(&mut self, bytes: u64) -> Result<()> {
        writeln!(self.out, "size={}", bytes)?;
        Ok(())
    }

    fn engine_started(&mut self, triple: &EngineTriple) -> Result<()> {
        writeln!(self.out, "{}", triple.event_factory)?;
        self.out.flush()?;
        Ok(())
    }

    fn engine(
        &mut self,
        _triple: &EngineTriple,
        events: &Summary,
        streams: &Summary,
    ) -> Result<()> {
        writeln!(self.out, "{}", events.line("Events"))?;
        writeln!(self.out, "{}", streams.line("Streams"))?;
        self.banner()
    }

    // The failure itself goes to the log.
    fn engine_failed(
        &mut self,
        _triple: &EngineTriple,
        _error: &(dyn std::error::Error + 'static),
    ) -> Result<()> {
        self.banner()
    }

    fn engines(&mut self, triples: &[EngineTriple]) -> Result<()> {
        for triple in triples {
            writeln!(self.out, "{}", triple)?;
        }
        Ok(())
    }
}

#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    InputSize {
        bytes: u64,
    },
    Engine {
        #[serde(flatten)]
        triple: &'a EngineTriple,
        events: &'a Summary,
        streams: &'a Summary,
    },
    EngineFailed {
        #[serde(flatten)]
        triple: &'a EngineTriple,
        error: String,
    },
    Discovered {
        #[serde(flatten)]
        triple: &'a EngineTriple,
    },
}

/// One JSON object per line.
pub struct JsonReporter<W> {
    out: W,
}

impl<W: Write> JsonReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn emit(&mut self, record: &Record<'_>) -> Result<()> {
        serde_json::to_writer(&mut self.out, record)?;
        writeln!(self.out)?;
        Ok(())
    }
}

impl<W: Write> Reporter for JsonReporter<W> {
    fn input_size(&mut self, bytes: u64) -> Result<()> {
        self.emit(&Record::InputSize { bytes })
    }

    // Each engine record already names its triple.
    fn engine_started(&mut self, _triple: &EngineTriple) -> Result<()> {
        Ok(())
    }

    fn engine(
        &mut self,
        triple: &EngineTriple,
        events: &Summary,
        streams: &Summary,
    ) -> Result<()> {
        self.emit(&Record::Engine {
            triple,
            events,
            streams,
        })
    }

    fn engine_failed(
        &mut self,
        triple: &EngineTriple,
        error: &(dyn std::error::Error + 'static),
    ) -> Result<()> {
        self.emit(&Record::EngineFailed {
            triple,
            error: diagnostic(error),
        })
    }

    fn engines(&mut self, triples: &[EngineTriple]) -> Result<()> {
        for triple in triples {
            self.emit(&Record::Discovered { triple })?;
        }
        Ok(())
    }
}
