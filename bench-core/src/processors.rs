//! The two measured workloads: re-emitting a document event by event, and
//! rewriting it through a cursor.

use std::fs::File;
use std::hint::black_box;
use std::io::{self, BufRead, BufReader, Write};
use std::path::Path;

use crate::errors::{BenchError, Result, XmlError};
use crate::events::EventKind;
use crate::factory::{EventFactory, InputFactory, OutputFactory, XmlResult};

/// Text written by the cursor processor in place of every character token.
pub const PLACEHOLDER: &str = "a";

fn open(path: &Path) -> Result<BufReader<File>> {
    let file = File::open(path).map_err(|source| BenchError::Input {
        path: path.display().to_string(),
        source,
    })?;
    Ok(BufReader::new(file))
}

/// Reads `path` as events and forwards every event to a discarding writer.
pub fn process_as_events(
    path: &Path,
    events: &dyn EventFactory,
    input: &dyn InputFactory,
    output: &dyn OutputFactory,
) -> Result<usize> {
    let mut source = open(path)?;
    let mut sink = io::sink();
    Ok(copy_events(&mut source, &mut sink, events, input, output)?)
}

/// Reads `path` through a cursor and writes a skeleton of it to a
/// discarding writer.
pub fn process_as_stream(
    path: &Path,
    _events: &dyn EventFactory,
    input: &dyn InputFactory,
    output: &dyn OutputFactory,
) -> Result<usize> {
    let mut source = open(path)?;
    let mut sink = io::sink();
    Ok(copy_stream(&mut source, &mut sink, input, output)?)
}

/// Forwards every event of `source` unchanged to `sink`. Returns the number
/// of events forwarded.
pub fn copy_events(
    source: &mut dyn BufRead,
    sink: &mut dyn Write,
    events: &dyn EventFactory,
    input: &dyn InputFactory,
    output: &dyn OutputFactory,
) -> XmlResult<usize> {
    let reader = input.create_event_reader(source, events);
    let mut writer = output.create_event_writer(sink);
    let mut count = 0;

    for event in reader {
        let event = event?;
        if let Some(start) = event.as_start_element() {
            black_box(start.name.local_name.as_str());
        } else if let Some(characters) = event.as_characters() {
            black_box(characters.data.as_str());
        }
        writer.add(&event)?;
        count += 1;
    }

    writer.flush()?;
    Ok(count)
}

/// Rewrites `source` into `sink` keeping element structure only: names lose
/// their prefixes, attributes and namespaces are dropped and every
/// character token becomes [`PLACEHOLDER`]. Returns the number of tokens
/// visited.
pub fn copy_stream(
    source: &mut dyn BufRead,
    sink: &mut dyn Write,
    input: &dyn InputFactory,
    output: &dyn OutputFactory,
) -> XmlResult<usize> {
    let mut reader = input.create_stream_reader(source);
    let mut writer = output.create_stream_writer(sink);
    let mut count = 0;

    while reader.has_next() {
        let kind = reader.next()?;
        count += 1;
        match kind {
            EventKind::StartDocument => writer.write_start_document()?,
            EventKind::EndDocument => writer.write_end_document()?,
            EventKind::StartElement => {
                let name = reader.local_name().ok_or(XmlError::MissingLocalName)?;
                writer.write_start_element(name)?;
            }
            EventKind::EndElement => writer.write_end_element()?,
            EventKind::Characters => writer.write_characters(PLACEHOLDER)?,
            _ => {}
        }
    }

    Ok(count)
}
