//! The three roles an XML engine fills.
//!
//! An engine ships one implementation of each role: an [`EventFactory`]
//! that builds event values, an [`InputFactory`] that opens event and cursor
//! readers, and an [`OutputFactory`] that opens event and cursor writers.

use crate::errors::XmlError;
use crate::events::*;
use std::io::{BufRead, Write};

pub type XmlResult<T> = std::result::Result<T, XmlError>;

/// Lazy, finite, non-restartable sequence of parse events.
///
/// Readers stop yielding after the first error.
pub type EventStream<'a> = Box<dyn Iterator<Item = XmlResult<XmlEvent>> + 'a>;

pub trait EventFactory {
    fn start_document(
        &self,
        version: Option<String>,
        encoding: Option<String>,
        standalone: Option<bool>,
    ) -> XmlEvent {
        XmlEvent::StartDocument(StartDocument {
            version,
            encoding,
            standalone,
        })
    }

    fn end_document(&self) -> XmlEvent {
        XmlEvent::EndDocument
    }

    fn start_element(
        &self,
        name: QName,
        attributes: Vec<Attribute>,
        namespaces: Vec<Namespace>,
    ) -> XmlEvent {
        XmlEvent::StartElement(StartElement {
            name,
            attributes,
            namespaces,
        })
    }

    fn end_element(&self, name: QName) -> XmlEvent {
        XmlEvent::EndElement(name)
    }

    fn characters(&self, data: String, kind: CharactersKind) -> XmlEvent {
        XmlEvent::Characters(Characters { data, kind })
    }

    fn comment(&self, text: String) -> XmlEvent {
        XmlEvent::Comment(text)
    }

    fn processing_instruction(&self, target: String, data: Option<String>) -> XmlEvent {
        XmlEvent::ProcessingInstruction(ProcessingInstruction { target, data })
    }

    fn dtd(&self, text: String) -> XmlEvent {
        XmlEvent::Dtd(text)
    }
}

pub trait InputFactory {
    /// Opens an event reader. Every event is built through `events`.
    fn create_event_reader<'a>(
        &self,
        source: &'a mut dyn BufRead,
        events: &'a dyn EventFactory,
    ) -> EventStream<'a>;

    fn create_stream_reader<'a>(
        &self,
        source: &'a mut dyn BufRead,
    ) -> Box<dyn XmlStreamReader + 'a>;
}

pub trait OutputFactory {
    fn create_event_writer<'a>(&self, sink: &'a mut dyn Write) -> Box<dyn XmlEventWriter + 'a>;

    fn create_stream_writer<'a>(&self, sink: &'a mut dyn Write)
        -> Box<dyn XmlStreamWriter + 'a>;
}

/// Writes whole events.
pub trait XmlEventWriter {
    fn add(&mut self, event: &XmlEvent) -> XmlResult<()>;

    fn flush(&mut self) -> XmlResult<()>;
}

/// Pull cursor over a document.
///
/// A new cursor is positioned on the document start: [`kind`](Self::kind)
/// returns [`EventKind::StartDocument`] and the first [`next`](Self::next)
/// lands on the token after it. [`has_next`](Self::has_next) turns false
/// once [`EventKind::EndDocument`] has been reached.
pub trait XmlStreamReader {
    fn has_next(&self) -> bool;

    fn next(&mut self) -> XmlResult<EventKind>;

    fn kind(&self) -> Option<EventKind>;

    /// Local name of the current start or end element.
    fn local_name(&self) -> Option<&str>;

    /// Text of the current character data, comment or DTD token.
    fn text(&self) -> Option<&str>;
}

/// Cursor-style writer. End tags and the end of the document are written
/// without names; writers track their own open elements.
pub trait XmlStreamWriter {
    fn write_start_document(&mut self) -> XmlResult<()>;

    /// Closes every open element and flushes.
    fn write_end_document(&mut self) -> XmlResult<()>;

    fn write_start_element(&mut self, local_name: &str) -> XmlResult<()>;

    fn write_end_element(&mut self) -> XmlResult<()>;

    fn write_characters(&mut self, text: &str) -> XmlResult<()>;
}
