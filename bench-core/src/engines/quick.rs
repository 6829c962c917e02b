//! Engine backed by the `quick-xml` crate.

use std::io::{BufRead, Write};

use quick_xml::events::{BytesCData, BytesDecl, BytesEnd, BytesPI, BytesStart, BytesText, Event};
use quick_xml::name::PrefixDeclaration;
use quick_xml::{Reader, Writer};

use crate::errors::XmlError;
use crate::events::{self, *};
use crate::factory::*;
use crate::registry::{Provenance, Registry};

pub const ENGINE: &str = "quick-xml";

pub fn register(registry: &mut Registry, provenance: Provenance) {
    registry.register_event_factory(ENGINE, provenance, || QuickXmlEventFactory);
    registry.register_input_factory(ENGINE, provenance, || QuickXmlInputFactory);
    registry.register_output_factory(ENGINE, provenance, || QuickXmlOutputFactory);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QuickXmlEventFactory;

impl EventFactory for QuickXmlEventFactory {}

#[derive(Debug, Default, Clone, Copy)]
pub struct QuickXmlInputFactory;

fn reader<'a>(source: &'a mut dyn BufRead) -> Reader<&'a mut dyn BufRead> {
    let mut reader = Reader::from_reader(source);
    reader.config_mut().expand_empty_elements = true;
    reader
}

impl InputFactory for QuickXmlInputFactory {
    fn create_event_reader<'a>(
        &self,
        source: &'a mut dyn BufRead,
        events: &'a dyn EventFactory,
    ) -> EventStream<'a> {
        Box::new(QuickXmlEventReader {
            inner: reader(source),
            events,
            buf: Vec::new(),
            depth: 0,
            pending: None,
            state: ReadState::Prolog,
        })
    }

    fn create_stream_reader<'a>(
        &self,
        source: &'a mut dyn BufRead,
    ) -> Box<dyn XmlStreamReader + 'a> {
        Box::new(QuickXmlStreamReader {
            inner: reader(source),
            buf: Vec::new(),
            cursor: Cursor::default(),
            kind: Some(EventKind::StartDocument),
        })
    }
}

fn utf8(bytes: &[u8]) -> XmlResult<String> {
    Ok(std::str::from_utf8(bytes)?.to_owned())
}

fn qname(name: quick_xml::name::QName<'_>) -> XmlResult<QName> {
    Ok(QName {
        prefix: name.prefix().map(|p| utf8(p.as_ref())).transpose()?,
        local_name: utf8(name.local_name().as_ref())?,
    })
}

fn start_document(decl: &BytesDecl<'_>, events: &dyn EventFactory) -> XmlResult<XmlEvent> {
    let version = utf8(&decl.version().map_err(quick_xml::Error::from)?)?;
    let encoding = decl
        .encoding()
        .transpose()
        .map_err(quick_xml::Error::from)?
        .map(|e| utf8(&e))
        .transpose()?;
    let standalone = decl
        .standalone()
        .transpose()
        .map_err(quick_xml::Error::from)?
        .map(|s| &*s == b"yes");
    Ok(events.start_document(Some(version), encoding, standalone))
}

fn start_element(start: &BytesStart<'_>, events: &dyn EventFactory) -> XmlResult<XmlEvent> {
    let mut attributes = Vec::new();
    let mut namespaces = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(quick_xml::Error::from)?;
        let value = attr
            .unescape_value()
            .map_err(quick_xml::Error::from)?
            .into_owned();
        match attr.key.as_namespace_binding() {
            Some(PrefixDeclaration::Default) => namespaces.push(Namespace {
                prefix: None,
                uri: value,
            }),
            Some(PrefixDeclaration::Named(prefix)) => namespaces.push(Namespace {
                prefix: Some(utf8(prefix)?),
                uri: value,
            }),
            None => attributes.push(Attribute {
                name: qname(attr.key)?,
                value,
            }),
        }
    }
    Ok(events.start_element(qname(start.name())?, attributes, namespaces))
}

fn processing_instruction(pi: &BytesPI<'_>, events: &dyn EventFactory) -> XmlResult<XmlEvent> {
    let target = utf8(pi.target())?;
    let data = std::str::from_utf8(pi.content())?.trim_start();
    let data = if data.is_empty() {
        None
    } else {
        Some(data.to_owned())
    };
    Ok(events.processing_instruction(target, data))
}

fn dtd(text: &[u8]) -> XmlResult<String> {
    Ok(std::str::from_utf8(text)?.trim().to_owned())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ReadState {
    /// Nothing read yet; the document start is still to be reported.
    Prolog,
    Body,
    Done,
}

struct QuickXmlEventReader<'a> {
    inner: Reader<&'a mut dyn BufRead>,
    events: &'a dyn EventFactory,
    buf: Vec<u8>,
    depth: usize,
    /// An event read ahead while synthesizing the document start.
    pending: Option<XmlEvent>,
    state: ReadState,
}

/// Converts one native event. `None` means the event carries nothing to
/// report.
fn convert(
    event: Event<'_>,
    events: &dyn EventFactory,
    depth: &mut usize,
) -> XmlResult<Option<XmlEvent>> {
    let event = match event {
        Event::Decl(decl) => start_document(&decl, events)?,
        Event::Start(start) | Event::Empty(start) => {
            *depth += 1;
            start_element(&start, events)?
        }
        Event::End(end) => {
            *depth = depth.saturating_sub(1);
            events.end_element(qname(end.name())?)
        }
        Event::Text(text) => {
            let data = text.unescape().map_err(quick_xml::Error::from)?.into_owned();
            let kind = events::characters_kind(*depth, &data);
            events.characters(data, kind)
        }
        Event::CData(cdata) => events.characters(utf8(&cdata)?, CharactersKind::CData),
        Event::Comment(comment) => events.comment(utf8(&comment)?),
        Event::PI(pi) => processing_instruction(&pi, events)?,
        Event::DocType(doctype) => events.dtd(dtd(&doctype)?),
        Event::Eof => {
            if *depth > 0 {
                return Err(XmlError::UnexpectedEof(*depth));
            }
            events.end_document()
        }
        #[allow(unreachable_patterns)]
        _ => return Ok(None),
    };
    Ok(Some(event))
}

impl QuickXmlEventReader<'_> {
    fn read(&mut self) -> XmlResult<XmlEvent> {
        let event = match self.pending.take() {
            Some(event) => event,
            None => loop {
                let event = self.inner.read_event_into(&mut self.buf)?;
                let converted = convert(event, self.events, &mut self.depth)?;
                self.buf.clear();
                if let Some(converted) = converted {
                    break converted;
                }
            },
        };

        if self.state == ReadState::Prolog {
            self.state = ReadState::Body;
            if !matches!(event, XmlEvent::StartDocument(_)) {
                self.pending = Some(event);
                return Ok(self.events.start_document(None, None, None));
            }
        }
        if matches!(event, XmlEvent::EndDocument) {
            self.state = ReadState::Done;
        }
        Ok(event)
    }
}

impl Iterator for QuickXmlEventReader<'_> {
    type Item = XmlResult<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.state == ReadState::Done {
            return None;
        }
        match self.read() {
            Ok(event) => Some(Ok(event)),
            Err(err) => {
                self.state = ReadState::Done;
                self.pending = None;
                Some(Err(err))
            }
        }
    }
}

/// Data of the token under the cursor. Buffers are reused between advances.
#[derive(Debug, Default)]
struct Cursor {
    name: String,
    text: String,
    depth: usize,
}

impl Cursor {
    fn set_name(&mut self, name: quick_xml::name::QName<'_>) -> XmlResult<()> {
        self.name.clear();
        self.name
            .push_str(std::str::from_utf8(name.local_name().as_ref())?);
        Ok(())
    }

    fn set_text(&mut self, text: &str) {
        self.text.clear();
        self.text.push_str(text);
    }

    fn load(&mut self, event: Event<'_>) -> XmlResult<Option<EventKind>> {
        let kind = match event {
            // The cursor is created on the document start.
            Event::Decl(_) => return Ok(None),
            Event::Start(start) | Event::Empty(start) => {
                self.depth += 1;
                self.set_name(start.name())?;
                EventKind::StartElement
            }
            Event::End(end) => {
                self.depth = self.depth.saturating_sub(1);
                self.set_name(end.name())?;
                EventKind::EndElement
            }
            Event::Text(text) => {
                let data = text.unescape().map_err(quick_xml::Error::from)?;
                self.set_text(&data);
                events::characters_kind(self.depth, &data).into()
            }
            Event::CData(cdata) => {
                self.set_text(std::str::from_utf8(&cdata)?);
                EventKind::CData
            }
            Event::Comment(comment) => {
                self.set_text(std::str::from_utf8(&comment)?);
                EventKind::Comment
            }
            Event::PI(_) => EventKind::ProcessingInstruction,
            Event::DocType(doctype) => {
                self.set_text(std::str::from_utf8(&doctype)?.trim());
                EventKind::Dtd
            }
            Event::Eof => {
                if self.depth > 0 {
                    return Err(XmlError::UnexpectedEof(self.depth));
                }
                EventKind::EndDocument
            }
            #[allow(unreachable_patterns)]
            _ => return Ok(None),
        };
        Ok(Some(kind))
    }
}

struct QuickXmlStreamReader<'a> {
    inner: Reader<&'a mut dyn BufRead>,
    buf: Vec<u8>,
    cursor: Cursor,
    kind: Option<EventKind>,
}

impl XmlStreamReader for QuickXmlStreamReader<'_> {
    fn has_next(&self) -> bool {
        self.kind != Some(EventKind::EndDocument)
    }

    fn next(&mut self) -> XmlResult<EventKind> {
        let kind = loop {
            let event = self.inner.read_event_into(&mut self.buf)?;
            let loaded = self.cursor.load(event)?;
            self.buf.clear();
            if let Some(kind) = loaded {
                break kind;
            }
        };
        self.kind = Some(kind);
        Ok(kind)
    }

    fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    fn local_name(&self) -> Option<&str> {
        match self.kind? {
            EventKind::StartElement | EventKind::EndElement => Some(&self.cursor.name),
            _ => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self.kind? {
            EventKind::Characters
            | EventKind::Space
            | EventKind::CData
            | EventKind::Comment
            | EventKind::Dtd => Some(&self.cursor.text),
            _ => None,
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct QuickXmlOutputFactory;

impl OutputFactory for QuickXmlOutputFactory {
    fn create_event_writer<'a>(&self, sink: &'a mut dyn Write) -> Box<dyn XmlEventWriter + 'a> {
        Box::new(QuickXmlEventWriter {
            inner: Writer::new(sink),
        })
    }

    fn create_stream_writer<'a>(
        &self,
        sink: &'a mut dyn Write,
    ) -> Box<dyn XmlStreamWriter + 'a> {
        Box::new(QuickXmlStreamWriter {
            inner: Writer::new(sink),
            open: Vec::new(),
        })
    }
}

struct QuickXmlEventWriter<'a> {
    inner: Writer<&'a mut dyn Write>,
}

impl QuickXmlEventWriter<'_> {
    fn write_start_element(&mut self, start: &StartElement) -> XmlResult<()> {
        let mut tag = BytesStart::new(start.name.to_string());
        for ns in &start.namespaces {
            match &ns.prefix {
                Some(prefix) => {
                    let key = format!("xmlns:{}", prefix);
                    tag.push_attribute((key.as_str(), ns.uri.as_str()));
                }
                None => tag.push_attribute(("xmlns", ns.uri.as_str())),
            }
        }
        for attr in &start.attributes {
            let key = attr.name.to_string();
            tag.push_attribute((key.as_str(), attr.value.as_str()));
        }
        self.inner.write_event(Event::Start(tag))?;
        Ok(())
    }
}

impl XmlEventWriter for QuickXmlEventWriter<'_> {
    fn add(&mut self, event: &XmlEvent) -> XmlResult<()> {
        match event {
            XmlEvent::StartDocument(doc) => {
                let standalone = doc.standalone.map(|s| if s { "yes" } else { "no" });
                self.inner.write_event(Event::Decl(BytesDecl::new(
                    doc.version.as_deref().unwrap_or("1.0"),
                    doc.encoding.as_deref(),
                    standalone,
                )))?;
            }
            XmlEvent::EndDocument => self.flush()?,
            XmlEvent::StartElement(start) => self.write_start_element(start)?,
            XmlEvent::EndElement(name) => {
                self.inner
                    .write_event(Event::End(BytesEnd::new(name.to_string())))?;
            }
            XmlEvent::Characters(characters) => match characters.kind {
                CharactersKind::CData => {
                    self.inner
                        .write_event(Event::CData(BytesCData::new(characters.data.as_str())))?;
                }
                CharactersKind::Text | CharactersKind::Whitespace => {
                    self.inner
                        .write_event(Event::Text(BytesText::new(&characters.data)))?;
                }
            },
            XmlEvent::Comment(text) => {
                self.inner
                    .write_event(Event::Comment(BytesText::from_escaped(text.as_str())))?;
            }
            XmlEvent::ProcessingInstruction(pi) => {
                let content = match &pi.data {
                    Some(data) => format!("{} {}", pi.target, data),
                    None => pi.target.clone(),
                };
                self.inner.write_event(Event::PI(BytesPI::new(content)))?;
            }
            XmlEvent::Dtd(text) => {
                self.inner
                    .write_event(Event::DocType(BytesText::from_escaped(text.as_str())))?;
            }
        }
        Ok(())
    }

    fn flush(&mut self) -> XmlResult<()> {
        self.inner.get_mut().flush()?;
        Ok(())
    }
}

struct QuickXmlStreamWriter<'a> {
    inner: Writer<&'a mut dyn Write>,
    open: Vec<String>,
}

impl XmlStreamWriter for QuickXmlStreamWriter<'_> {
    fn write_start_document(&mut self) -> XmlResult<()> {
        self.inner
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        Ok(())
    }

    fn write_end_document(&mut self) -> XmlResult<()> {
        while !self.open.is_empty() {
            self.write_end_element()?;
        }
        self.inner.get_mut().flush()?;
        Ok(())
    }

    fn write_start_element(&mut self, local_name: &str) -> XmlResult<()> {
        self.inner
            .write_event(Event::Start(BytesStart::new(local_name)))?;
        self.open.push(local_name.to_owned());
        Ok(())
    }

    fn write_end_element(&mut self) -> XmlResult<()> {
        let name = self.open.pop().ok_or(XmlError::UnbalancedEndElement)?;
        self.inner.write_event(Event::End(BytesEnd::new(name)))?;
        Ok(())
    }

    fn write_characters(&mut self, text: &str) -> XmlResult<()> {
        self.inner.write_event(Event::Text(BytesText::new(text)))?;
        Ok(())
    }
}
