//! Engine backed by the `xml-rs` crate. This is the built-in default.

use std::borrow::Cow;
use std::io::{BufRead, Write};

use xml::common::XmlVersion;
use xml::name::OwnedName;
use xml::reader::{EventReader, ParserConfig, XmlEvent as ReaderEvent};
use xml::writer::{EmitterConfig, EventWriter, XmlEvent as WriterEvent};

use crate::errors::XmlError;
use crate::events::{self, *};
use crate::factory::*;
use crate::registry::{Provenance, Registry};

pub const ENGINE: &str = "xml-rs";

pub fn register(registry: &mut Registry, provenance: Provenance) {
    registry.register_event_factory(ENGINE, provenance, || XmlRsEventFactory);
    registry.register_input_factory(ENGINE, provenance, XmlRsInputFactory::default);
    registry.register_output_factory(ENGINE, provenance, XmlRsOutputFactory::default);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct XmlRsEventFactory;

impl EventFactory for XmlRsEventFactory {}

#[derive(Debug, Clone)]
pub struct XmlRsInputFactory {
    config: ParserConfig,
}

impl Default for XmlRsInputFactory {
    fn default() -> Self {
        Self {
            config: ParserConfig::new()
                .ignore_comments(false)
                .coalesce_characters(true),
        }
    }
}

impl InputFactory for XmlRsInputFactory {
    fn create_event_reader<'a>(
        &self,
        source: &'a mut dyn BufRead,
        events: &'a dyn EventFactory,
    ) -> EventStream<'a> {
        Box::new(XmlRsEventReader {
            inner: EventReader::new_with_config(source, self.config.clone()),
            events,
            scopes: Vec::new(),
            done: false,
        })
    }

    fn create_stream_reader<'a>(
        &self,
        source: &'a mut dyn BufRead,
    ) -> Box<dyn XmlStreamReader + 'a> {
        Box::new(XmlRsStreamReader {
            inner: EventReader::new_with_config(source, self.config.clone()),
            current: None,
            kind: Some(EventKind::StartDocument),
            depth: 0,
        })
    }
}

fn qname(name: OwnedName) -> QName {
    QName {
        prefix: name.prefix,
        local_name: name.local_name,
    }
}

fn is_predefined(prefix: &str, uri: &str) -> bool {
    prefix == "xml" || prefix == "xmlns" || (prefix.is_empty() && uri.is_empty())
}

struct XmlRsEventReader<'a> {
    inner: EventReader<&'a mut dyn BufRead>,
    events: &'a dyn EventFactory,
    /// In-scope namespaces of every open element.
    scopes: Vec<xml::namespace::Namespace>,
    done: bool,
}

impl XmlRsEventReader<'_> {
    /// xml-rs reports the whole in-scope mapping on each element; keep only
    /// the bindings that differ from the parent scope.
    fn declared_namespaces(&self, scope: &xml::namespace::Namespace) -> Vec<Namespace> {
        let parent = self.scopes.last();
        scope
            .0
            .iter()
            .filter(|(prefix, uri)| match parent {
                Some(parent) => parent.0.get(prefix.as_str()) != Some(*uri),
                None => !is_predefined(prefix, uri),
            })
            .map(|(prefix, uri)| Namespace {
                prefix: if prefix.is_empty() {
                    None
                } else {
                    Some(prefix.clone())
                },
                uri: uri.clone(),
            })
            .collect()
    }

    fn convert(&mut self, event: ReaderEvent) -> Option<XmlEvent> {
        let event = match event {
            ReaderEvent::StartDocument {
                version,
                encoding,
                standalone,
            } => self
                .events
                .start_document(Some(version.to_string()), Some(encoding), standalone),
            ReaderEvent::EndDocument => {
                self.done = true;
                self.events.end_document()
            }
            ReaderEvent::ProcessingInstruction { name, data } => {
                self.events.processing_instruction(name, data)
            }
            ReaderEvent::StartElement {
                name,
                attributes,
                namespace,
            } => {
                let namespaces = self.declared_namespaces(&namespace);
                self.scopes.push(namespace);
                let attributes = attributes
                    .into_iter()
                    .map(|attr| Attribute {
                        name: qname(attr.name),
                        value: attr.value,
                    })
                    .collect();
                self.events.start_element(qname(name), attributes, namespaces)
            }
            ReaderEvent::EndElement { name } => {
                self.scopes.pop();
                self.events.end_element(qname(name))
            }
            ReaderEvent::CData(data) => self.events.characters(data, CharactersKind::CData),
            ReaderEvent::Comment(text) => self.events.comment(text),
            ReaderEvent::Characters(data) | ReaderEvent::Whitespace(data) => {
                let kind = events::characters_kind(self.scopes.len(), &data);
                self.events.characters(data, kind)
            }
            #[allow(unreachable_patterns)]
            _ => return None,
        };
        Some(event)
    }
}

impl Iterator for XmlRsEventReader<'_> {
    type Item = XmlResult<XmlEvent>;

    fn next(&mut self) -> Option<Self::Item> {
        while !self.done {
            match self.inner.next() {
                Ok(event) => {
                    if let Some(event) = self.convert(event) {
                        return Some(Ok(event));
                    }
                }
                Err(err) => {
                    self.done = true;
                    return Some(Err(err.into()));
                }
            }
        }
        None
    }
}

struct XmlRsStreamReader<'a> {
    inner: EventReader<&'a mut dyn BufRead>,
    current: Option<ReaderEvent>,
    kind: Option<EventKind>,
    depth: usize,
}

impl XmlStreamReader for XmlRsStreamReader<'_> {
    fn has_next(&self) -> bool {
        self.kind != Some(EventKind::EndDocument)
    }

    fn next(&mut self) -> XmlResult<EventKind> {
        loop {
            let event = self.inner.next()?;
            let kind = match &event {
                // The cursor is created on the document start.
                ReaderEvent::StartDocument { .. } => continue,
                ReaderEvent::EndDocument => EventKind::EndDocument,
                ReaderEvent::ProcessingInstruction { .. } => EventKind::ProcessingInstruction,
                ReaderEvent::StartElement { .. } => {
                    self.depth += 1;
                    EventKind::StartElement
                }
                ReaderEvent::EndElement { .. } => {
                    self.depth = self.depth.saturating_sub(1);
                    EventKind::EndElement
                }
                ReaderEvent::CData(_) => EventKind::CData,
                ReaderEvent::Comment(_) => EventKind::Comment,
                ReaderEvent::Characters(data) | ReaderEvent::Whitespace(data) => {
                    events::characters_kind(self.depth, data).into()
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            };
            self.current = Some(event);
            self.kind = Some(kind);
            return Ok(kind);
        }
    }

    fn kind(&self) -> Option<EventKind> {
        self.kind
    }

    fn local_name(&self) -> Option<&str> {
        match self.current.as_ref()? {
            ReaderEvent::StartElement { name, .. } | ReaderEvent::EndElement { name } => {
                Some(&name.local_name)
            }
            _ => None,
        }
    }

    fn text(&self) -> Option<&str> {
        match self.current.as_ref()? {
            ReaderEvent::Characters(text)
            | ReaderEvent::Whitespace(text)
            | ReaderEvent::CData(text)
            | ReaderEvent::Comment(text) => Some(text),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct XmlRsOutputFactory {
    config: EmitterConfig,
}

impl Default for XmlRsOutputFactory {
    fn default() -> Self {
        Self {
            config: EmitterConfig::new().write_document_declaration(false),
        }
    }
}

impl OutputFactory for XmlRsOutputFactory {
    fn create_event_writer<'a>(&self, sink: &'a mut dyn Write) -> Box<dyn XmlEventWriter + 'a> {
        Box::new(XmlRsEventWriter {
            inner: self.config.clone().create_writer(sink),
        })
    }

    fn create_stream_writer<'a>(
        &self,
        sink: &'a mut dyn Write,
    ) -> Box<dyn XmlStreamWriter + 'a> {
        Box::new(XmlRsStreamWriter {
            inner: self.config.clone().create_writer(sink),
            open: 0,
        })
    }
}

fn raw_name(name: &QName) -> Cow<'_, str> {
    match name.prefix {
        Some(_) => Cow::Owned(name.to_string()),
        None => Cow::Borrowed(&name.local_name),
    }
}

fn xml_version(version: Option<&str>) -> XmlVersion {
    match version {
        Some("1.1") => XmlVersion::Version11,
        _ => XmlVersion::Version10,
    }
}

struct XmlRsEventWriter<'a> {
    inner: EventWriter<&'a mut dyn Write>,
}

impl XmlRsEventWriter<'_> {
    fn write_start_element(&mut self, start: &StartElement) -> XmlResult<()> {
        let name = raw_name(&start.name);
        let attr_names: Vec<Cow<'_, str>> =
            start.attributes.iter().map(|attr| raw_name(&attr.name)).collect();

        let mut element = WriterEvent::start_element(name.as_ref());
        for (attr, attr_name) in start.attributes.iter().zip(&attr_names) {
            element = element.attr(attr_name.as_ref(), &attr.value);
        }
        for ns in &start.namespaces {
            element = match &ns.prefix {
                Some(prefix) => element.ns(prefix.as_str(), ns.uri.as_str()),
                None => element.default_ns(ns.uri.as_str()),
            };
        }
        self.inner.write(element)?;
        Ok(())
    }
}

impl XmlEventWriter for XmlRsEventWriter<'_> {
    fn add(&mut self, event: &XmlEvent) -> XmlResult<()> {
        match event {
            XmlEvent::StartDocument(doc) => self.inner.write(WriterEvent::StartDocument {
                version: xml_version(doc.version.as_deref()),
                encoding: doc.encoding.as_deref(),
                standalone: doc.standalone,
            })?,
            XmlEvent::EndDocument => self.flush()?,
            XmlEvent::StartElement(start) => self.write_start_element(start)?,
            XmlEvent::EndElement(_) => self.inner.write(WriterEvent::end_element())?,
            XmlEvent::Characters(characters) => match characters.kind {
                CharactersKind::CData => self.inner.write(WriterEvent::cdata(&characters.data))?,
                CharactersKind::Text | CharactersKind::Whitespace => {
                    self.inner.write(WriterEvent::characters(&characters.data))?
                }
            },
            XmlEvent::Comment(text) => self.inner.write(WriterEvent::comment(text))?,
            XmlEvent::ProcessingInstruction(pi) => self.inner.write(
                WriterEvent::processing_instruction(&pi.target, pi.data.as_deref()),
            )?,
            XmlEvent::Dtd(text) => write!(self.inner.inner_mut(), "<!DOCTYPE {}>", text)?,
        }
        Ok(())
    }

    fn flush(&mut self) -> XmlResult<()> {
        self.inner.inner_mut().flush()?;
        Ok(())
    }
}

struct XmlRsStreamWriter<'a> {
    inner: EventWriter<&'a mut dyn Write>,
    open: usize,
}

impl XmlStreamWriter for XmlRsStreamWriter<'_> {
    fn write_start_document(&mut self) -> XmlResult<()> {
        self.inner.write(WriterEvent::StartDocument {
            version: XmlVersion::Version10,
            encoding: Some("UTF-8"),
            standalone: None,
        })?;
        Ok(())
    }

    fn write_end_document(&mut self) -> XmlResult<()> {
        while self.open > 0 {
            self.write_end_element()?;
        }
        self.inner.inner_mut().flush()?;
        Ok(())
    }

    fn write_start_element(&mut self, local_name: &str) -> XmlResult<()> {
        self.inner.write(WriterEvent::start_element(local_name))?;
        self.open += 1;
        Ok(())
    }

    fn write_end_element(&mut self) -> XmlResult<()> {
        if self.open == 0 {
            return Err(XmlError::UnbalancedEndElement);
        }
        self.inner.write(WriterEvent::end_element())?;
        self.open -= 1;
        Ok(())
    }

    fn write_characters(&mut self, text: &str) -> XmlResult<()> {
        self.inner.write(WriterEvent::characters(text))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    #[cfg(test)]
    use pretty_assertions::assert_eq;

    fn read_events(xml: &str) -> Vec<XmlEvent> {
        let mut source = xml.as_bytes();
        let factory = XmlRsEventFactory;
        XmlRsInputFactory::default()
            .create_event_reader(&mut source, &factory)
            .collect::<Result<Vec<_>, _>>()
            .unwrap()
    }

    #[test]
    fn test_read_events() {
        let events = read_events(
            r#"<?xml version="1.0" encoding="UTF-8"?><mondial><country car_code="AL">Albania</country></mondial>"#,
        );
        assert_eq!(
            events,
            vec![
                XmlEvent::StartDocument(StartDocument {
                    version: Some("1.0".to_owned()),
                    encoding: Some("UTF-8".to_owned()),
                    standalone: None,
                }),
                XmlEvent::StartElement(StartElement {
                    name: QName::local("mondial"),
                    attributes: vec![],
                    namespaces: vec![],
                }),
                XmlEvent::StartElement(StartElement {
                    name: QName::local("country"),
                    attributes: vec![Attribute::new("car_code", "AL")],
                    namespaces: vec![],
                }),
                XmlEvent::Characters(Characters {
                    data: "Albania".to_owned(),
                    kind: CharactersKind::Text,
                }),
                XmlEvent::EndElement(QName::local("country")),
                XmlEvent::EndElement(QName::local("mondial")),
                XmlEvent::EndDocument,
            ]
        );
    }

    #[test]
    fn test_declared_namespaces_only() {
        let events = read_events(
            r#"<a:root xmlns:a="urn:a" xmlns="urn:default"><a:child/><other xmlns:b="urn:b"/></a:root>"#,
        );
        let declared: Vec<Vec<Namespace>> = events
            .iter()
            .filter_map(XmlEvent::as_start_element)
            .map(|start| start.namespaces.clone())
            .collect();
        assert_eq!(
            declared,
            vec![
                vec![
                    Namespace {
                        prefix: None,
                        uri: "urn:default".to_owned(),
                    },
                    Namespace {
                        prefix: Some("a".to_owned()),
                        uri: "urn:a".to_owned(),
                    },
                ],
                vec![],
                vec![Namespace {
                    prefix: Some("b".to_owned()),
                    uri: "urn:b".to_owned(),
                }],
            ]
        );
    }

    #[test]
    fn test_stream_reader_positions() {
        let mut source = r#"<?xml version="1.0"?><a> <b>text</b></a>"#.as_bytes();
        let mut reader = XmlRsInputFactory::default().create_stream_reader(&mut source);
        assert_eq!(reader.kind(), Some(EventKind::StartDocument));
        assert!(reader.has_next());

        let mut kinds = vec![];
        while reader.has_next() {
            let kind = reader.next().unwrap();
            if kind == EventKind::StartElement {
                assert!(reader.local_name().is_some());
            }
            kinds.push(kind);
        }
        assert_eq!(
            kinds,
            vec![
                EventKind::StartElement,
                EventKind::Characters,
                EventKind::StartElement,
                EventKind::Characters,
                EventKind::EndElement,
                EventKind::EndElement,
                EventKind::EndDocument,
            ]
        );
    }

    #[test]
    fn test_stream_writer_closes_open_elements() {
        let mut out = Vec::new();
        {
            let mut writer = XmlRsOutputFactory::default().create_stream_writer(&mut out);
            writer.write_start_element("a").unwrap();
            writer.write_start_element("b").unwrap();
            writer.write_characters("x").unwrap();
            writer.write_end_document().unwrap();
        }
        assert_eq!(std::str::from_utf8(&out).unwrap(), "<a><b>x</b></a>");
    }

    #[test]
    fn test_stream_writer_rejects_unbalanced_end() {
        let mut out = Vec::new();
        let mut writer = XmlRsOutputFactory::default().create_stream_writer(&mut out);
        assert!(matches!(
            writer.write_end_element(),
            Err(XmlError::UnbalancedEndElement)
        ));
    }
}
