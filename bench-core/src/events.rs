//! Engine-neutral XML events.
//!
//! Event readers of every engine produce [`XmlEvent`] values and event
//! writers of every engine consume them, so any input factory can be paired
//! with any output factory.

use serde::Serialize;
use std::fmt;

/// Element or attribute name: local part and optional prefix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct QName {
    /// A name prefix, e.g. `xsi` in `xsi:string`.
    pub prefix: Option<String>,
    /// A local name, e.g. `string` in `xsi:string`.
    pub local_name: String,
}

impl QName {
    pub fn new<P, L>(prefix: P, local_name: L) -> Self
    where
        P: Into<String>,
        L: Into<String>,
    {
        Self {
            prefix: Some(prefix.into()),
            local_name: local_name.into(),
        }
    }

    pub fn local<L: Into<String>>(local_name: L) -> Self {
        Self {
            prefix: None,
            local_name: local_name.into(),
        }
    }

    /// Splits a raw `prefix:local` name.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(':') {
            Some((prefix, local_name)) => Self::new(prefix, local_name),
            None => Self::local(raw),
        }
    }
}

impl fmt::Display for QName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.prefix {
            Some(prefix) => write!(f, "{}:{}", prefix, self.local_name),
            None => f.write_str(&self.local_name),
        }
    }
}

impl From<&str> for QName {
    fn from(raw: &str) -> Self {
        QName::parse(raw)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Attribute {
    pub name: QName,
    pub value: String,
}

impl Attribute {
    pub fn new<N, V>(name: N, value: V) -> Self
    where
        N: Into<QName>,
        V: Into<String>,
    {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// A namespace declared on an element. `prefix` is `None` for the default
/// namespace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Namespace {
    pub prefix: Option<String>,
    pub uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartDocument {
    pub version: Option<String>,
    pub encoding: Option<String>,
    pub standalone: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StartElement {
    pub name: QName,
    pub attributes: Vec<Attribute>,
    pub namespaces: Vec<Namespace>,
}

/// Flavour of a character data event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum CharactersKind {
    Text,
    /// Whitespace outside the root element.
    Whitespace,
    CData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Characters {
    pub data: String,
    pub kind: CharactersKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProcessingInstruction {
    pub target: String,
    pub data: Option<String>,
}

/// Events for reading and re-writing an xml document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum XmlEvent {
    StartDocument(StartDocument),
    EndDocument,
    StartElement(StartElement),
    EndElement(QName),
    Characters(Characters),
    Comment(String),
    ProcessingInstruction(ProcessingInstruction),
    /// Unparsed document type declaration: the text between `<!DOCTYPE ` and `>`.
    Dtd(String),
}

impl XmlEvent {
    pub fn kind(&self) -> EventKind {
        match self {
            XmlEvent::StartDocument(_) => EventKind::StartDocument,
            XmlEvent::EndDocument => EventKind::EndDocument,
            XmlEvent::StartElement(_) => EventKind::StartElement,
            XmlEvent::EndElement(_) => EventKind::EndElement,
            XmlEvent::Characters(c) => c.kind.into(),
            XmlEvent::Comment(_) => EventKind::Comment,
            XmlEvent::ProcessingInstruction(_) => EventKind::ProcessingInstruction,
            XmlEvent::Dtd(_) => EventKind::Dtd,
        }
    }

    pub fn as_start_element(&self) -> Option<&StartElement> {
        match self {
            XmlEvent::StartElement(start) => Some(start),
            _ => None,
        }
    }

    /// Text, whitespace and CDATA.
    pub fn as_characters(&self) -> Option<&Characters> {
        match self {
            XmlEvent::Characters(characters) => Some(characters),
            _ => None,
        }
    }
}

/// Token kinds reported by cursor readers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum EventKind {
    StartDocument,
    EndDocument,
    StartElement,
    EndElement,
    Characters,
    Space,
    CData,
    Comment,
    ProcessingInstruction,
    Dtd,
}

impl From<CharactersKind> for EventKind {
    fn from(kind: CharactersKind) -> Self {
        match kind {
            CharactersKind::Text => EventKind::Characters,
            CharactersKind::Whitespace => EventKind::Space,
            CharactersKind::CData => EventKind::CData,
        }
    }
}

/// Classifies a piece of character data by the element depth it appears at.
pub(crate) fn characters_kind(depth: usize, data: &str) -> CharactersKind {
    if depth == 0 && data.chars().all(char::is_whitespace) {
        CharactersKind::Whitespace
    } else {
        CharactersKind::Text
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    #[cfg(test)]
    use pretty_assertions::assert_eq;

    #[test]
    fn test_qname_parse() {
        assert_eq!(QName::parse("xsi:string"), QName::new("xsi", "string"));
        assert_eq!(QName::parse("country"), QName::local("country"));
        assert_eq!(QName::new("xsi", "string").to_string(), "xsi:string");
    }

    #[test]
    fn test_characters_kind() {
        assert_eq!(characters_kind(0, " \n\t"), CharactersKind::Whitespace);
        assert_eq!(characters_kind(1, " \n\t"), CharactersKind::Text);
        assert_eq!(characters_kind(0, "text"), CharactersKind::Text);
    }

    #[test]
    fn test_event_kind() {
        let event = XmlEvent::Characters(Characters {
            data: "x < y".to_owned(),
            kind: CharactersKind::CData,
        });
        assert_eq!(event.kind(), EventKind::CData);
        assert_eq!(event.as_characters().map(|c| c.data.as_str()), Some("x < y"));
        assert!(event.as_start_element().is_none());
    }
}
