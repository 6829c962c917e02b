use std::fmt::Write as _;
use thiserror::Error;

/// Errors raised while reading or writing xml through an engine.
#[derive(Error, Debug)]
pub enum XmlError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("xml-rs failed to read")]
    XmlRsRead(#[from] xml::reader::Error),
    #[error("xml-rs failed to write")]
    XmlRsWrite(#[from] xml::writer::Error),
    #[cfg(feature = "quick-xml")]
    #[error("quick-xml failed")]
    QuickXml(#[from] quick_xml::Error),
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
    #[error("end element written without a matching start element")]
    UnbalancedEndElement,
    #[error("input ended with {0} unclosed element(s)")]
    UnexpectedEof(usize),
    #[error("cursor on a start element has no local name")]
    MissingLocalName,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DiscoveryError {
    #[error("engine roles are not paired: {event} event factories, {input} input factories, {output} output factories")]
    MismatchedRoles {
        event: usize,
        input: usize,
        output: usize,
    },
    #[error("no {role} factory registered as `{id}`")]
    UnknownFactory { role: FactoryRole, id: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactoryRole {
    Event,
    Input,
    Output,
}

impl std::fmt::Display for FactoryRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FactoryRole::Event => f.write_str("event"),
            FactoryRole::Input => f.write_str("input"),
            FactoryRole::Output => f.write_str("output"),
        }
    }
}

#[derive(Error, Debug)]
pub enum BenchError {
    #[error("failed to access input `{path}`")]
    Input {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Xml(#[from] XmlError),
    #[error(transparent)]
    Discovery(#[from] DiscoveryError),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T, E = BenchError> = std::result::Result<T, E>;

/// Renders an error followed by its `source()` chain, one cause per line.
pub fn diagnostic(err: &dyn std::error::Error) -> String {
    let mut out = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let _ = write!(out, "\n  caused by: {}", cause);
        source = cause.source();
    }
    out
}

#[cfg(test)]
mod tests {

    use super::*;
    #[cfg(test)]
    use pretty_assertions::assert_eq;
    use std::io;

    #[test]
    fn test_diagnostic_includes_sources() {
        let err = BenchError::Input {
            path: "mondial.xml".to_owned(),
            source: io::Error::new(io::ErrorKind::NotFound, "No such file or directory"),
        };
        assert_eq!(
            diagnostic(&err),
            "failed to access input `mondial.xml`\n  caused by: No such file or directory"
        );
    }

    #[test]
    fn test_mismatched_roles_message() {
        let err = DiscoveryError::MismatchedRoles {
            event: 2,
            input: 1,
            output: 2,
        };
        assert_eq!(
            err.to_string(),
            "engine roles are not paired: 2 event factories, 1 input factories, 2 output factories"
        );
    }
}
