//! Enumerates the engine implementations compiled into the binary.

use serde::Serialize;

use crate::errors::DiscoveryError;
use crate::registry::{Provenance, Registration, Registry};

/// The three factory identifiers that together make up one engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EngineTriple {
    pub event_factory: String,
    pub input_factory: String,
    pub output_factory: String,
}

impl std::fmt::Display for EngineTriple {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {} {}",
            self.event_factory, self.input_factory, self.output_factory
        )
    }
}

/// Ordered identifier lists, one per role.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Discovered {
    pub event_factories: Vec<String>,
    pub input_factories: Vec<String>,
    pub output_factories: Vec<String>,
}

impl Discovered {
    /// Pairs the three lists by position.
    pub fn into_triples(self) -> Result<Vec<EngineTriple>, DiscoveryError> {
        let (event, input, output) = (
            self.event_factories.len(),
            self.input_factories.len(),
            self.output_factories.len(),
        );
        if event != input || input != output {
            return Err(DiscoveryError::MismatchedRoles {
                event,
                input,
                output,
            });
        }

        Ok(self
            .event_factories
            .into_iter()
            .zip(self.input_factories)
            .zip(self.output_factories)
            .map(|((event_factory, input_factory), output_factory)| EngineTriple {
                event_factory,
                input_factory,
                output_factory,
            })
            .collect())
    }
}

/// Sorted registered identifiers of each role, followed by the built-in
/// default. The default is appended even when the registry does not hold it.
pub fn discover(registry: &Registry) -> Discovered {
    Discovered {
        event_factories: role_ids(registry.event_factories(), EVENT_DEFAULT),
        input_factories: role_ids(registry.input_factories(), INPUT_DEFAULT),
        output_factories: role_ids(registry.output_factories(), OUTPUT_DEFAULT),
    }
}

pub fn discover_triples(registry: &Registry) -> Result<Vec<EngineTriple>, DiscoveryError> {
    let triples = discover(registry).into_triples()?;
    for triple in &triples {
        log::debug!("discovered engine {}", triple);
    }
    Ok(triples)
}

pub(crate) const EVENT_DEFAULT: &str = "xml_bench::engines::xml_rs::XmlRsEventFactory";
pub(crate) const INPUT_DEFAULT: &str = "xml_bench::engines::xml_rs::XmlRsInputFactory";
pub(crate) const OUTPUT_DEFAULT: &str = "xml_bench::engines::xml_rs::XmlRsOutputFactory";

/// The built-in triple, used for roles left unset by explicit selection.
pub fn default_triple() -> EngineTriple {
    EngineTriple {
        event_factory: EVENT_DEFAULT.to_owned(),
        input_factory: INPUT_DEFAULT.to_owned(),
        output_factory: OUTPUT_DEFAULT.to_owned(),
    }
}

fn role_ids<T: ?Sized>(registrations: &[Registration<T>], default: &str) -> Vec<String> {
    let mut ids: Vec<String> = registrations
        .iter()
        .filter(|r| r.provenance == Provenance::Registered)
        .map(|r| r.id.clone())
        .collect();
    ids.sort();
    ids.push(default.to_owned());
    ids
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::engines::xml_rs::{XmlRsEventFactory, XmlRsInputFactory, XmlRsOutputFactory};
    #[cfg(test)]
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_registry_yields_default_triple() {
        let triples = discover_triples(&Registry::empty()).unwrap();
        assert_eq!(triples, vec![default_triple()]);
    }

    #[test]
    fn test_default_ids_match_type_names() {
        assert_eq!(EVENT_DEFAULT, std::any::type_name::<XmlRsEventFactory>());
        assert_eq!(INPUT_DEFAULT, std::any::type_name::<XmlRsInputFactory>());
        assert_eq!(OUTPUT_DEFAULT, std::any::type_name::<XmlRsOutputFactory>());
    }

    struct ZetaEvents;
    impl crate::factory::EventFactory for ZetaEvents {}

    struct AlphaEvents;
    impl crate::factory::EventFactory for AlphaEvents {}

    #[test]
    fn test_registered_ids_sorted_before_default() {
        let mut registry = Registry::builtin();
        registry.register_event_factory("zeta", Provenance::Registered, || ZetaEvents);
        registry.register_event_factory("alpha", Provenance::Registered, || AlphaEvents);

        let discovered = discover(&registry);
        assert_eq!(
            discovered.event_factories,
            vec![
                "xml_bench::discovery::tests::AlphaEvents".to_owned(),
                "xml_bench::discovery::tests::ZetaEvents".to_owned(),
                EVENT_DEFAULT.to_owned(),
            ]
        );
        assert_eq!(discovered.input_factories, vec![INPUT_DEFAULT.to_owned()]);
        assert!(discovered.into_triples().is_err());
    }

    #[test]
    fn test_mismatched_roles_rejected() {
        let discovered = Discovered {
            event_factories: vec!["a".into(), "b".into()],
            input_factories: vec!["a".into()],
            output_factories: vec!["a".into(), "b".into()],
        };
        assert_eq!(
            discovered.into_triples(),
            Err(DiscoveryError::MismatchedRoles {
                event: 2,
                input: 1,
                output: 2
            })
        );
    }

    #[test]
    fn test_pairs_by_position() {
        let discovered = Discovered {
            event_factories: vec!["e1".into(), "e2".into()],
            input_factories: vec!["i1".into(), "i2".into()],
            output_factories: vec!["o1".into(), "o2".into()],
        };
        let triples = discovered.into_triples().unwrap();
        assert_eq!(triples[1].to_string(), "e2 i2 o2");
    }

    #[cfg(feature = "quick-xml")]
    #[test]
    fn test_host_registry_lists_quick_xml_first() {
        let triples = discover_triples(&Registry::host()).unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!(
            triples[0].input_factory,
            "xml_bench::engines::quick::QuickXmlInputFactory"
        );
        assert_eq!(triples[1], default_triple());
    }
}
