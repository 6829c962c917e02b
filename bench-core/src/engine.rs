//! Builds one engine from an explicit selection.

use crate::discovery::EngineTriple;
use crate::errors::{DiscoveryError, FactoryRole};
use crate::factory::{EventFactory, InputFactory, OutputFactory};
use crate::registry::Registry;

/// One instance of each factory role, selected by identifier.
pub struct Engine {
    pub triple: EngineTriple,
    event_factory: Box<dyn EventFactory>,
    input_factory: Box<dyn InputFactory>,
    output_factory: Box<dyn OutputFactory>,
}

impl Engine {
    pub fn from_selection(
        registry: &Registry,
        selection: &EngineTriple,
    ) -> Result<Self, DiscoveryError> {
        let event = registry
            .event_factory(&selection.event_factory)
            .ok_or_else(|| unknown(FactoryRole::Event, &selection.event_factory))?;
        let input = registry
            .input_factory(&selection.input_factory)
            .ok_or_else(|| unknown(FactoryRole::Input, &selection.input_factory))?;
        let output = registry
            .output_factory(&selection.output_factory)
            .ok_or_else(|| unknown(FactoryRole::Output, &selection.output_factory))?;

        if event.engine != input.engine || input.engine != output.engine {
            log::warn!(
                "engine roles come from different engines: event={} input={} output={}",
                event.engine,
                input.engine,
                output.engine
            );
        }

        Ok(Self {
            triple: selection.clone(),
            event_factory: event.instantiate(),
            input_factory: input.instantiate(),
            output_factory: output.instantiate(),
        })
    }

    pub fn event_factory(&self) -> &dyn EventFactory {
        self.event_factory.as_ref()
    }

    pub fn input_factory(&self) -> &dyn InputFactory {
        self.input_factory.as_ref()
    }

    pub fn output_factory(&self) -> &dyn OutputFactory {
        self.output_factory.as_ref()
    }
}

fn unknown(role: FactoryRole, id: &str) -> DiscoveryError {
    DiscoveryError::UnknownFactory {
        role,
        id: id.to_owned(),
    }
}
