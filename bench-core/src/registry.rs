//! Provider registry for the three engine roles.
//!
//! Each registration is keyed by the Rust type name of the factory it
//! creates, so identifiers look like `xml_bench::engines::quick::QuickXmlInputFactory`.

use std::any::type_name;

use crate::engines;
use crate::factory::{EventFactory, InputFactory, OutputFactory};

/// Where a registration comes from. Discovery lists `Registered`
/// implementations and appends the `BuiltIn` one last.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Provenance {
    BuiltIn,
    Registered,
}

pub struct Registration<T: ?Sized> {
    pub id: String,
    pub engine: String,
    pub provenance: Provenance,
    create: Box<dyn Fn() -> Box<T>>,
}

impl<T: ?Sized> Registration<T> {
    /// Creates a fresh instance of the registered factory.
    pub fn instantiate(&self) -> Box<T> {
        (self.create)()
    }
}

impl<T: ?Sized> std::fmt::Debug for Registration<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("id", &self.id)
            .field("engine", &self.engine)
            .field("provenance", &self.provenance)
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct Registry {
    event_factories: Vec<Registration<dyn EventFactory>>,
    input_factories: Vec<Registration<dyn InputFactory>>,
    output_factories: Vec<Registration<dyn OutputFactory>>,
}

impl Registry {
    /// A registry without any implementation.
    pub fn empty() -> Self {
        Self::default()
    }

    /// A registry holding only the built-in `xml-rs` engine.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        engines::xml_rs::register(&mut registry, Provenance::BuiltIn);
        registry
    }

    /// The built-in engine plus every engine enabled through cargo features.
    pub fn host() -> Self {
        #[allow(unused_mut)]
        let mut registry = Self::builtin();
        #[cfg(feature = "quick-xml")]
        engines::quick::register(&mut registry, Provenance::Registered);
        registry
    }

    pub fn register_event_factory<F, C>(&mut self, engine: &str, provenance: Provenance, create: C)
    where
        F: EventFactory + 'static,
        C: Fn() -> F + 'static,
    {
        self.event_factories.push(Registration {
            id: type_name::<F>().to_owned(),
            engine: engine.to_owned(),
            provenance,
            create: Box::new(move || -> Box<dyn EventFactory> { Box::new(create()) }),
        });
    }

    pub fn register_input_factory<F, C>(&mut self, engine: &str, provenance: Provenance, create: C)
    where
        F: InputFactory + 'static,
        C: Fn() -> F + 'static,
    {
        self.input_factories.push(Registration {
            id: type_name::<F>().to_owned(),
            engine: engine.to_owned(),
            provenance,
            create: Box::new(move || -> Box<dyn InputFactory> { Box::new(create()) }),
        });
    }

    pub fn register_output_factory<F, C>(
        &mut self,
        engine: &str,
        provenance: Provenance,
        create: C,
    ) where
        F: OutputFactory + 'static,
        C: Fn() -> F + 'static,
    {
        self.output_factories.push(Registration {
            id: type_name::<F>().to_owned(),
            engine: engine.to_owned(),
            provenance,
            create: Box::new(move || -> Box<dyn OutputFactory> { Box::new(create()) }),
        });
    }

    pub fn event_factories(&self) -> &[Registration<dyn EventFactory>] {
        &self.event_factories
    }

    pub fn input_factories(&self) -> &[Registration<dyn InputFactory>] {
        &self.input_factories
    }

    pub fn output_factories(&self) -> &[Registration<dyn OutputFactory>] {
        &self.output_factories
    }

    pub fn event_factory(&self, id: &str) -> Option<&Registration<dyn EventFactory>> {
        self.event_factories.iter().find(|r| r.id == id)
    }

    pub fn input_factory(&self, id: &str) -> Option<&Registration<dyn InputFactory>> {
        self.input_factories.iter().find(|r| r.id == id)
    }

    pub fn output_factory(&self, id: &str) -> Option<&Registration<dyn OutputFactory>> {
        self.output_factories.iter().find(|r| r.id == id)
    }
}
