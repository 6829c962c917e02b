//! Engine implementations of the factory roles.

#[cfg(feature = "quick-xml")]
pub mod quick;
pub mod xml_rs;
