//! opforge -- operator construction with capability-aware engine resolution.
//!
//! Given an [`OperatorSpec`], the factory picks the implementation that fits
//! the requested engine, what the accelerated engine supports in this build
//! ([`CapabilityProbe`]), and the operator's own parameters, falling back to
//! the native implementation whenever the accelerated one would not compute
//! the request correctly.

pub mod accel;
pub mod config;
pub mod factory;
pub mod foreign;
pub mod layers;
pub mod operator;
pub mod registry;
pub mod rules;
pub mod spec;

pub use accel::{CapabilityProbe, Engine};
pub use factory::{Factory, FactoryError};
pub use operator::{FromSpec, Operator, OperatorSummary};
pub use registry::{Registry, RegistryError};
pub use rules::ResolveError;
pub use spec::{EnginePreference, OperatorSpec};

/// Build `spec` with the installed factory.
///
/// Fails with [`FactoryError::NotInitialized`] until [`factory::init`] or
/// [`factory::install`] has run.
pub fn create(spec: &OperatorSpec) -> Result<Box<dyn Operator>, FactoryError> {
    factory::global()?.create(spec)
}
