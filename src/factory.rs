//! Factory entry point.
//!
//! [`Factory::create`] looks up the creator for a spec's type name and runs
//! it against the factory's capability probe. All operator-specific logic
//! lives in the rules.
//!
//! A process normally builds one factory at startup, installs it with
//! [`install`] or [`init`], and reaches it through [`global`] afterwards. The
//! installed factory is never modified, so `create` can be called from any
//! thread.

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::debug;

use crate::accel::{self, CapabilityProbe};
use crate::config::OpforgeConfig;
use crate::foreign::{self, ScriptRuntime};
use crate::operator::Operator;
use crate::registry::{Registry, RegistryError};
use crate::rules::{self, ResolveError};
use crate::spec::OperatorSpec;

#[derive(Debug, Error)]
pub enum FactoryError {
    #[error(transparent)]
    Registry(#[from] RegistryError),

    #[error(transparent)]
    Resolve(#[from] ResolveError),

    #[error("operator factory used before initialization")]
    NotInitialized,

    #[error("operator factory already initialized")]
    AlreadyInitialized,
}

#[derive(Debug)]
pub struct Factory {
    registry: Registry,
    probe: CapabilityProbe,
}

impl Factory {
    /// A factory with no operator kinds registered.
    pub fn new(probe: CapabilityProbe) -> Self {
        Self {
            registry: Registry::new(),
            probe,
        }
    }

    /// A factory with every built-in operator kind registered.
    pub fn with_builtins(probe: CapabilityProbe) -> Result<Self, RegistryError> {
        let mut factory = Self::new(probe);
        rules::register_builtin(&mut factory.registry)?;

        #[cfg(feature = "python")]
        factory.register_runtime(Arc::new(crate::foreign::python::PythonRuntime::new()))?;

        Ok(factory)
    }

    /// Add an operator kind. Only possible before the factory is installed.
    pub fn register<F>(&mut self, type_name: impl Into<String>, creator: F) -> Result<(), RegistryError>
    where
        F: Fn(&OperatorSpec, &CapabilityProbe) -> Result<Box<dyn Operator>, ResolveError>
            + Send
            + Sync
            + 'static,
    {
        self.registry.register(type_name, creator)
    }

    /// Route the script operator kind to `runtime`.
    pub fn register_runtime(&mut self, runtime: Arc<dyn ScriptRuntime>) -> Result<(), RegistryError> {
        foreign::register(&mut self.registry, runtime)
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn probe(&self) -> &CapabilityProbe {
        &self.probe
    }

    /// Build the operator described by `spec`.
    pub fn create(&self, spec: &OperatorSpec) -> Result<Box<dyn Operator>, FactoryError> {
        let creator = self.registry.lookup(&spec.type_name)?;
        let op = creator(spec, &self.probe)?;
        debug!(
            layer = %spec.name,
            kind = %spec.type_name,
            requested = %spec.engine,
            implementation = op.implementation(),
            engine = %op.engine(),
            "resolved operator"
        );
        Ok(op)
    }
}

static GLOBAL: OnceLock<Factory> = OnceLock::new();

/// Make `factory` the process-wide factory. Succeeds once.
pub fn install(factory: Factory) -> Result<&'static Factory, FactoryError> {
    GLOBAL
        .set(factory)
        .map_err(|_| FactoryError::AlreadyInitialized)?;
    global()
}

/// Build the default factory from `config` and install it.
///
/// Idempotent: when a factory is already installed it is returned unchanged.
pub fn init(config: &OpforgeConfig) -> Result<&'static Factory, FactoryError> {
    if let Some(factory) = GLOBAL.get() {
        return Ok(factory);
    }
    let factory = Factory::with_builtins(accel::detect(&config.accelerator))?;
    Ok(GLOBAL.get_or_init(|| factory))
}

/// The installed factory.
pub fn global() -> Result<&'static Factory, FactoryError> {
    GLOBAL.get().ok_or(FactoryError::NotInitialized)
}
