//! Operators built by an embedded scripting runtime.
//!
//! A spec names a module and a callable inside it; the runtime builds the
//! operator and hands back an opaque object. The factory owns one-time
//! initialization of the runtime and nothing else about its lifecycle.

#[cfg(feature = "python")]
pub mod python;

use std::sync::{Arc, OnceLock};

use thiserror::Error;
use tracing::{debug, error};

use crate::accel::CapabilityProbe;
use crate::operator::Operator;
use crate::registry::{Registry, RegistryError};
use crate::rules::ResolveError;
use crate::spec::OperatorSpec;

/// Type name script-defined operators register under.
pub const PYTHON: &str = "Python";

#[derive(Debug, Error)]
pub enum ForeignError {
    #[error("{runtime} runtime failed to initialize: {message}")]
    Init { runtime: String, message: String },

    #[error("{module}.{symbol} raised: {message}")]
    Raised {
        module: String,
        symbol: String,
        message: String,
    },

    #[error("failed to marshal operator spec: {0}")]
    Marshal(#[from] serde_json::Error),
}

/// An embedded scripting runtime able to build operators.
pub trait ScriptRuntime: Send + Sync {
    /// Short name for diagnostics, e.g. `python`.
    fn name(&self) -> &str;

    /// Bring the runtime up. Called once, before the first construction.
    fn initialize(&self) -> Result<(), ForeignError>;

    /// Call `symbol` from `module` with the spec and wrap what it returns.
    fn instantiate(
        &self,
        module: &str,
        symbol: &str,
        spec: &OperatorSpec,
    ) -> Result<Box<dyn Operator>, ForeignError>;
}

/// Register `runtime` under [`PYTHON`].
pub fn register(registry: &mut Registry, runtime: Arc<dyn ScriptRuntime>) -> Result<(), RegistryError> {
    register_as(registry, PYTHON, runtime)
}

/// Register `runtime` under an arbitrary type name.
pub fn register_as(
    registry: &mut Registry,
    type_name: &str,
    runtime: Arc<dyn ScriptRuntime>,
) -> Result<(), RegistryError> {
    let delegate = Delegate {
        runtime,
        initialized: OnceLock::new(),
    };
    registry.register(type_name, move |spec, probe| delegate.create(spec, probe))
}

struct Delegate {
    runtime: Arc<dyn ScriptRuntime>,
    /// Outcome of the one initialization attempt.
    initialized: OnceLock<Result<(), String>>,
}

impl Delegate {
    fn ensure_initialized(&self) -> Result<(), ForeignError> {
        let outcome = self.initialized.get_or_init(|| {
            debug!(runtime = self.runtime.name(), "initializing script runtime");
            self.runtime.initialize().map_err(|e| e.to_string())
        });
        outcome.clone().map_err(|message| ForeignError::Init {
            runtime: self.runtime.name().to_string(),
            message,
        })
    }

    fn create(
        &self,
        spec: &OperatorSpec,
        _probe: &CapabilityProbe,
    ) -> Result<Box<dyn Operator>, ResolveError> {
        let script = spec
            .params
            .script
            .as_ref()
            .ok_or_else(|| ResolveError::MissingParams {
                layer: spec.name.clone(),
                section: "script",
            })?;

        self.ensure_initialized()
            .and_then(|()| self.runtime.instantiate(&script.module, &script.symbol, spec))
            .map_err(|source| {
                error!(
                    layer = %spec.name,
                    runtime = self.runtime.name(),
                    error = %source,
                    "script runtime failed to construct operator"
                );
                ResolveError::Foreign {
                    layer: spec.name.clone(),
                    source,
                }
            })
    }
}
