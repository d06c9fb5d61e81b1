//! Engine resolution rules, one per operator kind.
//!
//! Every rule follows the same outline:
//!
//! 1. `Default` becomes a concrete engine: accelerated when the probe reports
//!    it available, unless the family is biased towards native.
//! 2. An accelerated choice is checked against the operator's constraints and
//!    downgraded to native when the engine would not compute it correctly.
//! 3. Native always constructs; it supports every parameter combination.
//! 4. Engine names the rule does not know are configuration errors.
//!
//! What differs between kinds is which constraints apply, so each family
//! lives in its own module with its own `register` hook.

pub mod activation;
pub mod convolution;
pub mod fixed;
pub mod lrn;
pub mod pooling;

use thiserror::Error;
use tracing::info;

use crate::accel::{CapabilityProbe, Engine};
use crate::foreign::ForeignError;
use crate::registry::{Registry, RegistryError};
use crate::spec::{EnginePreference, OperatorSpec};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("layer {layer} has unknown engine {engine}")]
    UnknownEngine { layer: String, engine: String },

    #[error("layer {layer} requests the accelerated engine, which is not available in this build")]
    AcceleratedUnavailable { layer: String },

    #[error("layer {layer} is missing its {section} parameters")]
    MissingParams { layer: String, section: &'static str },

    #[error("layer {layer} could not be constructed by the script runtime")]
    Foreign {
        layer: String,
        #[source]
        source: ForeignError,
    },
}

/// Where `EnginePreference::Default` lands when the accelerated engine is
/// available.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefaultBias {
    Accelerated,
    Native,
}

/// Turn the spec's preference into a concrete engine.
///
/// Explicit accelerated requests are refused when the probe has no
/// accelerated engine; operator constraints are checked by the caller.
pub fn resolve_engine(
    spec: &OperatorSpec,
    probe: &CapabilityProbe,
    bias: DefaultBias,
) -> Result<Engine, ResolveError> {
    match &spec.engine {
        EnginePreference::Default => Ok(match bias {
            DefaultBias::Accelerated if probe.available => Engine::Accelerated,
            _ => Engine::Native,
        }),
        EnginePreference::Native => Ok(Engine::Native),
        EnginePreference::Accelerated if probe.available => Ok(Engine::Accelerated),
        EnginePreference::Accelerated => Err(ResolveError::AcceleratedUnavailable {
            layer: spec.name.clone(),
        }),
        EnginePreference::Other(engine) => Err(ResolveError::UnknownEngine {
            layer: spec.name.clone(),
            engine: engine.clone(),
        }),
    }
}

/// Fall back to the native engine, noting why.
pub(crate) fn downgrade(spec: &OperatorSpec, reason: &str) -> Engine {
    info!(
        layer = %spec.name,
        kind = %spec.type_name,
        "{}; using the native implementation",
        reason
    );
    Engine::Native
}

/// Register every built-in operator kind.
pub fn register_builtin(registry: &mut Registry) -> Result<(), RegistryError> {
    convolution::register(registry)?;
    pooling::register(registry)?;
    lrn::register(registry)?;
    activation::register(registry)?;
    fixed::register(registry)?;
    Ok(())
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::accel::CapabilityProbe;
    use crate::operator::Operator;
    use crate::registry::Registry;
    use crate::spec::OperatorSpec;

    /// Build `spec` through a registry holding only the built-in rules.
    pub fn build(spec: &OperatorSpec, probe: &CapabilityProbe) -> Box<dyn Operator> {
        let mut registry = Registry::new();
        super::register_builtin(&mut registry).unwrap();
        let creator = registry.lookup(&spec.type_name).ok().unwrap();
        creator(spec, probe).unwrap()
    }
}
