//! Elementwise activations and softmax.
//!
//! These stay on the native engine unless a spec asks for the accelerated one
//! by name, even when the accelerated engine is available. Once asked for,
//! the accelerated variant handles every configuration.

use super::{resolve_engine, DefaultBias, ResolveError};
use crate::accel::{CapabilityProbe, Engine};
use crate::layers::accelerated::{
    AcceleratedReluLayer, AcceleratedSigmoidLayer, AcceleratedSoftmaxLayer, AcceleratedTanhLayer,
};
use crate::layers::native::{ReluLayer, SigmoidLayer, SoftmaxLayer, TanhLayer};
use crate::operator::{FromSpec, Operator};
use crate::registry::{Registry, RegistryError};
use crate::spec::OperatorSpec;

pub const RELU: &str = "ReLU";
pub const SIGMOID: &str = "Sigmoid";
pub const TANH: &str = "TanH";
pub const SOFTMAX: &str = "Softmax";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(RELU, opt_in::<ReluLayer, AcceleratedReluLayer>)?;
    registry.register(SIGMOID, opt_in::<SigmoidLayer, AcceleratedSigmoidLayer>)?;
    registry.register(TANH, opt_in::<TanhLayer, AcceleratedTanhLayer>)?;
    registry.register(SOFTMAX, opt_in::<SoftmaxLayer, AcceleratedSoftmaxLayer>)
}

/// Native unless the accelerated engine is requested explicitly.
fn opt_in<N: FromSpec, A: FromSpec>(
    spec: &OperatorSpec,
    probe: &CapabilityProbe,
) -> Result<Box<dyn Operator>, ResolveError> {
    match resolve_engine(spec, probe, DefaultBias::Native)? {
        Engine::Accelerated => Ok(A::boxed(spec)),
        _ => Ok(N::boxed(spec)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::build;
    use crate::spec::EnginePreference;

    const KINDS: [(&str, &str, &str); 4] = [
        (RELU, "ReluLayer", "AcceleratedReluLayer"),
        (SIGMOID, "SigmoidLayer", "AcceleratedSigmoidLayer"),
        (TANH, "TanhLayer", "AcceleratedTanhLayer"),
        (SOFTMAX, "SoftmaxLayer", "AcceleratedSoftmaxLayer"),
    ];

    #[test]
    fn test_default_is_native_even_with_engine() {
        for (kind, native, _) in KINDS {
            let op = build(&OperatorSpec::new("act", kind), &CapabilityProbe::accelerated());
            assert_eq!(op.implementation(), native);
            assert_eq!(op.engine(), Engine::Native);
        }
    }

    #[test]
    fn test_explicit_accelerated_is_honored() {
        for (kind, _, accelerated) in KINDS {
            let spec = OperatorSpec::new("act", kind).with_engine(EnginePreference::Accelerated);
            let op = build(&spec, &CapabilityProbe::accelerated());
            assert_eq!(op.implementation(), accelerated);
            assert_eq!(op.engine(), Engine::Accelerated);
        }
    }

    #[test]
    fn test_explicit_accelerated_without_engine_fails() {
        let spec = OperatorSpec::new("relu1", RELU).with_engine(EnginePreference::Accelerated);
        let err = opt_in::<ReluLayer, AcceleratedReluLayer>(&spec, &CapabilityProbe::native_only())
            .unwrap_err();
        assert!(matches!(err, ResolveError::AcceleratedUnavailable { .. }));
    }
}
