//! Convolution and deconvolution.
//!
//! The accelerated kernels cannot dilate. A dilated spec resolves to native
//! by default and is downgraded when the accelerated engine is asked for
//! explicitly, unless the probe says the linked library can dilate.

use tracing::debug;

use super::{downgrade, resolve_engine, DefaultBias, ResolveError};
use crate::accel::{CapabilityProbe, Engine};
use crate::layers::accelerated::AcceleratedConvolutionLayer;
use crate::layers::native::{ConvolutionLayer, DeconvolutionLayer};
use crate::operator::{FromSpec, Operator};
use crate::registry::{Registry, RegistryError};
use crate::spec::OperatorSpec;

pub const CONVOLUTION: &str = "Convolution";
pub const DECONVOLUTION: &str = "Deconvolution";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(CONVOLUTION, convolution)?;
    registry.register(DECONVOLUTION, deconvolution)
}

/// Engine choice shared by both kinds.
fn choose(spec: &OperatorSpec, probe: &CapabilityProbe) -> Result<Engine, ResolveError> {
    let blocked = spec.params.convolution.is_dilated() && !probe.dilated_convolution;
    let bias = if blocked {
        DefaultBias::Native
    } else {
        DefaultBias::Accelerated
    };

    match resolve_engine(spec, probe, bias)? {
        Engine::Accelerated if blocked => Ok(downgrade(
            spec,
            "accelerated engine does not support dilated convolution",
        )),
        engine => Ok(engine),
    }
}

pub fn convolution(
    spec: &OperatorSpec,
    probe: &CapabilityProbe,
) -> Result<Box<dyn Operator>, ResolveError> {
    match choose(spec, probe)? {
        Engine::Accelerated => Ok(AcceleratedConvolutionLayer::boxed(spec)),
        _ => Ok(ConvolutionLayer::boxed(spec)),
    }
}

pub fn deconvolution(
    spec: &OperatorSpec,
    probe: &CapabilityProbe,
) -> Result<Box<dyn Operator>, ResolveError> {
    if choose(spec, probe)? == Engine::Accelerated {
        debug!(layer = %spec.name, "no accelerated deconvolution kernel; delegating to native");
    }
    Ok(DeconvolutionLayer::boxed(spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::build;
    use crate::spec::{ConvolutionParams, EnginePreference};

    fn conv(dilation: &[u32]) -> OperatorSpec {
        OperatorSpec::new("conv1", CONVOLUTION)
            .with_convolution(ConvolutionParams::default().with_dilation(dilation.to_vec()))
    }

    #[test]
    fn test_undilated_default_is_accelerated() {
        let op = build(&conv(&[1, 1]), &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "AcceleratedConvolutionLayer");
        assert_eq!(op.engine(), Engine::Accelerated);
    }

    #[test]
    fn test_no_engine_means_native() {
        let op = build(&conv(&[]), &CapabilityProbe::native_only());
        assert_eq!(op.implementation(), "ConvolutionLayer");
    }

    #[test]
    fn test_dilated_default_is_native() {
        let op = build(&conv(&[1, 2]), &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "ConvolutionLayer");
    }

    #[test]
    fn test_dilated_explicit_accelerated_downgrades() {
        let spec = conv(&[2, 2]).with_engine(EnginePreference::Accelerated);
        let op = build(&spec, &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "ConvolutionLayer");
        assert_eq!(op.engine(), Engine::Native);
    }

    #[test]
    fn test_dilation_capable_library_keeps_accelerated() {
        let probe = CapabilityProbe::accelerated().with_dilated_convolution(true);
        let op = build(&conv(&[2, 2]), &probe);
        assert_eq!(op.implementation(), "AcceleratedConvolutionLayer");
    }

    #[test]
    fn test_explicit_native_wins() {
        let spec = conv(&[1, 1]).with_engine(EnginePreference::Native);
        let op = build(&spec, &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "ConvolutionLayer");
    }

    #[test]
    fn test_deconvolution_always_native_implementation() {
        let probe = CapabilityProbe::accelerated();
        for spec in [
            OperatorSpec::new("up1", DECONVOLUTION),
            OperatorSpec::new("up2", DECONVOLUTION).with_engine(EnginePreference::Accelerated),
            OperatorSpec::new("up3", DECONVOLUTION)
                .with_engine(EnginePreference::Accelerated)
                .with_convolution(ConvolutionParams::default().with_dilation([3, 3])),
        ] {
            let op = build(&spec, &probe);
            assert_eq!(op.implementation(), "DeconvolutionLayer");
            assert_eq!(op.type_name(), DECONVOLUTION);
        }
    }

    #[test]
    fn test_deconvolution_unknown_engine_fails() {
        let spec = OperatorSpec::new("up1", DECONVOLUTION).with_engine("metal");
        let err = deconvolution(&spec, &CapabilityProbe::accelerated()).unwrap_err();
        assert!(err.to_string().contains("up1"));
    }
}
