//! Local response normalization.
//!
//! Within-channel normalization maps onto the accelerated local contrast
//! normalization kernel. Cross-channel normalization uses the accelerated LRN
//! kernel while the window fits the library limit.

use super::{downgrade, resolve_engine, DefaultBias, ResolveError};
use crate::accel::{CapabilityProbe, Engine};
use crate::layers::accelerated::{AcceleratedLcnLayer, AcceleratedLrnLayer};
use crate::layers::native::LrnLayer;
use crate::operator::{FromSpec, Operator};
use crate::registry::{Registry, RegistryError};
use crate::spec::{NormRegion, OperatorSpec};

pub const LRN: &str = "LRN";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(LRN, lrn)
}

pub fn lrn(spec: &OperatorSpec, probe: &CapabilityProbe) -> Result<Box<dyn Operator>, ResolveError> {
    if resolve_engine(spec, probe, DefaultBias::Accelerated)? == Engine::Native {
        return Ok(LrnLayer::boxed(spec));
    }

    let params = &spec.params.lrn;
    match params.norm_region {
        NormRegion::WithinChannel => Ok(AcceleratedLcnLayer::boxed(spec)),
        NormRegion::AcrossChannels if params.local_size > probe.max_lrn_window => {
            downgrade(spec, "normalization window exceeds the accelerated limit");
            Ok(LrnLayer::boxed(spec))
        }
        NormRegion::AcrossChannels => Ok(AcceleratedLrnLayer::boxed(spec)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::build;
    use crate::spec::{EnginePreference, LrnParams};

    fn norm(params: LrnParams) -> OperatorSpec {
        OperatorSpec::new("norm1", LRN).with_lrn(params)
    }

    #[test]
    fn test_default_across_channels_is_accelerated() {
        let op = build(&norm(LrnParams::default()), &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "AcceleratedLrnLayer");
    }

    #[test]
    fn test_within_channel_selects_lcn() {
        let spec = norm(LrnParams::within_channel(5)).with_engine(EnginePreference::Accelerated);
        let op = build(&spec, &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "AcceleratedLcnLayer");
        assert_eq!(op.engine(), Engine::Accelerated);
    }

    #[test]
    fn test_within_channel_ignores_window_limit() {
        let probe = CapabilityProbe::accelerated().with_max_lrn_window(3);
        let op = build(&norm(LrnParams::within_channel(9)), &probe);
        assert_eq!(op.implementation(), "AcceleratedLcnLayer");
    }

    #[test]
    fn test_window_over_limit_downgrades() {
        let probe = CapabilityProbe::accelerated().with_max_lrn_window(16);
        let spec = norm(LrnParams::across_channels(17)).with_engine(EnginePreference::Accelerated);
        let op = build(&spec, &probe);
        assert_eq!(op.implementation(), "LrnLayer");
        assert_eq!(op.engine(), Engine::Native);
    }

    #[test]
    fn test_window_at_limit_stays_accelerated() {
        let probe = CapabilityProbe::accelerated().with_max_lrn_window(16);
        let op = build(&norm(LrnParams::across_channels(16)), &probe);
        assert_eq!(op.implementation(), "AcceleratedLrnLayer");
    }

    #[test]
    fn test_native_request_ignores_region() {
        let spec = norm(LrnParams::within_channel(5)).with_engine(EnginePreference::Native);
        let op = build(&spec, &CapabilityProbe::accelerated());
        assert_eq!(op.implementation(), "LrnLayer");
    }
}
