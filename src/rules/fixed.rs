//! Kinds with a single implementation: data sources, regularization, losses
//! and evaluation. The engine preference is ignored.

use super::ResolveError;
use crate::accel::CapabilityProbe;
use crate::layers::native::{
    AccuracyLayer, CrfLossLayer, DropoutLayer, Image2MeshLayer, ImageDepthLabelDataLayer,
    ImageLabelDataLayer, InputLayer, MeshImageLabelDataLayer, SoftmaxWithLossLayer,
};
use crate::operator::{FromSpec, Operator};
use crate::registry::{Registry, RegistryError};
use crate::spec::OperatorSpec;

pub const IMAGE_LABEL_DATA: &str = "ImageLabelData";
pub const MESH_IMAGE_LABEL_DATA: &str = "MeshImageLabelData";
pub const IMAGE_DEPTH_LABEL_DATA: &str = "ImageDepthLabelData";
pub const IMAGE_TO_MESH: &str = "Image2Mesh";
pub const DROPOUT: &str = "Dropout";
pub const SOFTMAX_WITH_LOSS: &str = "SoftmaxWithLoss";
pub const CRF_LOSS: &str = "CRFLoss";
pub const ACCURACY: &str = "Accuracy";
pub const INPUT: &str = "Input";

/// Older network definitions name these kinds with this suffix
/// (`DropoutLayer`); both spellings build the same implementation.
pub const LEGACY_SUFFIX: &str = "Layer";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    register_kind::<ImageLabelDataLayer>(registry, IMAGE_LABEL_DATA)?;
    register_kind::<MeshImageLabelDataLayer>(registry, MESH_IMAGE_LABEL_DATA)?;
    register_kind::<ImageDepthLabelDataLayer>(registry, IMAGE_DEPTH_LABEL_DATA)?;
    register_kind::<Image2MeshLayer>(registry, IMAGE_TO_MESH)?;
    register_kind::<DropoutLayer>(registry, DROPOUT)?;
    register_kind::<SoftmaxWithLossLayer>(registry, SOFTMAX_WITH_LOSS)?;
    register_kind::<CrfLossLayer>(registry, CRF_LOSS)?;
    register_kind::<AccuracyLayer>(registry, ACCURACY)?;
    register_kind::<InputLayer>(registry, INPUT)
}

fn register_kind<T: FromSpec>(registry: &mut Registry, type_name: &str) -> Result<(), RegistryError> {
    registry.register(type_name, single::<T>)?;
    registry.register(format!("{type_name}{LEGACY_SUFFIX}"), single::<T>)
}

fn single<T: FromSpec>(
    spec: &OperatorSpec,
    _probe: &CapabilityProbe,
) -> Result<Box<dyn Operator>, ResolveError> {
    Ok(T::boxed(spec))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accel::Engine;
    use crate::rules::testing::build;

    #[test]
    fn test_every_fixed_kind_builds_native() {
        let kinds = [
            (IMAGE_LABEL_DATA, "ImageLabelDataLayer"),
            (MESH_IMAGE_LABEL_DATA, "MeshImageLabelDataLayer"),
            (IMAGE_DEPTH_LABEL_DATA, "ImageDepthLabelDataLayer"),
            (IMAGE_TO_MESH, "Image2MeshLayer"),
            (DROPOUT, "DropoutLayer"),
            (SOFTMAX_WITH_LOSS, "SoftmaxWithLossLayer"),
            (CRF_LOSS, "CrfLossLayer"),
            (ACCURACY, "AccuracyLayer"),
            (INPUT, "InputLayer"),
        ];
        for (kind, implementation) in kinds {
            let op = build(&OperatorSpec::new("l", kind), &CapabilityProbe::accelerated());
            assert_eq!(op.implementation(), implementation);
            assert_eq!(op.engine(), Engine::Native);
        }
    }

    #[test]
    fn test_suffixed_names_build_the_same_layer() {
        let kinds = [
            ("ImageLabelDataLayer", "ImageLabelDataLayer"),
            ("MeshImageLabelDataLayer", "MeshImageLabelDataLayer"),
            ("ImageDepthLabelDataLayer", "ImageDepthLabelDataLayer"),
            ("Image2MeshLayer", "Image2MeshLayer"),
            ("DropoutLayer", "DropoutLayer"),
            ("SoftmaxWithLossLayer", "SoftmaxWithLossLayer"),
            ("CRFLossLayer", "CrfLossLayer"),
            ("AccuracyLayer", "AccuracyLayer"),
            ("InputLayer", "InputLayer"),
        ];
        for (kind, implementation) in kinds {
            let op = build(&OperatorSpec::new("l", kind), &CapabilityProbe::accelerated());
            assert_eq!(op.implementation(), implementation);
            assert_eq!(op.type_name(), kind);
            assert_eq!(op.engine(), Engine::Native);
        }
    }

    #[test]
    fn test_engine_preference_is_ignored() {
        let spec = OperatorSpec::new("drop1", DROPOUT).with_engine("no-such-engine");
        let op = build(&spec, &CapabilityProbe::native_only());
        assert_eq!(op.implementation(), "DropoutLayer");
    }
}
