//! Pooling.
//!
//! The accelerated kernel produces a single output and assumes its result is
//! never modified in place, which breaks max-pooling index tracking when a
//! downstream layer does exactly that. Both cases use the native kernel.

use super::{downgrade, resolve_engine, DefaultBias, ResolveError};
use crate::accel::{CapabilityProbe, Engine};
use crate::layers::accelerated::AcceleratedPoolingLayer;
use crate::layers::native::PoolingLayer;
use crate::operator::{FromSpec, Operator};
use crate::registry::{Registry, RegistryError};
use crate::spec::{OperatorSpec, PoolMethod};

pub const POOLING: &str = "Pooling";

pub fn register(registry: &mut Registry) -> Result<(), RegistryError> {
    registry.register(POOLING, pooling)
}

pub fn pooling(
    spec: &OperatorSpec,
    probe: &CapabilityProbe,
) -> Result<Box<dyn Operator>, ResolveError> {
    let mut engine = resolve_engine(spec, probe, DefaultBias::Accelerated)?;

    if engine == Engine::Accelerated && spec.num_outputs > 1 && !probe.multi_output_pooling {
        engine = downgrade(spec, "accelerated pooling does not support multiple outputs");
    }
    if engine == Engine::Accelerated
        && spec.params.pooling.method == PoolMethod::Max
        && !probe.max_pooling_in_place
    {
        engine = downgrade(spec, "accelerated max pooling breaks index tracking");
    }

    match engine {
        Engine::Accelerated => Ok(AcceleratedPoolingLayer::boxed(spec)),
        _ => Ok(PoolingLayer::boxed(spec)),
    }
}
