//! The contract every concrete operator implementation satisfies.

use std::fmt;

use serde::Serialize;

use crate::accel::Engine;
use crate::spec::OperatorSpec;

/// A constructed operator, ready to be wired into a graph.
///
/// Numeric execution belongs to the graph engine; what the factory guarantees
/// is identity: which operator kind this is, which implementation was chosen
/// and on which engine it runs.
pub trait Operator: fmt::Debug + Send {
    /// The spec this instance was built from.
    fn spec(&self) -> &OperatorSpec;

    /// Name of the concrete implementation, e.g. `ConvolutionLayer`.
    fn implementation(&self) -> &'static str;

    fn engine(&self) -> Engine;

    fn name(&self) -> &str {
        &self.spec().name
    }

    fn type_name(&self) -> &str {
        &self.spec().type_name
    }

    fn summary(&self) -> OperatorSummary {
        OperatorSummary {
            name: self.name().to_string(),
            type_name: self.type_name().to_string(),
            implementation: self.implementation(),
            engine: self.engine(),
        }
    }
}

/// Construct-from-spec, implemented by every built-in operator.
pub trait FromSpec: Operator + Sized + 'static {
    fn from_spec(spec: &OperatorSpec) -> Self;

    fn boxed(spec: &OperatorSpec) -> Box<dyn Operator> {
        Box::new(Self::from_spec(spec))
    }
}

/// Serializable description of a resolved operator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorSummary {
    pub name: String,
    #[serde(rename = "type")]
    pub type_name: String,
    pub implementation: &'static str,
    pub engine: Engine,
}
