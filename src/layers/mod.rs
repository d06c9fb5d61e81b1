//! Concrete operator implementations.
//!
//! - [`native`]: reference implementations, one per operator kind
//! - [`accelerated`]: vendor-engine implementations for the kinds that have one
//!
//! Kernels are supplied by the execution engine; these types carry the spec
//! and their identity so the graph can bind them.

/// Declare an operator implementation that owns a copy of its spec.
macro_rules! layer {
    ($(#[$meta:meta])* $name:ident, $engine:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone)]
        pub struct $name {
            spec: $crate::spec::OperatorSpec,
        }

        impl $crate::operator::FromSpec for $name {
            fn from_spec(spec: &$crate::spec::OperatorSpec) -> Self {
                Self { spec: spec.clone() }
            }
        }

        impl $crate::operator::Operator for $name {
            fn spec(&self) -> &$crate::spec::OperatorSpec {
                &self.spec
            }

            fn implementation(&self) -> &'static str {
                stringify!($name)
            }

            fn engine(&self) -> $crate::accel::Engine {
                $engine
            }
        }
    };
}

pub mod accelerated;
pub mod native;
