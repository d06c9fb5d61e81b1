//! Embedded CPython via PyO3.
//!
//! The callable receives the spec as a JSON string and returns the layer
//! object. Errors are printed through the interpreter so the traceback is
//! visible, then surfaced as [`ForeignError::Raised`].

use pyo3::prelude::*;

use super::{ForeignError, ScriptRuntime};
use crate::accel::Engine;
use crate::operator::Operator;
use crate::spec::OperatorSpec;

#[derive(Debug, Default)]
pub struct PythonRuntime;

impl PythonRuntime {
    pub fn new() -> Self {
        Self
    }
}

impl ScriptRuntime for PythonRuntime {
    fn name(&self) -> &str {
        "python"
    }

    fn initialize(&self) -> Result<(), ForeignError> {
        pyo3::prepare_freethreaded_python();
        Ok(())
    }

    fn instantiate(
        &self,
        module: &str,
        symbol: &str,
        spec: &OperatorSpec,
    ) -> Result<Box<dyn Operator>, ForeignError> {
        let payload = serde_json::to_string(spec)?;

        Python::with_gil(|py| {
            let object = py
                .import_bound(module)
                .and_then(|m| m.getattr(symbol))
                .and_then(|ctor| ctor.call1((payload,)))
                .map_err(|err| {
                    err.print(py);
                    ForeignError::Raised {
                        module: module.to_string(),
                        symbol: symbol.to_string(),
                        message: err.to_string(),
                    }
                })?;

            Ok(Box::new(PythonLayer {
                spec: spec.clone(),
                object: object.unbind(),
            }) as Box<dyn Operator>)
        })
    }
}

/// A layer object living in the interpreter.
#[derive(Debug)]
pub struct PythonLayer {
    spec: OperatorSpec,
    object: Py<PyAny>,
}

impl PythonLayer {
    /// The Python object backing this layer.
    pub fn object(&self) -> &Py<PyAny> {
        &self.object
    }
}

impl Operator for PythonLayer {
    fn spec(&self) -> &OperatorSpec {
        &self.spec
    }

    fn implementation(&self) -> &'static str {
        "PythonLayer"
    }

    fn engine(&self) -> Engine {
        Engine::Foreign
    }
}
