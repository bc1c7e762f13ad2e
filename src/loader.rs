//! Resolving Python callables by module and attribute name.

use std::fmt;

use pyo3::prelude::*;

use crate::error::{BridgeErrorKind, BridgeResult};
use crate::lock::ExecutionLock;
use crate::runtime::report;

/// A callable resolved once at operator construction and reused for every
/// record afterwards. Shared freely between threads; each invocation takes
/// the execution lock on its own.
pub struct Callable {
    module: String,
    function: String,
    object: Py<PyAny>,
}

impl Callable {
    /// Import `module`, fetch `function` from it and check it is callable.
    pub fn load(module: &str, function: &str) -> BridgeResult<Self> {
        ExecutionLock::with(|py| {
            let imported = import_module(py, module)?;
            let object = match imported.getattr(function) {
                Ok(object) => object,
                Err(err) => {
                    tracing::error!(module, function, "Fatal error: function not found");
                    return Err(BridgeErrorKind::FunctionMissing {
                        module: module.to_string(),
                        function: function.to_string(),
                        message: report(py, &err),
                    }
                    .into());
                }
            };
            if !object.is_callable() {
                tracing::error!(module, function, "Fatal error: function not callable");
                return Err(BridgeErrorKind::NotCallable {
                    module: module.to_string(),
                    function: function.to_string(),
                }
                .into());
            }
            tracing::info!(module, function, "Callable function");
            Ok(Callable {
                module: module.to_string(),
                function: function.to_string(),
                object: object.unbind(),
            })
        })
    }

    pub fn module_name(&self) -> &str {
        &self.module
    }

    pub fn function_name(&self) -> &str {
        &self.function
    }

    pub fn bind<'py>(&self, py: Python<'py>) -> &Bound<'py, PyAny> {
        self.object.bind(py)
    }
}

impl fmt::Debug for Callable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({}.{})", self.module, self.function)
    }
}

/// Shorthand for [`Callable::load`].
pub fn load(module: &str, function: &str) -> BridgeResult<Callable> {
    Callable::load(module, function)
}

fn import_module<'py>(py: Python<'py>, module: &str) -> BridgeResult<Bound<'py, PyModule>> {
    match py.import_bound(module) {
        Ok(imported) => {
            tracing::info!(module, "Imported module");
            Ok(imported)
        }
        Err(err) => {
            tracing::error!(module, "Fatal error: missing module");
            Err(BridgeErrorKind::ModuleImport {
                module: module.to_string(),
                message: report(py, &err),
            }
            .into())
        }
    }
}
