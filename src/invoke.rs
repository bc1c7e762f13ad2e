//! Calling a loaded callable with one record attribute.
//!
//! All four adapters share one convention: the attribute is converted,
//! wrapped as the only element of an argument tuple, and passed to the
//! callable. The execution lock is held from conversion until the result
//! has been interpreted and released, so each call is atomic with respect
//! to other threads using the interpreter.
//!
//! Any failure is fatal for the operator: the traceback is printed and the
//! interpreter's streams flushed before the error is returned.

use pyo3::prelude::*;
use pyo3::exceptions::PyTypeError;
use pyo3::types::{PyLong, PyTuple};

use crate::convert::PyAttribute;
use crate::error::{BridgeError, BridgeErrorKind, BridgeResult};
use crate::loader::Callable;
use crate::lock::ExecutionLock;
use crate::runtime::{describe, report};

/// Call `callable` with `attr` and discard the result.
pub fn sink<A>(callable: &Callable, attr: &A) -> BridgeResult<()>
where
    A: PyAttribute + ?Sized,
{
    ExecutionLock::with(|py| {
        call_with(py, callable, attr)?;
        Ok(())
    })
}

/// Call `callable` with `attr` and report whether the result is truthy.
pub fn filter<A>(callable: &Callable, attr: &A) -> BridgeResult<bool>
where
    A: PyAttribute + ?Sized,
{
    ExecutionLock::with(|py| {
        let result = call_with(py, callable, attr)?;
        result
            .is_truthy()
            .map_err(|err| BridgeError::invocation(callable.function_name(), report(py, &err)))
    })
}

/// Call `callable` with `attr` and store the result in `out`.
///
/// Returns `false`, leaving `out` untouched, when the callable returns
/// `None`.
pub fn transform<A, R>(callable: &Callable, attr: &A, out: &mut R) -> BridgeResult<bool>
where
    A: PyAttribute + ?Sized,
    R: PyAttribute + ?Sized,
{
    ExecutionLock::with(|py| {
        let result = call_with(py, callable, attr)?;
        if result.is_none() {
            return Ok(false);
        }
        if tracing::enabled!(tracing::Level::TRACE) {
            tracing::trace!(function = callable.function_name(), result = %describe(&result), "Transform result");
        }
        out.assign_from_py(&result)
            .map_err(|err| BridgeError::conversion(callable.function_name(), report(py, &err)))?;
        Ok(true)
    })
}

/// Call `callable` with `attr` and interpret the result as a hash code.
///
/// Any `int` is accepted, however wide; its low 32 bits, read as two's
/// complement, are the hash.
pub fn hash<A>(callable: &Callable, attr: &A) -> BridgeResult<i32>
where
    A: PyAttribute + ?Sized,
{
    ExecutionLock::with(|py| {
        let result = call_with(py, callable, attr)?;
        low_32_bits(&result).map_err(|err| -> BridgeError {
            tracing::error!(
                function = callable.function_name(),
                result = %describe(&result),
                "Fatal error: hash function did not return an integer"
            );
            BridgeErrorKind::NotAnInteger {
                function: callable.function_name().to_string(),
                message: report(py, &err),
            }
            .into()
        })
    })
}

/// Mask an `int` down to its low 32 bits in Python so no width overflows.
fn low_32_bits(result: &Bound<'_, PyAny>) -> PyResult<i32> {
    if !result.is_instance_of::<PyLong>() {
        let type_name = result.get_type().name()?;
        return Err(PyTypeError::new_err(format!(
            "hash result must be an int, not {type_name}"
        )));
    }
    let masked = result.call_method1("__and__", (0xFFFF_FFFFu32,))?;
    Ok(masked.extract::<u32>()? as i32)
}

/// Convert `attr`, call `callable` with it as the single positional
/// argument, and return the result. Caller holds the lock.
fn call_with<'py, A>(py: Python<'py>, callable: &Callable, attr: &A) -> BridgeResult<Bound<'py, PyAny>>
where
    A: PyAttribute + ?Sized,
{
    let arg = attr.to_py(py).map_err(|err| {
        tracing::error!(function = callable.function_name(), "Fatal error: argument conversion failed");
        BridgeError::conversion(callable.function_name(), report(py, &err))
    })?;
    let args = PyTuple::new_bound(py, [arg]);
    callable.bind(py).call1(args).map_err(|err| {
        tracing::error!(
            module = callable.module_name(),
            function = callable.function_name(),
            "Fatal error: call failed"
        );
        BridgeError::invocation(callable.function_name(), report(py, &err))
    })
}
