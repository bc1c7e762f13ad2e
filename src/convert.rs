//! Conversion between host attributes and Python objects.
//!
//! Both directions allocate or inspect Python objects, so both take a
//! [`Python`] token: the caller must hold the execution lock.
//!
//! | Host       | Python  |
//! |------------|---------|
//! | [`Blob`]   | `bytes` |
//! | [`RString`]| `str`   |

use pyo3::prelude::*;
use pyo3::types::{PyBytes, PyString};
use streampy_host::{Blob, RString, Value};

pub trait PyAttribute {
    /// Build a new Python object holding a copy of this attribute.
    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>>;

    /// Replace this attribute's contents with the value of `obj`.
    fn assign_from_py(&mut self, obj: &Bound<'_, PyAny>) -> PyResult<()>;
}

impl PyAttribute for Blob {
    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        Ok(PyBytes::new_bound(py, self.data()).into_any())
    }

    fn assign_from_py(&mut self, obj: &Bound<'_, PyAny>) -> PyResult<()> {
        let bytes = obj.downcast::<PyBytes>()?;
        self.set_data(bytes.as_bytes());
        Ok(())
    }
}

impl PyAttribute for RString {
    /// Fails with `UnicodeDecodeError` if the host bytes are not UTF-8.
    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        match std::str::from_utf8(self.as_bytes()) {
            Ok(text) => Ok(PyString::new_bound(py, text).into_any()),
            Err(_) => decode_utf8(py, self.as_bytes()),
        }
    }

    fn assign_from_py(&mut self, obj: &Bound<'_, PyAny>) -> PyResult<()> {
        let text = obj.downcast::<PyString>()?;
        self.assign(&text.to_cow()?);
        Ok(())
    }
}

impl PyAttribute for Value {
    fn to_py<'py>(&self, py: Python<'py>) -> PyResult<Bound<'py, PyAny>> {
        match self {
            Value::Blob(blob) => blob.to_py(py),
            Value::RString(text) => text.to_py(py),
        }
    }

    /// Keeps the attribute's current kind.
    fn assign_from_py(&mut self, obj: &Bound<'_, PyAny>) -> PyResult<()> {
        match self {
            Value::Blob(blob) => blob.assign_from_py(obj),
            Value::RString(text) => text.assign_from_py(obj),
        }
    }
}

/// Let the interpreter's decoder raise, so the error carries its usual
/// position and reason.
fn decode_utf8<'py>(py: Python<'py>, bytes: &[u8]) -> PyResult<Bound<'py, PyAny>> {
    PyBytes::new_bound(py, bytes).call_method1("decode", ("utf-8",))
}
