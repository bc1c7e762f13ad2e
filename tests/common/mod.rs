//! Common test utilities for bridge integration tests.

use std::path::PathBuf;
use std::sync::Once;

use pyo3::prelude::*;
use pyo3::types::PyList;
use streampy::{Callable, ExecutionLock};

/// Directory holding the Python modules used by the tests.
pub fn python_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("python")
}

/// Start the interpreter and put [`python_dir`] on `sys.path`.
#[allow(dead_code)]
pub fn init() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        streampy::bootstrap(python_dir().join("setup_bridge.py")).expect("bootstrap failed");
    });
}

#[allow(dead_code)]
pub fn load(function: &str) -> Callable {
    init();
    streampy::load("bridge_ops", function).expect("failed to load test callable")
}

/// A fresh object nobody else references.
#[allow(dead_code)]
pub fn new_object() -> Py<PyAny> {
    init();
    ExecutionLock::with(|py| Ok(PyList::empty_bound(py).into_any().unbind())).unwrap()
}

#[allow(dead_code)]
pub fn refcount(object: &Py<PyAny>) -> isize {
    ExecutionLock::with(|py| Ok(object.bind(py).get_refcnt())).unwrap()
}
