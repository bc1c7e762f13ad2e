//! Interpreter bring-up and diagnostics.
//!
//! [`bootstrap`] is called once per process by the operator start-up path:
//! it optionally preloads the interpreter's shared library with global
//! symbol visibility, starts the interpreter (once), and runs a setup script
//! in `__main__`.
//!
//! CPython buffers `sys.stderr` when it is not attached to a terminal, which
//! is the normal case for a stream operator. Anything printed before a fatal
//! error is lost unless flushed, so every failure path goes through
//! [`report`].

use std::path::Path;
use std::sync::{Mutex, PoisonError};

use pyo3::prelude::*;

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeErrorKind, BridgeResult};
use crate::lock::ExecutionLock;

/// Libraries opened by [`bootstrap_with`]; never closed.
#[cfg(unix)]
static PRELOADED: Mutex<Vec<libloading::os::unix::Library>> = Mutex::new(Vec::new());

pub fn is_initialized() -> bool {
    unsafe { pyo3::ffi::Py_IsInitialized() != 0 }
}

/// Bootstrap using configuration from the environment.
pub fn bootstrap(setup_script: impl AsRef<Path>) -> BridgeResult<()> {
    bootstrap_with(&BridgeConfig::from_env(), setup_script.as_ref())
}

pub fn bootstrap_with(config: &BridgeConfig, setup_script: &Path) -> BridgeResult<()> {
    if let Some(library) = &config.python_library {
        preload_symbols(library)?;
    }
    initialize();
    run_setup_script(setup_script)
}

/// Start the interpreter unless it is already running. The execution lock
/// is released afterwards so any thread can take it.
fn initialize() {
    if is_initialized() {
        tracing::debug!("Interpreter already initialized");
        return;
    }
    pyo3::prepare_freethreaded_python();
    tracing::info!("Interpreter initialized");
}

/// Reopen the interpreter library with `RTLD_GLOBAL` so extension modules
/// loaded later can resolve its symbols when the interpreter itself lives
/// inside another shared object.
#[cfg(unix)]
fn preload_symbols(library: &str) -> BridgeResult<()> {
    use libloading::os::unix::{Library, RTLD_GLOBAL, RTLD_LAZY};

    let handle = unsafe { Library::open(Some(library), RTLD_LAZY | RTLD_GLOBAL) }.map_err(|e| {
        tracing::error!(library, error = %e, "Fatal error: could not open interpreter library");
        BridgeError::symbol_preload(library, e)
    })?;
    PRELOADED
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(handle);
    tracing::debug!(library, "Preloaded interpreter library");
    Ok(())
}

#[cfg(not(unix))]
fn preload_symbols(library: &str) -> BridgeResult<()> {
    tracing::debug!(library, "Symbol preloading is only needed on unix; skipped");
    Ok(())
}

fn run_setup_script(path: &Path) -> BridgeResult<()> {
    let source = std::fs::read_to_string(path).map_err(|e| {
        tracing::error!(path = %path.display(), error = %e, "Setup script not found");
        BridgeErrorKind::SetupScriptMissing {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    ExecutionLock::with(|py| {
        exec_in_main(py, path, &source).map_err(|err| {
            tracing::error!(path = %path.display(), "Setup script failed");
            let message = report(py, &err);
            BridgeErrorKind::SetupScriptFailed {
                path: path.to_path_buf(),
                message,
            }
            .into()
        })
    })?;
    tracing::info!(path = %path.display(), "Setup script completed");
    Ok(())
}

/// Run `source` in `__main__` with `__file__` set for the duration.
fn exec_in_main(py: Python<'_>, path: &Path, source: &str) -> PyResult<()> {
    let globals = py.import_bound("__main__")?.dict();
    let file_name = path.to_string_lossy();
    globals.set_item("__file__", file_name.as_ref())?;

    let builtins = py.import_bound("builtins")?;
    let result = builtins
        .getattr("compile")?
        .call1((source, file_name.as_ref(), "exec"))
        .and_then(|code| builtins.getattr("exec")?.call1((code, &globals)))
        .map(drop);

    if globals.contains("__file__")? {
        globals.del_item("__file__")?;
    }
    result
}

/// Print `err` with its traceback, flush, and return a one-line summary.
pub fn report(py: Python<'_>, err: &PyErr) -> String {
    let summary = err.to_string();
    err.print(py);
    flush_streams(py);
    summary
}

fn flush_streams(py: Python<'_>) {
    for stream in ["stderr", "stdout"] {
        let flushed = py
            .import_bound("sys")
            .and_then(|sys| sys.getattr(stream))
            .and_then(|s| s.call_method0("flush"));
        if let Err(e) = flushed {
            tracing::warn!(stream, error = %e, "Could not flush interpreter stream");
        }
    }
}

/// `repr()` of an object, for trace output.
pub fn describe(obj: &Bound<'_, PyAny>) -> String {
    match obj.repr() {
        Ok(repr) => repr.to_string(),
        Err(_) => "<unrepresentable object>".to_string(),
    }
}
