//! Scoped access to the interpreter's global execution lock.
//!
//! Every touch of a Python object, including reference-count changes, must
//! happen inside [`ExecutionLock::with`]. The [`Python`] token passed to the
//! closure is the proof that the lock is held; functions elsewhere in the
//! crate that need the lock take that token instead of acquiring it again.
//!
//! Guards must not be nested on one thread. CPython's own primitive
//! tolerates nesting, so a nested acquisition is logged rather than refused.

use std::cell::Cell;

use pyo3::Python;

use crate::error::{BridgeErrorKind, BridgeResult};
use crate::runtime;

thread_local! {
    static DEPTH: Cell<u32> = const { Cell::new(0) };
}

/// Tracks lock depth for the current thread; restored on unwind too.
struct DepthGuard;

impl DepthGuard {
    fn enter() -> Self {
        let outer = DEPTH.with(|depth| {
            let current = depth.get();
            depth.set(current + 1);
            current
        });
        if outer > 0 {
            tracing::warn!(depth = outer + 1, "Nested execution lock acquisition");
        }
        DepthGuard
    }
}

impl Drop for DepthGuard {
    fn drop(&mut self) {
        DEPTH.with(|depth| depth.set(depth.get().saturating_sub(1)));
    }
}

pub struct ExecutionLock;

impl ExecutionLock {
    /// Block until this thread holds the lock, run `f`, then release.
    pub fn with<F, R>(f: F) -> BridgeResult<R>
    where
        F: for<'py> FnOnce(Python<'py>) -> BridgeResult<R>,
    {
        if !runtime::is_initialized() {
            return Err(BridgeErrorKind::NotInitialized.into());
        }
        Self::held(f)
    }

    /// Acquire without the initialization check. Only for paths that already
    /// own a Python object, which implies a running interpreter.
    pub(crate) fn held<F, R>(f: F) -> R
    where
        F: for<'py> FnOnce(Python<'py>) -> R,
    {
        Python::with_gil(|py| {
            let _depth = DepthGuard::enter();
            f(py)
        })
    }

    /// Whether the current thread is inside an [`ExecutionLock::with`] scope.
    pub fn is_held() -> bool {
        DEPTH.with(|depth| depth.get() > 0)
    }
}
