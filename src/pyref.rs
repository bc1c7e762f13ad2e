//! Carrying a Python object on a host record without converting it.
//!
//! The object lives in the record's payload container under
//! [`PYREF_KEY`]. The host clones, transports and drops records on its own
//! schedule, so [`PyRefPayload`] maps each of those events onto reference
//! counting:
//!
//! * clone: the copy takes one more reference on the same object;
//! * drop: the entry's reference is released;
//! * serialize: nothing is written;
//! * deserialize: the entry ends up empty, releasing any reference it held,
//!   because a reference cannot be rebuilt from bytes.
//!
//! Clone, deserialize and drop are invoked by the host outside any lock and
//! therefore take the execution lock themselves. [`attach`] and [`lookup`]
//! are called by operator code that already holds it.

use std::any::Any;

use pyo3::prelude::*;
use streampy_host::{ByteBuffer, HostResult, Payload, PayloadRegistry, Record};

use crate::lock::ExecutionLock;

/// Payload key reserved for the attached object.
pub const PYREF_KEY: &str = "pyref";

/// Payload entry owning one reference to a Python object, or none.
#[derive(Default)]
pub struct PyRefPayload {
    object: Option<Py<PyAny>>,
}

impl PyRefPayload {
    /// Take ownership of `object`'s reference.
    pub fn new(object: Py<PyAny>) -> Self {
        Self {
            object: Some(object),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.object.is_none()
    }

    /// A new reference to the held object, owned by the caller.
    pub fn reference(&self, py: Python<'_>) -> Option<Py<PyAny>> {
        self.object.as_ref().map(|object| object.clone_ref(py))
    }

    /// Release the held reference under a lock the caller already holds.
    fn release(&mut self, _py: Python<'_>) {
        // Dropping while the lock is held decrements immediately.
        self.object = None;
    }

    fn release_locked(&mut self) {
        if let Some(object) = self.object.take() {
            ExecutionLock::held(move |_py| drop(object));
        }
    }
}

impl Payload for PyRefPayload {
    fn clone_payload(&self) -> Box<dyn Payload> {
        let object = self
            .object
            .as_ref()
            .map(|object| ExecutionLock::held(|py| object.clone_ref(py)));
        Box::new(PyRefPayload { object })
    }

    fn serialize(&self, _buf: &mut ByteBuffer) {}

    fn deserialize(&mut self, _buf: &mut ByteBuffer) -> HostResult<()> {
        self.release_locked();
        Ok(())
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Drop for PyRefPayload {
    fn drop(&mut self) {
        self.release_locked();
    }
}

/// What a record's attachment slot currently holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlotState {
    /// No entry under [`PYREF_KEY`].
    Absent,
    /// An entry exists but holds no object, e.g. after transport.
    Empty,
    Attached,
}

/// Attach `object` to `record`, consuming the caller's reference.
///
/// An existing attachment is released first.
pub fn attach(py: Python<'_>, record: &mut Record, object: Py<PyAny>) {
    let container = record.payload_container_or_default();
    let displaced = container.add(PYREF_KEY, Box::new(PyRefPayload::new(object)));
    if let Some(mut previous) = displaced {
        if let Some(previous) = previous.as_any_mut().downcast_mut::<PyRefPayload>() {
            previous.release(py);
        }
    }
}

/// A new reference to the object attached to `record`, if any.
pub fn lookup(py: Python<'_>, record: &Record) -> Option<Py<PyAny>> {
    record
        .payload_container()?
        .find(PYREF_KEY)?
        .as_any()
        .downcast_ref::<PyRefPayload>()?
        .reference(py)
}

/// Inspect the slot without touching reference counts; no lock needed.
pub fn slot_state(record: &Record) -> SlotState {
    let entry = record
        .payload_container()
        .and_then(|container| container.find(PYREF_KEY))
        .and_then(|payload| payload.as_any().downcast_ref::<PyRefPayload>());
    match entry {
        None => SlotState::Absent,
        Some(entry) if entry.is_empty() => SlotState::Empty,
        Some(_) => SlotState::Attached,
    }
}

/// Register the attachment payload so transported records can be read back.
pub fn register(registry: &mut PayloadRegistry) {
    registry.register(PYREF_KEY, empty_payload);
}

fn empty_payload() -> Box<dyn Payload> {
    Box::new(PyRefPayload::default())
}

/// A registry that knows the attachment payload.
pub fn payload_registry() -> PayloadRegistry {
    let mut registry = PayloadRegistry::new();
    register(&mut registry);
    registry
}
