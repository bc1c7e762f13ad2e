//! Bridge between stream records and callables running in an embedded
//! CPython interpreter.
//!
//! - [`lock`]: scoped access to the interpreter's global execution lock
//! - [`runtime`]: one-time interpreter bring-up and diagnostics
//! - [`convert`]: blob/string attributes to and from Python objects
//! - [`loader`]: resolving a callable by module and name
//! - [`invoke`]: sink, filter, transform and hash call patterns
//! - [`pyref`]: carrying a Python object on a record through copies

pub mod config;
pub mod convert;
pub mod error;
pub mod invoke;
pub mod loader;
pub mod lock;
pub mod pyref;
pub mod runtime;

pub use config::BridgeConfig;
pub use convert::PyAttribute;
pub use error::{BridgeError, BridgeErrorKind, BridgeResult, ErrorCategory};
pub use invoke::{filter, hash, sink, transform};
pub use loader::{Callable, load};
pub use lock::ExecutionLock;
pub use pyref::{PYREF_KEY, PyRefPayload, SlotState, attach, lookup, slot_state};
pub use runtime::{bootstrap, bootstrap_with};

pub use streampy_host as host;
