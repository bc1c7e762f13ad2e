//! Host record model for the streampy bridge.
//!
//! Records are plain values: cloning a record clones every attribute and
//! asks each payload entry to clone itself. Records can be written to a
//! [`ByteBuffer`] in native or network byte order and read back; payload
//! entries are rehydrated through a [`PayloadRegistry`].

pub mod attribute;
pub mod buffer;
pub mod error;
pub mod payload;
pub mod record;

pub use attribute::{Blob, RString, Value};
pub use buffer::{ByteBuffer, ByteOrder};
pub use error::{HostError, HostResult};
pub use payload::{Payload, PayloadContainer, PayloadRegistry};
pub use record::Record;
