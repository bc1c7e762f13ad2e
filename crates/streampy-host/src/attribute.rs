//! Attribute kinds carried by host records.
//!
//! Only two kinds exist: an opaque byte [`Blob`] and an [`RString`], a byte
//! string that is expected, but not guaranteed, to hold UTF-8.

use std::fmt;

/// Opaque binary attribute.
#[derive(Clone, Default, PartialEq, Eq, Hash)]
pub struct Blob {
    data: Vec<u8>,
}

impl Blob {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with a copy of `bytes`.
    pub fn set_data(&mut self, bytes: &[u8]) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl From<Vec<u8>> for Blob {
    fn from(data: Vec<u8>) -> Self {
        Self { data }
    }
}

impl From<&[u8]> for Blob {
    fn from(bytes: &[u8]) -> Self {
        Self {
            data: bytes.to_vec(),
        }
    }
}

impl fmt::Debug for Blob {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Blob({} bytes)", self.data.len())
    }
}

/// Byte string attribute.
///
/// The host does not validate encoding; decoding happens when the value is
/// handed to a consumer that needs text.
#[derive(Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RString {
    bytes: Vec<u8>,
}

impl RString {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: bytes.into(),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// The contents as text, if they are valid UTF-8.
    pub fn to_str(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }

    /// Replace the contents with the UTF-8 bytes of `text`.
    pub fn assign(&mut self, text: &str) {
        self.bytes.clear();
        self.bytes.extend_from_slice(text.as_bytes());
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl From<&str> for RString {
    fn from(text: &str) -> Self {
        Self::from_bytes(text.as_bytes())
    }
}

impl From<String> for RString {
    fn from(text: String) -> Self {
        Self::from_bytes(text.into_bytes())
    }
}

impl fmt::Debug for RString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", String::from_utf8_lossy(&self.bytes))
    }
}

impl fmt::Display for RString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.bytes))
    }
}

/// An attribute value stored on a [`crate::Record`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Value {
    Blob(Blob),
    RString(RString),
}

impl Value {
    pub(crate) const TAG_BLOB: u32 = 1;
    pub(crate) const TAG_RSTRING: u32 = 2;

    pub(crate) fn tag(&self) -> u32 {
        match self {
            Value::Blob(_) => Self::TAG_BLOB,
            Value::RString(_) => Self::TAG_RSTRING,
        }
    }

    /// Raw contents regardless of kind.
    pub fn as_bytes(&self) -> &[u8] {
        match self {
            Value::Blob(blob) => blob.data(),
            Value::RString(text) => text.as_bytes(),
        }
    }

    /// An empty value of the same kind.
    pub fn empty_like(&self) -> Value {
        match self {
            Value::Blob(_) => Value::Blob(Blob::new()),
            Value::RString(_) => Value::RString(RString::new()),
        }
    }

    pub fn as_rstring(&self) -> Option<&RString> {
        match self {
            Value::RString(text) => Some(text),
            Value::Blob(_) => None,
        }
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        Value::Blob(blob)
    }
}

impl From<RString> for Value {
    fn from(text: RString) -> Self {
        Value::RString(text)
    }
}
