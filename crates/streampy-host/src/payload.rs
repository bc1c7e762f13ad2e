//! Extensible per-record payload slots.
//!
//! A payload is an opaque value riding along with a record. The host clones,
//! serializes, deserializes and drops payloads whenever it does the same to
//! the owning record, so every [`Payload`] implementation decides what each
//! of those events means for the value it holds.

use std::any::Any;
use std::collections::HashMap;
use std::fmt;

use crate::buffer::ByteBuffer;
use crate::error::{HostError, HostResult};

pub trait Payload: Any + Send + Sync {
    /// Produce an independent copy for a cloned record.
    fn clone_payload(&self) -> Box<dyn Payload>;

    fn serialize(&self, buf: &mut ByteBuffer);

    /// Restore state from bytes written by [`Payload::serialize`].
    fn deserialize(&mut self, buf: &mut ByteBuffer) -> HostResult<()>;

    fn as_any(&self) -> &dyn Any;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

/// Named payload entries of one record.
#[derive(Default)]
pub struct PayloadContainer {
    entries: Vec<(String, Box<dyn Payload>)>,
}

impl PayloadContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `payload` under `name`, returning the entry it displaced.
    pub fn add(&mut self, name: &str, payload: Box<dyn Payload>) -> Option<Box<dyn Payload>> {
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => Some(std::mem::replace(slot, payload)),
            None => {
                self.entries.push((name.to_string(), payload));
                None
            }
        }
    }

    pub fn find(&self, name: &str) -> Option<&dyn Payload> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, payload)| payload.as_ref())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub(crate) fn serialize(&self, buf: &mut ByteBuffer) {
        buf.put_u32(self.entries.len() as u32);
        for (name, payload) in &self.entries {
            let mut inner = ByteBuffer::new(buf.order());
            payload.serialize(&mut inner);
            buf.put_str(name);
            buf.put_bytes(inner.as_bytes());
        }
    }

    pub(crate) fn deserialize(buf: &mut ByteBuffer, registry: &PayloadRegistry) -> HostResult<Self> {
        let count = buf.get_u32()?;
        let mut container = Self::new();
        for _ in 0..count {
            let name = buf.get_string()?;
            let mut inner = ByteBuffer::from_bytes(buf.order(), buf.get_bytes()?);
            let mut payload = registry.create(&name)?;
            payload.deserialize(&mut inner)?;
            container.add(&name, payload);
        }
        Ok(container)
    }
}

impl Clone for PayloadContainer {
    fn clone(&self) -> Self {
        Self {
            entries: self
                .entries
                .iter()
                .map(|(name, payload)| (name.clone(), payload.clone_payload()))
                .collect(),
        }
    }
}

impl fmt::Debug for PayloadContainer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

type PayloadFactory = fn() -> Box<dyn Payload>;

/// Factories used to rebuild payload entries when a record is read back.
#[derive(Default, Clone)]
pub struct PayloadRegistry {
    factories: HashMap<String, PayloadFactory>,
}

impl PayloadRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &str, factory: PayloadFactory) {
        self.factories.insert(name.to_string(), factory);
    }

    pub fn create(&self, name: &str) -> HostResult<Box<dyn Payload>> {
        self.factories
            .get(name)
            .map(|factory| factory())
            .ok_or_else(|| HostError::UnknownPayload(name.to_string()))
    }
}
