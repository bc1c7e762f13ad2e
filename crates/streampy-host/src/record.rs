//! Host records.

use crate::attribute::{Blob, RString, Value};
use crate::buffer::ByteBuffer;
use crate::error::{HostError, HostResult};
use crate::payload::{PayloadContainer, PayloadRegistry};

/// A value-semantics record: named attributes plus optional payload slots.
#[derive(Clone, Debug, Default)]
pub struct Record {
    attributes: Vec<(String, Value)>,
    payloads: Option<PayloadContainer>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style attribute setter.
    pub fn with_attribute(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&mut self, name: &str, value: impl Into<Value>) {
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| key == name) {
            Some((_, slot)) => *slot = value,
            None => self.attributes.push((name.to_string(), value)),
        }
    }

    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn payload_container(&self) -> Option<&PayloadContainer> {
        self.payloads.as_ref()
    }

    /// The payload container, created on first use.
    pub fn payload_container_or_default(&mut self) -> &mut PayloadContainer {
        self.payloads.get_or_insert_with(PayloadContainer::new)
    }

    pub fn serialize(&self, buf: &mut ByteBuffer) {
        buf.put_u32(self.attributes.len() as u32);
        for (name, value) in &self.attributes {
            buf.put_str(name);
            buf.put_u32(value.tag());
            buf.put_bytes(value.as_bytes());
        }
        match &self.payloads {
            Some(container) => {
                buf.put_u32(1);
                container.serialize(buf);
            }
            None => buf.put_u32(0),
        }
    }

    pub fn deserialize(buf: &mut ByteBuffer, registry: &PayloadRegistry) -> HostResult<Self> {
        let count = buf.get_u32()?;
        let mut record = Record::new();
        for _ in 0..count {
            let name = buf.get_string()?;
            let value = match buf.get_u32()? {
                Value::TAG_BLOB => Value::Blob(Blob::from(buf.get_bytes()?)),
                Value::TAG_RSTRING => Value::RString(RString::from_bytes(buf.get_bytes()?)),
                tag => return Err(HostError::UnknownAttributeTag(tag)),
            };
            record.attributes.push((name, value));
        }
        if buf.get_u32()? != 0 {
            record.payloads = Some(PayloadContainer::deserialize(buf, registry)?);
        }
        Ok(record)
    }
}
