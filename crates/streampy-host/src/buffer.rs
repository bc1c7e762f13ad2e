//! Byte buffers used for record transport.
//!
//! The host moves records between processes in network byte order and
//! within a process in native byte order. Both are the same buffer type
//! with a different [`ByteOrder`].

use crate::error::{HostError, HostResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ByteOrder {
    Native,
    Network,
}

#[derive(Debug, Clone)]
pub struct ByteBuffer {
    order: ByteOrder,
    data: Vec<u8>,
    cursor: usize,
}

impl ByteBuffer {
    pub fn new(order: ByteOrder) -> Self {
        Self {
            order,
            data: Vec::new(),
            cursor: 0,
        }
    }

    pub fn native() -> Self {
        Self::new(ByteOrder::Native)
    }

    pub fn network() -> Self {
        Self::new(ByteOrder::Network)
    }

    /// Wrap existing bytes for reading.
    pub fn from_bytes(order: ByteOrder, data: Vec<u8>) -> Self {
        Self {
            order,
            data,
            cursor: 0,
        }
    }

    pub fn order(&self) -> ByteOrder {
        self.order
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.cursor
    }

    pub fn put_u32(&mut self, value: u32) {
        let bytes = match self.order {
            ByteOrder::Native => value.to_ne_bytes(),
            ByteOrder::Network => value.to_be_bytes(),
        };
        self.data.extend_from_slice(&bytes);
    }

    /// Length-prefixed byte run.
    pub fn put_bytes(&mut self, bytes: &[u8]) {
        self.put_u32(bytes.len() as u32);
        self.data.extend_from_slice(bytes);
    }

    pub fn put_str(&mut self, text: &str) {
        self.put_bytes(text.as_bytes());
    }

    pub fn get_u32(&mut self) -> HostResult<u32> {
        let raw = self.take(4)?;
        let bytes = [raw[0], raw[1], raw[2], raw[3]];
        Ok(match self.order {
            ByteOrder::Native => u32::from_ne_bytes(bytes),
            ByteOrder::Network => u32::from_be_bytes(bytes),
        })
    }

    pub fn get_bytes(&mut self) -> HostResult<Vec<u8>> {
        let len = self.get_u32()? as usize;
        Ok(self.take(len)?.to_vec())
    }

    pub fn get_string(&mut self) -> HostResult<String> {
        String::from_utf8(self.get_bytes()?).map_err(|_| HostError::InvalidName)
    }

    fn take(&mut self, len: usize) -> HostResult<&[u8]> {
        if self.remaining() < len {
            return Err(HostError::Underrun {
                needed: len,
                remaining: self.remaining(),
            });
        }
        let start = self.cursor;
        self.cursor += len;
        Ok(&self.data[start..self.cursor])
    }
}
