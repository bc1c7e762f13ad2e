//! Error types for host record transport

use derive_more::Display;

pub type HostResult<T> = Result<T, HostError>;

#[derive(Display, Debug, Clone, PartialEq, Eq)]
pub enum HostError {
    #[display("Buffer underrun: needed {needed} bytes, {remaining} remaining")]
    Underrun { needed: usize, remaining: usize },

    #[display("Unknown attribute tag: {_0}")]
    UnknownAttributeTag(u32),

    #[display("No payload factory registered for key `{_0}`")]
    UnknownPayload(String),

    #[display("Attribute name is not valid UTF-8")]
    InvalidName,
}

impl std::error::Error for HostError {}
