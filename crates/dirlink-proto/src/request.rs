//! Extended request values.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::oid::Oid;

/// Identifier the client assigns to each request on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct MessageId(u32);

impl MessageId {
    /// Wrap a raw message identifier.
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// The raw identifier.
    pub const fn as_u32(self) -> u32 {
        self.0
    }
}

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// An extended request: the operation OID plus an optional encoded value.
///
/// The value is opaque here; each operation defines its own encoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtendedRequest {
    /// OID naming the requested operation.
    pub oid: Oid,

    /// Operation-specific request value, if any.
    pub value: Option<Vec<u8>>,
}

impl ExtendedRequest {
    /// Create a request with no value.
    pub fn new(oid: Oid) -> Self {
        Self { oid, value: None }
    }

    /// Attach an encoded request value.
    #[must_use]
    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.value = Some(value.into());
        self
    }
}
