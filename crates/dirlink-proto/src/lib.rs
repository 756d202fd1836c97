//! Value types for directory extended operations.
//!
//! An extended operation is a request type the core protocol does not define.
//! It is identified by an object identifier ([`Oid`]) and carries an optional
//! opaque value. Servers answer with an [`ExtendedResult`] that holds a
//! [`ResultCode`], diagnostics, and an optional response OID and value.
//!
//! The encoding of these values on the wire is handled elsewhere; this crate
//! only fixes their shape and validation rules so that clients, servers, and
//! test harnesses agree on them.
#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod errors;
pub mod oid;
pub mod request;
pub mod result;

pub use errors::{ProtocolError, Result};
pub use oid::{Oid, well_known};
pub use request::{ExtendedRequest, MessageId};
pub use result::{ExtendedResult, ResultCode};
