//! Extended operation support for in-memory and simulated directory servers.
//!
//! A server that only implements the core protocol can still answer custom
//! operations by consulting an [`ExtendedOperationHandler`]. Handlers declare
//! the OIDs they answer; the [`ExtendedOperationRegistry`] routes each
//! incoming [`ExtendedRequest`](dirlink_proto::ExtendedRequest) to the handler
//! registered for its OID.
//!
//! [`CannedResponseHandler`] answers every request with one fixed result,
//! which lets tests simulate server behaviour (including failures)
//! deterministically.

pub mod canned;
pub mod error;
pub mod handler;
pub mod registry;

pub use canned::CannedResponseHandler;
pub use error::RegistryError;
pub use handler::{ExtendedOperationHandler, RequestContext};
pub use registry::ExtendedOperationRegistry;
