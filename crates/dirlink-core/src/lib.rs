//! Directory connection acquisition.
//!
//! Produces ready-to-use connections to a directory server. A connection is
//! only handed to the caller after an ordered sequence of optional steps has
//! completed:
//!
//! ```text
//! ┌───────────┐   ┌──────────────┐   ┌──────────────┐   ┌──────────────┐
//! │ Transport │──>│ Authenticate │──>│ Post-connect │──>│ Health check │──> caller
//! └───────────┘   └──────────────┘   └──────────────┘   └──────────────┘
//!       │                │                  │                  │
//!       └────────────────┴──── close + ConnectError ───────────┘
//! ```
//!
//! The first failing step aborts the rest. If a connection was already open
//! it is closed before the error is returned, so callers never receive a
//! partially prepared connection.
//!
//! # Components
//!
//! - [`endpoint`]: Validated server address and port
//! - [`options`]: Connection options consumed by the transport
//! - [`transport`]: Transport factory and connection abstraction
//! - [`stages`]: Authenticator, post-connect processor and health check seams
//! - [`prepare`]: The shared bind, post-connect and health-check routine
//! - [`source`]: The [`ConnectionSource`] abstraction
//! - [`single`]: [`SingleServerSet`], a source for one fixed endpoint
//! - [`tcp`]: Default TCP transport
//! - [`error`]: Acquisition error types

pub mod endpoint;
pub mod error;
pub mod options;
pub mod prepare;
pub mod single;
pub mod source;
pub mod stages;
pub mod tcp;
pub mod transport;

pub use endpoint::Endpoint;
pub use error::{AcquireStep, ConnectError};
pub use options::ConnectionOptions;
pub use prepare::prepare_connection;
pub use single::SingleServerSet;
pub use source::ConnectionSource;
pub use stages::{Authenticator, BoxError, HealthCheck, PostConnectProcessor};
pub use tcp::{TcpConnection, TcpTransportFactory};
pub use transport::{DirectoryConnection, TransportFactory};
