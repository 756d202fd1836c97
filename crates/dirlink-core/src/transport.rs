//! Transport abstraction for directory connections.
//!
//! Production uses [`crate::TcpTransportFactory`]; tests use in-memory or
//! turmoil-backed factories from the harness crate. Alternative security
//! layers (TLS, SASL-wrapped streams) plug in here as further factories.

use std::io;

use async_trait::async_trait;

use crate::{endpoint::Endpoint, options::ConnectionOptions};

/// Opens raw connections to a directory server.
///
/// A factory holds no per-connection state. It may be called concurrently
/// from any number of tasks.
#[async_trait]
pub trait TransportFactory: Send + Sync + 'static {
    /// Connection produced by this factory.
    type Connection: DirectoryConnection;

    /// Open a connection to `endpoint` using `options`.
    ///
    /// Resolves only once the transport is usable. Any timeout is the
    /// factory's own, typically driven by
    /// [`ConnectionOptions::connect_timeout`].
    async fn open(
        &self,
        endpoint: &Endpoint,
        options: &ConnectionOptions,
    ) -> io::Result<Self::Connection>;
}

/// A connection to a directory server.
///
/// Created by a [`TransportFactory`], mutated in place by authentication and
/// post-connect processing, then owned by the caller.
#[async_trait]
pub trait DirectoryConnection: Send + 'static {
    /// Server this connection was opened to.
    fn endpoint(&self) -> &Endpoint;

    /// Release the connection.
    ///
    /// Called at most once by the preparation routine when a step fails.
    /// Implementations must not fail; errors while tearing down are theirs
    /// to log.
    async fn close(&mut self);
}
