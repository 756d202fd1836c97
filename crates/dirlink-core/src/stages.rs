//! Optional preparation stages run on a freshly opened connection.
//!
//! Each stage is a capability object. [`Authenticator`] and
//! [`PostConnectProcessor`] are fixed when a connection source is built;
//! [`HealthCheck`] is supplied by whoever asks for a connection, so one source
//! can be probed with different readiness criteria.
//!
//! Stages never own the connection. They receive it by mutable reference and
//! report failure with a [`BoxError`]; closing the connection on failure is the
//! caller's job (see [`crate::prepare_connection`]).

use async_trait::async_trait;

use crate::transport::DirectoryConnection;

/// Boxed error returned by preparation stages.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Authenticates a new connection.
///
/// Represents "how to authenticate" (a simple bind, a SASL mechanism, ...).
/// The wire exchange is the implementation's concern. Implementations are
/// shared by every connection a source produces and must not keep
/// per-connection state.
#[async_trait]
pub trait Authenticator<C: DirectoryConnection>: Send + Sync {
    /// Authenticate `connection`.
    async fn authenticate(&self, connection: &mut C) -> Result<(), BoxError>;
}

/// Side effects applied to a connection after authentication.
///
/// Runs once per new connection, after authentication and before the
/// connection is handed out. May rely on the authenticated identity.
#[async_trait]
pub trait PostConnectProcessor<C: DirectoryConnection>: Send + Sync {
    /// Process the newly authenticated `connection`.
    async fn process(&self, connection: &mut C) -> Result<(), BoxError>;
}

/// Verifies that a fully prepared connection is ready for use.
#[async_trait]
pub trait HealthCheck<C: DirectoryConnection>: Send + Sync {
    /// Check `connection`, failing if it must not be handed out.
    async fn check(&self, connection: &mut C) -> Result<(), BoxError>;
}
