//! The connection source abstraction.

use async_trait::async_trait;

use crate::{error::ConnectError, stages::HealthCheck, transport::DirectoryConnection};

/// Produces fully prepared connections to one or more directory servers.
///
/// A source is immutable once built. Every acquisition is independent and
/// makes exactly one attempt; retry and fail-over belong to the caller or to
/// a multi-server source built on top of this trait.
#[async_trait]
pub trait ConnectionSource: Send + Sync {
    /// Connection type handed to callers.
    type Connection: DirectoryConnection;

    /// Acquire a connection with no health check.
    async fn acquire(&self) -> Result<Self::Connection, ConnectError> {
        self.acquire_with_health_check(None).await
    }

    /// Acquire a connection, running `health_check` last if one is given.
    ///
    /// Returns either a connection that passed every configured stage or the
    /// error of the first stage that failed. A connection that fails a stage
    /// has already been closed when the error is returned.
    async fn acquire_with_health_check(
        &self,
        health_check: Option<&dyn HealthCheck<Self::Connection>>,
    ) -> Result<Self::Connection, ConnectError>;

    /// Whether acquired connections are authenticated by this source.
    ///
    /// Known from configuration alone, so connection pools can decide
    /// whether they need their own re-authentication logic without
    /// connecting first.
    fn includes_authentication(&self) -> bool;

    /// Whether acquired connections go through post-connect processing.
    fn includes_post_connect_processing(&self) -> bool;
}
