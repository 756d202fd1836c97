//! The shared bind, post-connect and health-check routine.
//!
//! Any [`crate::ConnectionSource`] that opens its own transports finishes
//! them through [`prepare_connection`], so every source applies the same
//! ordering and cleanup rules no matter how it picked a server.

use tracing::{debug, warn};

use crate::{
    endpoint::Endpoint,
    error::ConnectError,
    stages::{Authenticator, BoxError, HealthCheck, PostConnectProcessor},
    transport::DirectoryConnection,
};

/// Run the optional preparation stages on a freshly opened connection.
///
/// Stages run strictly in order:
///
/// 1. `authenticator`
/// 2. `post_connect`
/// 3. `health_check`
///
/// An absent stage is skipped. The first failure stops the sequence, closes
/// `connection` exactly once, and is returned wrapped in the matching
/// [`ConnectError`] variant. On success the connection is returned to the
/// caller, who now owns it.
pub async fn prepare_connection<C: DirectoryConnection>(
    mut connection: C,
    authenticator: Option<&dyn Authenticator<C>>,
    post_connect: Option<&dyn PostConnectProcessor<C>>,
    health_check: Option<&dyn HealthCheck<C>>,
) -> Result<C, ConnectError> {
    if let Some(authenticator) = authenticator {
        if let Err(source) = authenticator.authenticate(&mut connection).await {
            return Err(abort(connection, source, |endpoint, source| {
                ConnectError::Authentication { endpoint, source }
            })
            .await);
        }
        debug!(endpoint = %connection.endpoint(), "connection authenticated");
    }

    if let Some(processor) = post_connect {
        if let Err(source) = processor.process(&mut connection).await {
            return Err(abort(connection, source, |endpoint, source| {
                ConnectError::PostConnect { endpoint, source }
            })
            .await);
        }
        debug!(endpoint = %connection.endpoint(), "post-connect processing complete");
    }

    if let Some(check) = health_check {
        if let Err(source) = check.check(&mut connection).await {
            return Err(abort(connection, source, |endpoint, source| {
                ConnectError::HealthCheck { endpoint, source }
            })
            .await);
        }
        debug!(endpoint = %connection.endpoint(), "health check passed");
    }

    Ok(connection)
}

/// Close a connection whose preparation failed and build the error.
async fn abort<C: DirectoryConnection>(
    mut connection: C,
    source: BoxError,
    wrap: fn(Endpoint, BoxError) -> ConnectError,
) -> ConnectError {
    let endpoint = connection.endpoint().clone();
    connection.close().await;

    let error = wrap(endpoint, source);
    warn!(
        endpoint = %connection.endpoint(),
        step = %error.step(),
        error = %error,
        "connection preparation failed; connection closed"
    );
    error
}
