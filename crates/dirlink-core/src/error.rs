//! Error types for connection acquisition.
//!
//! Every failure names the step that failed. Acquisition-time errors also
//! carry the endpoint and keep the collaborator's error as their source, so
//! the original cause is never lost or downgraded.

use std::{fmt, io};

use thiserror::Error;

use crate::{endpoint::Endpoint, stages::BoxError};

/// The step of connection preparation an error came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AcquireStep {
    /// Construction-time validation.
    Configuration,
    /// Opening the transport.
    Transport,
    /// Authenticating the new connection.
    Authentication,
    /// Post-connect processing.
    PostConnect,
    /// The caller-supplied health check.
    HealthCheck,
}

impl fmt::Display for AcquireStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Configuration => "configuration",
            Self::Transport => "transport",
            Self::Authentication => "authentication",
            Self::PostConnect => "post-connect",
            Self::HealthCheck => "health check",
        };
        f.write_str(name)
    }
}

/// Errors produced while building or using a connection source.
#[derive(Debug, Error)]
pub enum ConnectError {
    /// The source was configured with invalid values. Never retried.
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// What was wrong with the configuration.
        reason: String,
    },

    /// The transport to the server could not be opened.
    #[error("unable to connect to {endpoint}: {source}")]
    Transport {
        /// Server the connection was attempted against.
        endpoint: Endpoint,
        /// Error reported by the transport factory.
        #[source]
        source: io::Error,
    },

    /// Authentication of the new connection failed.
    #[error("authentication failed on connection to {endpoint}: {source}")]
    Authentication {
        /// Server the connection was made to.
        endpoint: Endpoint,
        /// Error reported by the authenticator.
        #[source]
        source: BoxError,
    },

    /// Post-connect processing of the new connection failed.
    #[error("post-connect processing failed on connection to {endpoint}: {source}")]
    PostConnect {
        /// Server the connection was made to.
        endpoint: Endpoint,
        /// Error reported by the post-connect processor.
        #[source]
        source: BoxError,
    },

    /// The caller's health check rejected the new connection.
    #[error("health check failed on connection to {endpoint}: {source}")]
    HealthCheck {
        /// Server the connection was made to.
        endpoint: Endpoint,
        /// Error reported by the health check.
        #[source]
        source: BoxError,
    },
}

impl ConnectError {
    pub(crate) fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration { reason: reason.into() }
    }

    /// The step that failed.
    pub fn step(&self) -> AcquireStep {
        match self {
            Self::InvalidConfiguration { .. } => AcquireStep::Configuration,
            Self::Transport { .. } => AcquireStep::Transport,
            Self::Authentication { .. } => AcquireStep::Authentication,
            Self::PostConnect { .. } => AcquireStep::PostConnect,
            Self::HealthCheck { .. } => AcquireStep::HealthCheck,
        }
    }

    /// The endpoint an acquisition-time error occurred against.
    ///
    /// `None` for configuration errors, which happen before any endpoint
    /// exists.
    pub fn endpoint(&self) -> Option<&Endpoint> {
        match self {
            Self::InvalidConfiguration { .. } => None,
            Self::Transport { endpoint, .. }
            | Self::Authentication { endpoint, .. }
            | Self::PostConnect { endpoint, .. }
            | Self::HealthCheck { endpoint, .. } => Some(endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error as _;

    use super::*;

    #[test]
    fn transport_error_keeps_cause_and_endpoint() {
        let endpoint = Endpoint::new("ldap.example.com", 389).unwrap();
        let err = ConnectError::Transport {
            endpoint: endpoint.clone(),
            source: io::Error::new(io::ErrorKind::ConnectionRefused, "refused"),
        };

        assert_eq!(err.step(), AcquireStep::Transport);
        assert_eq!(err.endpoint(), Some(&endpoint));
        assert_eq!(err.to_string(), "unable to connect to ldap.example.com:389: refused");

        let source = err.source().and_then(|s| s.downcast_ref::<io::Error>()).unwrap();
        assert_eq!(source.kind(), io::ErrorKind::ConnectionRefused);
    }

    #[test]
    fn configuration_error_has_no_endpoint() {
        let err = ConnectError::invalid_configuration("bad port");
        assert_eq!(err.step(), AcquireStep::Configuration);
        assert!(err.endpoint().is_none());
        assert_eq!(err.to_string(), "invalid configuration: bad port");
    }
}
