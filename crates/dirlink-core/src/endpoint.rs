//! Directory server endpoints.

use std::fmt;

use crate::error::ConnectError;

/// Highest valid TCP port.
const MAX_PORT: u32 = 65_535;

/// Address and port of a directory server.
///
/// Validated at construction: the address must be non-empty once surrounding
/// whitespace is trimmed, and the port must lie in `1..=65535`. An
/// `Endpoint` that exists is always usable as a connection target.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Endpoint {
    address: String,
    port: u16,
}

impl Endpoint {
    /// Create a validated endpoint.
    ///
    /// The port is taken as `u32` so that out-of-range values coming from
    /// configuration are rejected here rather than silently truncated.
    /// Surrounding whitespace is stripped from the address.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidConfiguration`] if the address is empty
    /// or blank, or the port is outside `1..=65535`.
    pub fn new(address: impl Into<String>, port: u32) -> Result<Self, ConnectError> {
        let address = address.into();
        let address = address.trim();
        if address.is_empty() {
            return Err(ConnectError::invalid_configuration("server address must not be empty"));
        }

        if port == 0 || port > MAX_PORT {
            return Err(ConnectError::invalid_configuration(format!(
                "server port must be between 1 and 65535, got {port}"
            )));
        }

        Ok(Self { address: address.to_owned(), port: port as u16 })
    }

    /// Host name or IP address of the server.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.address
    }

    /// TCP port of the server.
    #[must_use]
    pub fn port(&self) -> u16 {
        self.port
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.address, self.port)
    }
}
