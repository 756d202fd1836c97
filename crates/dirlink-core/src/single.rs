//! A connection source for one fixed server.

use std::{fmt, sync::Arc};

use async_trait::async_trait;
use tracing::{debug, warn};

use crate::{
    endpoint::Endpoint,
    error::{AcquireStep, ConnectError},
    options::ConnectionOptions,
    prepare::prepare_connection,
    source::ConnectionSource,
    stages::{Authenticator, HealthCheck, PostConnectProcessor},
    tcp::TcpTransportFactory,
    transport::TransportFactory,
};

/// Connection source that always connects to the same endpoint.
///
/// Built once, then shared freely: it holds no mutable state, so any number
/// of tasks may acquire connections through it concurrently.
///
/// # Example
///
/// ```no_run
/// use dirlink_core::{ConnectionSource, SingleServerSet};
///
/// # async fn example() -> Result<(), dirlink_core::ConnectError> {
/// let servers = SingleServerSet::new("ldap.example.com", 389)?;
/// assert!(!servers.includes_authentication());
///
/// let connection = servers.acquire().await?;
/// # drop(connection);
/// # Ok(())
/// # }
/// ```
pub struct SingleServerSet<F: TransportFactory = TcpTransportFactory> {
    endpoint: Endpoint,
    transport: F,
    options: ConnectionOptions,
    authenticator: Option<Arc<dyn Authenticator<F::Connection>>>,
    post_connect: Option<Arc<dyn PostConnectProcessor<F::Connection>>>,
}

impl SingleServerSet {
    /// Create a source using the default TCP transport and default options.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidConfiguration`] if the address is empty
    /// or the port is outside `1..=65535`.
    pub fn new(address: impl Into<String>, port: u32) -> Result<Self, ConnectError> {
        Self::with_transport(address, port, TcpTransportFactory)
    }
}

impl<F: TransportFactory> SingleServerSet<F> {
    /// Create a source using a custom transport factory.
    ///
    /// # Errors
    ///
    /// Returns [`ConnectError::InvalidConfiguration`] if the address is empty
    /// or the port is outside `1..=65535`.
    pub fn with_transport(
        address: impl Into<String>,
        port: u32,
        transport: F,
    ) -> Result<Self, ConnectError> {
        Ok(Self::from_endpoint(Endpoint::new(address, port)?, transport))
    }

    /// Create a source for an already validated endpoint.
    pub fn from_endpoint(endpoint: Endpoint, transport: F) -> Self {
        Self {
            endpoint,
            transport,
            options: ConnectionOptions::default(),
            authenticator: None,
            post_connect: None,
        }
    }

    /// Replace the connection options.
    #[must_use]
    pub fn with_options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Authenticate every new connection with `authenticator`.
    #[must_use]
    pub fn with_authenticator(
        mut self,
        authenticator: impl Authenticator<F::Connection> + 'static,
    ) -> Self {
        let authenticator: Arc<dyn Authenticator<F::Connection>> = Arc::new(authenticator);
        self.authenticator = Some(authenticator);
        self
    }

    /// Run `processor` on every new connection after authentication.
    #[must_use]
    pub fn with_post_connect_processor(
        mut self,
        processor: impl PostConnectProcessor<F::Connection> + 'static,
    ) -> Self {
        let processor: Arc<dyn PostConnectProcessor<F::Connection>> = Arc::new(processor);
        self.post_connect = Some(processor);
        self
    }

    /// Target server.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Host name or IP address of the target server.
    pub fn address(&self) -> &str {
        self.endpoint.address()
    }

    /// Port of the target server.
    pub fn port(&self) -> u16 {
        self.endpoint.port()
    }

    /// Transport factory used to open connections.
    pub fn transport(&self) -> &F {
        &self.transport
    }

    /// Options handed to the transport factory.
    pub fn connection_options(&self) -> &ConnectionOptions {
        &self.options
    }
}

#[async_trait]
impl<F: TransportFactory> ConnectionSource for SingleServerSet<F> {
    type Connection = F::Connection;

    async fn acquire_with_health_check(
        &self,
        health_check: Option<&dyn HealthCheck<Self::Connection>>,
    ) -> Result<Self::Connection, ConnectError> {
        let connection = match self.transport.open(&self.endpoint, &self.options).await {
            Ok(connection) => connection,
            Err(source) => {
                warn!(
                    endpoint = %self.endpoint,
                    step = %AcquireStep::Transport,
                    error = %source,
                    "unable to open transport"
                );
                return Err(ConnectError::Transport { endpoint: self.endpoint.clone(), source });
            },
        };
        debug!(endpoint = %self.endpoint, "transport opened");

        prepare_connection(
            connection,
            self.authenticator.as_deref(),
            self.post_connect.as_deref(),
            health_check,
        )
        .await
    }

    fn includes_authentication(&self) -> bool {
        self.authenticator.is_some()
    }

    fn includes_post_connect_processing(&self) -> bool {
        self.post_connect.is_some()
    }
}

impl<F: TransportFactory> fmt::Display for SingleServerSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SingleServerSet(server={}, includes_authentication={}, includes_post_connect_processing={})",
            self.endpoint,
            self.includes_authentication(),
            self.includes_post_connect_processing()
        )
    }
}

impl<F: TransportFactory> fmt::Debug for SingleServerSet<F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleServerSet")
            .field("endpoint", &self.endpoint)
            .field("options", &self.options)
            .field("includes_authentication", &self.includes_authentication())
            .field("includes_post_connect_processing", &self.includes_post_connect_processing())
            .finish_non_exhaustive()
    }
}
