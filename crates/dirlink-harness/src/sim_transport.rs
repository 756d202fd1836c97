//! Turmoil-backed transport.
//!
//! Opens real TCP streams over turmoil's simulated network so acquisitions
//! can be exercised against simulated hosts with deterministic timing.

use std::{
    fmt, io,
    sync::atomic::{AtomicU64, Ordering},
};

use async_trait::async_trait;
use dirlink_core::{ConnectionOptions, DirectoryConnection, Endpoint, TransportFactory};
use tokio::io::AsyncWriteExt;
use tracing::debug;
use turmoil::net::TcpStream;

use crate::{
    journal::{Journal, Step},
    scripted::TrackedConnection,
};

/// Transport factory that connects over the simulated network.
///
/// Must be used from inside a turmoil host or client. The endpoint address
/// is resolved by turmoil, so it must name a host registered with the
/// simulation.
#[derive(Debug)]
pub struct SimTransportFactory {
    journal: Journal,
    next_id: AtomicU64,
}

impl SimTransportFactory {
    /// Create a factory journaling into `journal`.
    pub fn new(journal: &Journal) -> Self {
        Self { journal: journal.clone(), next_id: AtomicU64::new(1) }
    }
}

#[async_trait]
impl TransportFactory for SimTransportFactory {
    type Connection = SimConnection;

    async fn open(
        &self,
        endpoint: &Endpoint,
        options: &ConnectionOptions,
    ) -> io::Result<SimConnection> {
        let connect = TcpStream::connect(endpoint.to_string());
        let stream = match options.connect_timeout {
            Some(limit) => tokio::time::timeout(limit, connect).await.map_err(|_| {
                io::Error::new(
                    io::ErrorKind::TimedOut,
                    format!("connect to {endpoint} timed out after {limit:?}"),
                )
            })??,
            None => connect.await?,
        };

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.journal.record(id, Step::Open);
        debug!(connection_id = id, %endpoint, "simulated stream opened");

        Ok(SimConnection {
            id,
            endpoint: endpoint.clone(),
            journal: self.journal.clone(),
            stream: Some(stream),
            bound_identity: None,
            session_mode: None,
        })
    }
}

/// A connection over a simulated TCP stream.
pub struct SimConnection {
    id: u64,
    endpoint: Endpoint,
    journal: Journal,
    stream: Option<TcpStream>,
    bound_identity: Option<String>,
    session_mode: Option<String>,
}

impl SimConnection {
    /// Whether the underlying stream is still held.
    pub fn is_open(&self) -> bool {
        self.stream.is_some()
    }
}

impl fmt::Debug for SimConnection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SimConnection")
            .field("id", &self.id)
            .field("endpoint", &self.endpoint)
            .field("open", &self.stream.is_some())
            .field("bound_identity", &self.bound_identity)
            .field("session_mode", &self.session_mode)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl DirectoryConnection for SimConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn close(&mut self) {
        self.journal.record(self.id, Step::Close);
        if let Some(mut stream) = self.stream.take()
            && let Err(error) = stream.shutdown().await
        {
            debug!(connection_id = self.id, %error, "simulated stream shutdown failed");
        }
    }
}

impl TrackedConnection for SimConnection {
    fn id(&self) -> u64 {
        self.id
    }

    fn bound_identity(&self) -> Option<&str> {
        self.bound_identity.as_deref()
    }

    fn set_bound_identity(&mut self, identity: String) {
        self.bound_identity = Some(identity);
    }

    fn session_mode(&self) -> Option<&str> {
        self.session_mode.as_deref()
    }

    fn set_session_mode(&mut self, mode: String) {
        self.session_mode = Some(mode);
    }

    fn journal(&self) -> &Journal {
        &self.journal
    }
}
