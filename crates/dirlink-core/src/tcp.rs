//! Default TCP transport.

use std::{io, net::SocketAddr};

use async_trait::async_trait;
use tokio::{
    io::AsyncWriteExt,
    net::{TcpSocket, TcpStream, lookup_host},
};
use tracing::debug;

use crate::{
    endpoint::Endpoint,
    options::ConnectionOptions,
    transport::{DirectoryConnection, TransportFactory},
};

/// Opens plain TCP connections.
///
/// Used when a connection source is built without a transport factory.
/// Honours every socket-level field of [`ConnectionOptions`].
#[derive(Debug, Clone, Copy, Default)]
pub struct TcpTransportFactory;

#[async_trait]
impl TransportFactory for TcpTransportFactory {
    type Connection = TcpConnection;

    async fn open(
        &self,
        endpoint: &Endpoint,
        options: &ConnectionOptions,
    ) -> io::Result<TcpConnection> {
        // One deadline for resolution and every attempt together.
        let stream = match options.connect_timeout {
            Some(limit) => {
                tokio::time::timeout(limit, connect_any(endpoint, options)).await.map_err(|_| {
                    io::Error::new(
                        io::ErrorKind::TimedOut,
                        format!("connect to {endpoint} timed out after {limit:?}"),
                    )
                })??
            },
            None => connect_any(endpoint, options).await?,
        };

        Ok(TcpConnection { endpoint: endpoint.clone(), stream })
    }
}

/// Try each resolved address in order, returning the first stream that
/// connects or the last error seen.
async fn connect_any(endpoint: &Endpoint, options: &ConnectionOptions) -> io::Result<TcpStream> {
    let mut last_error = None;

    for addr in lookup_host((endpoint.address(), endpoint.port())).await? {
        match connect(addr, options).await {
            Ok(stream) => {
                debug!(%endpoint, %addr, "tcp connection established");
                return Ok(stream);
            },
            Err(error) => {
                debug!(%endpoint, %addr, %error, "tcp connect attempt failed");
                last_error = Some(error);
            },
        }
    }

    Err(last_error.unwrap_or_else(|| {
        io::Error::new(
            io::ErrorKind::AddrNotAvailable,
            format!("{endpoint} did not resolve to any address"),
        )
    }))
}

async fn connect(addr: SocketAddr, options: &ConnectionOptions) -> io::Result<TcpStream> {
    let socket = if addr.is_ipv4() { TcpSocket::new_v4()? } else { TcpSocket::new_v6()? };
    socket.set_keepalive(options.use_keep_alive)?;
    if let Some(size) = options.receive_buffer_size {
        socket.set_recv_buffer_size(size)?;
    }
    if let Some(size) = options.send_buffer_size {
        socket.set_send_buffer_size(size)?;
    }

    let stream = socket.connect(addr).await?;
    stream.set_nodelay(options.use_tcp_no_delay)?;

    Ok(stream)
}

/// A TCP connection opened by [`TcpTransportFactory`].
#[derive(Debug)]
pub struct TcpConnection {
    endpoint: Endpoint,
    stream: TcpStream,
}

impl TcpConnection {
    /// The underlying stream, for authenticators and other stages that speak
    /// the directory protocol.
    pub fn stream_mut(&mut self) -> &mut TcpStream {
        &mut self.stream
    }

    /// Consume the connection and return the underlying stream.
    pub fn into_stream(self) -> TcpStream {
        self.stream
    }
}

#[async_trait]
impl DirectoryConnection for TcpConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn close(&mut self) {
        if let Err(error) = self.stream.shutdown().await {
            debug!(endpoint = %self.endpoint, %error, "error shutting down tcp connection");
        }
    }
}
