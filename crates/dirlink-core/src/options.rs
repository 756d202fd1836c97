//! Connection options.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Options handed verbatim to the transport factory.
///
/// A connection source owns exactly one instance. When none is supplied the
/// default is used. Fields a particular transport does not understand are
/// ignored by it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionOptions {
    /// Deadline for one transport open, covering name resolution and every
    /// resolved address tried. `None` waits indefinitely.
    pub connect_timeout: Option<Duration>,
    /// Maximum time collaborators should wait for a server response.
    pub response_timeout: Duration,
    /// Enable TCP keep-alive on the socket.
    pub use_keep_alive: bool,
    /// Disable Nagle's algorithm on the socket.
    pub use_tcp_no_delay: bool,
    /// Socket receive buffer size in bytes. `None` keeps the OS default.
    pub receive_buffer_size: Option<u32>,
    /// Socket send buffer size in bytes. `None` keeps the OS default.
    pub send_buffer_size: Option<u32>,
}

impl Default for ConnectionOptions {
    fn default() -> Self {
        Self {
            connect_timeout: Some(Duration::from_secs(10)),
            response_timeout: Duration::from_secs(300),
            use_keep_alive: true,
            use_tcp_no_delay: true,
            receive_buffer_size: None,
            send_buffer_size: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let options = ConnectionOptions::default();
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(10)));
        assert_eq!(options.response_timeout, Duration::from_secs(300));
        assert!(options.use_keep_alive);
        assert!(options.use_tcp_no_delay);
        assert_eq!(options.receive_buffer_size, None);
        assert_eq!(options.send_buffer_size, None);
    }

    #[test]
    fn struct_update_keeps_remaining_defaults() {
        let options = ConnectionOptions { use_tcp_no_delay: false, ..Default::default() };
        assert!(!options.use_tcp_no_delay);
        assert_eq!(options.response_timeout, ConnectionOptions::default().response_timeout);
    }

    #[test]
    fn partial_document_keeps_remaining_defaults() {
        let options: ConnectionOptions =
            serde_json::from_str(r#"{"use_tcp_no_delay": false}"#).unwrap();

        assert_eq!(options, ConnectionOptions { use_tcp_no_delay: false, ..Default::default() });
        assert_eq!(options.connect_timeout, Some(Duration::from_secs(10)));
    }

    #[test]
    fn empty_document_is_default() {
        let options: ConnectionOptions = serde_json::from_str("{}").unwrap();
        assert_eq!(options, ConnectionOptions::default());
    }

    #[test]
    fn survives_round_trip() {
        let options = ConnectionOptions {
            connect_timeout: None,
            response_timeout: Duration::from_millis(1500),
            use_keep_alive: false,
            use_tcp_no_delay: false,
            receive_buffer_size: Some(64 * 1024),
            send_buffer_size: Some(32 * 1024),
        };

        let json = serde_json::to_string(&options).unwrap();
        let back: ConnectionOptions = serde_json::from_str(&json).unwrap();
        assert_eq!(back, options);
    }
}
