//! The extended operation handler contract.

use std::collections::BTreeSet;

use dirlink_proto::{ExtendedRequest, ExtendedResult, MessageId, Oid};

/// Server-side state visible to a handler while it answers one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestContext {
    /// Identifier of the client connection the request arrived on.
    pub connection_id: u64,

    /// DN the connection is authenticated as, if any.
    pub authenticated_dn: Option<String>,
}

impl RequestContext {
    /// Context for an unauthenticated connection.
    pub fn new(connection_id: u64) -> Self {
        Self { connection_id, authenticated_dn: None }
    }

    /// Mark the connection as authenticated as `dn`.
    #[must_use]
    pub fn with_authenticated_dn(mut self, dn: impl Into<String>) -> Self {
        self.authenticated_dn = Some(dn.into());
        self
    }
}

/// Answers extended operations a server does not implement natively.
///
/// The host queries [`supported_request_oids`](Self::supported_request_oids)
/// once at registration and calls [`handle`](Self::handle) for every request
/// whose OID matches. Handlers never call back into the host and hold no
/// connection state, so they must be safe to invoke concurrently for
/// unrelated requests.
pub trait ExtendedOperationHandler: Send + Sync {
    /// Human-readable name of the capability this handler provides.
    fn name(&self) -> &str;

    /// OIDs of the extended requests this handler answers.
    fn supported_request_oids(&self) -> BTreeSet<Oid>;

    /// Answer `request`.
    fn handle(
        &self,
        context: &RequestContext,
        message_id: MessageId,
        request: &ExtendedRequest,
    ) -> ExtendedResult;
}
