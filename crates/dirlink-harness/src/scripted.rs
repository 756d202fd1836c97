//! Scripted, in-memory transport and preparation stages.
//!
//! Every component journals what it does, so tests can assert exactly which
//! steps ran, in which order, and how many times each connection was closed.

use std::{
    io,
    sync::atomic::{AtomicU64, AtomicUsize, Ordering},
};

use async_trait::async_trait;
use dirlink_core::{
    Authenticator, BoxError, ConnectionOptions, DirectoryConnection, Endpoint, HealthCheck,
    PostConnectProcessor, TransportFactory,
};

use crate::journal::{Journal, Step};

/// Connection state the scripted stages read and write.
///
/// Implemented by both [`ScriptedConnection`] and
/// [`crate::SimConnection`], so the same scripted stages drive in-memory and
/// simulated-network tests.
pub trait TrackedConnection: DirectoryConnection {
    /// Identifier assigned by the transport, unique per factory.
    fn id(&self) -> u64;

    /// Identity established by authentication, if any.
    fn bound_identity(&self) -> Option<&str>;

    /// Record the identity established by authentication.
    fn set_bound_identity(&mut self, identity: String);

    /// Session mode set by post-connect processing, if any.
    fn session_mode(&self) -> Option<&str>;

    /// Record the session mode set by post-connect processing.
    fn set_session_mode(&mut self, mode: String);

    /// Journal the connection reports to.
    fn journal(&self) -> &Journal;
}

/// In-memory connection produced by [`ScriptedTransportFactory`].
#[derive(Debug)]
pub struct ScriptedConnection {
    id: u64,
    endpoint: Endpoint,
    journal: Journal,
    bound_identity: Option<String>,
    session_mode: Option<String>,
    closed: bool,
}

impl ScriptedConnection {
    /// Whether [`DirectoryConnection::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

#[async_trait]
impl DirectoryConnection for ScriptedConnection {
    fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    async fn close(&mut self) {
        // Journal every call so double closes are visible.
        self.journal.record(self.id, Step::Close);
        self.closed = true;
    }
}

impl TrackedConnection for ScriptedConnection {
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

/// Transport factory that opens [`ScriptedConnection`]s without any I/O.
#[derive(Debug)]
pub struct ScriptedTransportFactory {
    journal: Journal,
    failure: Option<io::ErrorKind>,
    next_id: AtomicU64,
    attempts: AtomicUsize,
}

impl ScriptedTransportFactory {
    /// A factory whose opens always succeed.
    pub fn new(journal: &Journal) -> Self {
        Self {
            journal: journal.clone(),
            failure: None,
            next_id: AtomicU64::new(1),
            attempts: AtomicUsize::new(0),
        }
    }

    /// A factory whose opens always fail with `kind`.
    pub fn failing(journal: &Journal, kind: io::ErrorKind) -> Self {
        Self { failure: Some(kind), ..Self::new(journal) }
    }

    /// Number of times [`TransportFactory::open`] was called.
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl TransportFactory for ScriptedTransportFactory {
    type Connection = ScriptedConnection;

    async fn open(
        &self,
        endpoint: &Endpoint,
        _options: &ConnectionOptions,
    ) -> io::Result<ScriptedConnection> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        if let Some(kind) = self.failure {
            return Err(io::Error::new(kind, format!("scripted failure opening {endpoint}")));
        }

        let id = self.next_id.fetch_add(1, Ordering::SeqCst);
        self.journal.record(id, Step::Open);

        Ok(ScriptedConnection {
            id,
            endpoint: endpoint.clone(),
            journal: self.journal.clone(),
            bound_identity: None,
            session_mode: None,
            closed: false,
        })
    }
}

/// Authenticator that binds as a fixed identity or always fails.
#[derive(Debug, Clone)]
pub struct ScriptedAuthenticator {
    outcome: Result<String, String>,
}

impl ScriptedAuthenticator {
    /// Succeed and record `dn` as the bound identity.
    pub fn binding_as(dn: impl Into<String>) -> Self {
        Self { outcome: Ok(dn.into()) }
    }

    /// Fail with `reason`.
    pub fn rejecting(reason: impl Into<String>) -> Self {
        Self { outcome: Err(reason.into()) }
    }
}

#[async_trait]
impl<C: TrackedConnection> Authenticator<C> for ScriptedAuthenticator {
    async fn authenticate(&self, connection: &mut C) -> Result<(), BoxError> {
        connection.journal().record(connection.id(), Step::Authenticate);
        match &self.outcome {
            Ok(dn) => {
                connection.set_bound_identity(dn.clone());
                Ok(())
            },
            Err(reason) => Err(reason.clone().into()),
        }
    }
}

/// Post-connect processor that switches the session mode or always fails.
#[derive(Debug, Clone)]
pub struct ScriptedPostConnect {
    outcome: Result<String, String>,
}

impl ScriptedPostConnect {
    /// Succeed and record `mode` as the session mode.
    pub fn switching_to(mode: impl Into<String>) -> Self {
        Self { outcome: Ok(mode.into()) }
    }

    /// Fail with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self { outcome: Err(reason.into()) }
    }
}

#[async_trait]
impl<C: TrackedConnection> PostConnectProcessor<C> for ScriptedPostConnect {
    async fn process(&self, connection: &mut C) -> Result<(), BoxError> {
        connection.journal().record(connection.id(), Step::PostConnect);
        match &self.outcome {
            Ok(mode) => {
                connection.set_session_mode(mode.clone());
                Ok(())
            },
            Err(reason) => Err(reason.clone().into()),
        }
    }
}

/// What a [`ScriptedHealthCheck`] accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthRule {
    /// Accept every connection.
    Pass,
    /// Reject every connection with this reason.
    Fail(String),
    /// Accept only connections with a bound identity.
    RequireIdentity,
    /// Accept only connections with a session mode set.
    RequireSessionMode,
}

/// Health check driven by a [`HealthRule`].
#[derive(Debug, Clone)]
pub struct ScriptedHealthCheck {
    rule: HealthRule,
}

impl ScriptedHealthCheck {
    /// A health check applying `rule`.
    pub fn new(rule: HealthRule) -> Self {
        Self { rule }
    }

    /// Accept every connection.
    pub fn passing() -> Self {
        Self::new(HealthRule::Pass)
    }

    /// Reject every connection with `reason`.
    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(HealthRule::Fail(reason.into()))
    }
}

#[async_trait]
impl<C: TrackedConnection> HealthCheck<C> for ScriptedHealthCheck {
    async fn check(&self, connection: &mut C) -> Result<(), BoxError> {
        connection.journal().record(connection.id(), Step::HealthCheck);
        match &self.rule {
            HealthRule::Pass => Ok(()),
            HealthRule::Fail(reason) => Err(reason.clone().into()),
            HealthRule::RequireIdentity if connection.bound_identity().is_none() => {
                Err("connection is not authenticated".into())
            },
            HealthRule::RequireSessionMode if connection.session_mode().is_none() => {
                Err("connection has no session mode".into())
            },
            HealthRule::RequireIdentity | HealthRule::RequireSessionMode => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn stages_journal_and_mutate_connection() {
        let journal = Journal::new();
        let transport = ScriptedTransportFactory::new(&journal);
        let endpoint = Endpoint::new("ds.example.com", 389).expect("valid endpoint");

        let mut connection =
            transport.open(&endpoint, &ConnectionOptions::default()).await.expect("open");
        ScriptedAuthenticator::binding_as("cn=admin")
            .authenticate(&mut connection)
            .await
            .expect("bind");
        ScriptedPostConnect::switching_to("read-only")
            .process(&mut connection)
            .await
            .expect("process");
        ScriptedHealthCheck::new(HealthRule::RequireIdentity)
            .check(&mut connection)
            .await
            .expect("healthy");

        assert_eq!(connection.bound_identity(), Some("cn=admin"));
        assert_eq!(connection.session_mode(), Some("read-only"));
        assert_eq!(
            journal.steps_for(connection.id()),
            vec![Step::Open, Step::Authenticate, Step::PostConnect, Step::HealthCheck]
        );
    }

    #[tokio::test]
    async fn identity_rule_rejects_anonymous_connection() {
        let journal = Journal::new();
        let transport = ScriptedTransportFactory::new(&journal);
        let endpoint = Endpoint::new("ds.example.com", 389).expect("valid endpoint");
        let mut connection =
            transport.open(&endpoint, &ConnectionOptions::default()).await.expect("open");

        let result = ScriptedHealthCheck::new(HealthRule::RequireIdentity).check(&mut connection).await;

        assert!(result.is_err());
    }

    #[tokio::test]
    async fn failing_factory_counts_attempts_without_journaling() {
        let journal = Journal::new();
        let transport = ScriptedTransportFactory::failing(&journal, io::ErrorKind::ConnectionRefused);
        let endpoint = Endpoint::new("ds.example.com", 389).expect("valid endpoint");

        let error = transport
            .open(&endpoint, &ConnectionOptions::default())
            .await
            .expect_err("open should fail");

        assert_eq!(error.kind(), io::ErrorKind::ConnectionRefused);
        assert_eq!(transport.attempts(), 1);
        assert!(journal.steps().is_empty());
    }
}
