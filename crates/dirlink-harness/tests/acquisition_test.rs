//! Acquisition pipeline tests against scripted collaborators.
//!
//! Every collaborator journals its work, so these tests assert the exact
//! order of steps and that a failed acquisition closes its connection
//! exactly once.

use std::{io, sync::Arc};

use dirlink_core::{AcquireStep, ConnectError, ConnectionSource, HealthCheck, SingleServerSet};
use dirlink_harness::{
    HealthRule, Journal, ScriptedAuthenticator, ScriptedConnection, ScriptedHealthCheck,
    ScriptedPostConnect, ScriptedTransportFactory, Step, TrackedConnection,
};
use proptest::prelude::*;

fn source(journal: &Journal) -> SingleServerSet<ScriptedTransportFactory> {
    SingleServerSet::with_transport("ds.example.com", 389, ScriptedTransportFactory::new(journal))
        .expect("valid endpoint")
}

#[tokio::test]
async fn stages_run_in_order() {
    let journal = Journal::new();
    let servers = source(&journal)
        .with_authenticator(ScriptedAuthenticator::binding_as("cn=reader"))
        .with_post_connect_processor(ScriptedPostConnect::switching_to("paged"));

    let connection = servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::passing()))
        .await
        .expect("acquire");

    assert_eq!(
        journal.steps(),
        vec![Step::Open, Step::Authenticate, Step::PostConnect, Step::HealthCheck]
    );
    assert_eq!(connection.bound_identity(), Some("cn=reader"));
    assert_eq!(connection.session_mode(), Some("paged"));
    assert!(!connection.is_closed());
}

#[tokio::test]
async fn bare_source_only_opens_transport() {
    let journal = Journal::new();
    let servers = source(&journal);

    let connection = servers.acquire().await.expect("acquire");

    assert!(!servers.includes_authentication());
    assert!(!servers.includes_post_connect_processing());
    assert_eq!(journal.steps(), vec![Step::Open]);
    assert_eq!(connection.bound_identity(), None);
}

#[tokio::test]
async fn transport_failure_runs_no_stages() {
    let journal = Journal::new();
    let transport = ScriptedTransportFactory::failing(&journal, io::ErrorKind::ConnectionRefused);
    let servers = SingleServerSet::with_transport("ds.example.com", 389, transport)
        .expect("valid endpoint")
        .with_authenticator(ScriptedAuthenticator::binding_as("cn=reader"))
        .with_post_connect_processor(ScriptedPostConnect::switching_to("paged"));

    let error = servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::passing()))
        .await
        .expect_err("transport refuses");

    assert_eq!(error.step(), AcquireStep::Transport);
    assert!(matches!(
        &error,
        ConnectError::Transport { source, .. } if source.kind() == io::ErrorKind::ConnectionRefused
    ));
    assert_eq!(servers.transport().attempts(), 1);
    assert!(journal.steps().is_empty());
}

#[tokio::test]
async fn authentication_failure_closes_once_and_stops() {
    let journal = Journal::new();
    let servers = source(&journal)
        .with_authenticator(ScriptedAuthenticator::rejecting("invalid credentials"))
        .with_post_connect_processor(ScriptedPostConnect::switching_to("paged"));

    let error = servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::passing()))
        .await
        .expect_err("bind rejected");

    assert_eq!(error.step(), AcquireStep::Authentication);
    assert!(error.to_string().contains("invalid credentials"));
    assert_eq!(journal.steps(), vec![Step::Open, Step::Authenticate, Step::Close]);
}

#[tokio::test]
async fn post_connect_failure_closes_once_and_skips_health_check() {
    let journal = Journal::new();
    let servers = source(&journal)
        .with_authenticator(ScriptedAuthenticator::binding_as("cn=reader"))
        .with_post_connect_processor(ScriptedPostConnect::failing("control not supported"));

    let error = servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::passing()))
        .await
        .expect_err("post-connect fails");

    assert_eq!(error.step(), AcquireStep::PostConnect);
    assert_eq!(
        journal.steps(),
        vec![Step::Open, Step::Authenticate, Step::PostConnect, Step::Close]
    );
}

#[tokio::test]
async fn health_check_failure_closes_once() {
    let journal = Journal::new();
    let servers = source(&journal);

    let error = servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::failing("server is read-only")))
        .await
        .expect_err("unhealthy");

    assert_eq!(error.step(), AcquireStep::HealthCheck);
    assert_eq!(error.endpoint().map(ToString::to_string).as_deref(), Some("ds.example.com:389"));
    assert_eq!(journal.steps(), vec![Step::Open, Step::HealthCheck, Step::Close]);
}

#[tokio::test]
async fn health_check_sees_authenticated_state() {
    let journal = Journal::new();
    let servers = source(&journal).with_authenticator(ScriptedAuthenticator::binding_as("cn=reader"));

    servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::new(HealthRule::RequireIdentity)))
        .await
        .expect("identity is bound before the health check runs");
}

#[tokio::test]
async fn health_check_is_chosen_per_call() {
    let journal = Journal::new();
    let servers = source(&journal);

    let first = servers.acquire().await;
    let second = servers
        .acquire_with_health_check(Some(&ScriptedHealthCheck::new(HealthRule::RequireIdentity)))
        .await;
    let third = servers.acquire_with_health_check(None).await;

    assert!(first.is_ok());
    assert_eq!(second.map(|_| ()).map_err(|e| e.step()), Err(AcquireStep::HealthCheck));
    assert!(third.is_ok());
    assert_eq!(journal.count(Step::Open), 3);
    assert_eq!(journal.count(Step::HealthCheck), 1);
    assert_eq!(journal.count(Step::Close), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_acquisitions_are_independent() {
    let journal = Journal::new();
    let servers = Arc::new(
        source(&journal).with_authenticator(ScriptedAuthenticator::binding_as("cn=reader")),
    );

    let mut tasks = Vec::new();
    for _ in 0..64 {
        let servers = Arc::clone(&servers);
        tasks.push(tokio::spawn(async move { servers.acquire().await.map(|c| c.id()) }));
    }

    let mut ids = Vec::new();
    for task in tasks {
        ids.push(task.await.expect("task").expect("acquire"));
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids.len(), 64);
    assert_eq!(journal.count(Step::Open), 64);
    assert_eq!(journal.count(Step::Authenticate), 64);
    assert_eq!(journal.count(Step::Close), 0);
    for id in ids {
        assert_eq!(journal.steps_for(id), vec![Step::Open, Step::Authenticate]);
    }
}

#[test]
fn default_source_reports_endpoint_and_flags() {
    let servers = SingleServerSet::new("ldap.example.com", 389).expect("valid endpoint");

    assert_eq!(servers.address(), "ldap.example.com");
    assert_eq!(servers.port(), 389);
    assert!(!servers.includes_authentication());
    assert!(!servers.includes_post_connect_processing());
}

#[test]
fn invalid_ports_are_rejected_at_construction() {
    for port in [0, 65_536, 100_000] {
        let error = SingleServerSet::new("ldap.example.com", port).expect_err("invalid port");
        assert_eq!(error.step(), AcquireStep::Configuration);
    }
}

fn expected_steps(auth: Option<bool>, post: Option<bool>, health: Option<bool>) -> Vec<Step> {
    let mut steps = vec![Step::Open];
    for (stage, step) in
        [(auth, Step::Authenticate), (post, Step::PostConnect), (health, Step::HealthCheck)]
    {
        match stage {
            None => {},
            Some(true) => steps.push(step),
            Some(false) => {
                steps.push(step);
                steps.push(Step::Close);
                return steps;
            },
        }
    }
    steps
}

proptest! {
    #[test]
    fn any_stage_configuration_follows_pipeline_order(
        auth in proptest::option::of(any::<bool>()),
        post in proptest::option::of(any::<bool>()),
        health in proptest::option::of(any::<bool>()),
    ) {
        let runtime = tokio::runtime::Builder::new_current_thread().enable_all().build().expect("runtime");
        let journal = Journal::new();

        let mut servers = source(&journal);
        match auth {
            Some(true) => servers = servers.with_authenticator(ScriptedAuthenticator::binding_as("cn=x")),
            Some(false) => servers = servers.with_authenticator(ScriptedAuthenticator::rejecting("no")),
            None => {},
        }
        match post {
            Some(true) => servers = servers.with_post_connect_processor(ScriptedPostConnect::switching_to("m")),
            Some(false) => servers = servers.with_post_connect_processor(ScriptedPostConnect::failing("no")),
            None => {},
        }
        let check = health.map(|ok| {
            if ok { ScriptedHealthCheck::passing() } else { ScriptedHealthCheck::failing("no") }
        });

        let result = runtime.block_on(servers.acquire_with_health_check(
            check.as_ref().map(|c| c as &dyn HealthCheck<ScriptedConnection>),
        ));

        let expected = expected_steps(auth, post, health);
        let failed = expected.last() == Some(&Step::Close);
        prop_assert_eq!(journal.steps(), expected);
        prop_assert_eq!(result.is_err(), failed);
        prop_assert!(journal.count(Step::Close) <= 1);
    }
}
