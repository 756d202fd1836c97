//! Scenario builder API.
//!
//! Declarative construction of simulated-network acquisition tests. An
//! oracle is mandatory: only a [`RunnableScenario`] can be run.

use std::{
    collections::HashMap,
    net::{Ipv4Addr, SocketAddr},
    sync::{Arc, Mutex, PoisonError},
    time::Duration,
};

use dirlink_core::{
    ConnectionOptions, ConnectionSource, DirectoryConnection, HealthCheck, SingleServerSet,
};
use tokio::io::AsyncReadExt;
use tracing::debug;
use turmoil::net::TcpListener;

use crate::{
    journal::Journal,
    scenario::{AcquisitionOutcome, OracleFn, World},
    scripted::{ScriptedAuthenticator, ScriptedHealthCheck, ScriptedPostConnect, TrackedConnection},
    sim_transport::{SimConnection, SimTransportFactory},
};

/// Name of the simulated client that performs acquisitions.
const CLIENT_HOST: &str = "client";

/// How long acquired connections are held before the client closes them.
const HOLD_TIME: Duration = Duration::from_millis(100);

type AcceptCounts = Arc<Mutex<HashMap<String, usize>>>;

/// Scenario builder.
///
/// Add simulated directory hosts, point the client at one of them, then call
/// [`Scenario::oracle`] to get something runnable.
pub struct Scenario {
    name: String,
    hosts: Vec<(String, u16)>,
    target: Option<(String, u32)>,
    acquisitions: usize,
    options: ConnectionOptions,
    authenticator: Option<ScriptedAuthenticator>,
    post_connect: Option<ScriptedPostConnect>,
    health_check: Option<ScriptedHealthCheck>,
    seed: Option<u64>,
    duration: Duration,
}

impl Scenario {
    /// Create a scenario with the given name.
    ///
    /// Defaults to a single acquisition, default connection options, and no
    /// preparation stages.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            hosts: Vec::new(),
            target: None,
            acquisitions: 1,
            options: ConnectionOptions::default(),
            authenticator: None,
            post_connect: None,
            health_check: None,
            seed: None,
            duration: Duration::from_secs(60),
        }
    }

    /// Add a simulated directory host listening on `port`.
    ///
    /// The host accepts any number of connections and drains whatever the
    /// client sends.
    #[must_use]
    pub fn directory_server(mut self, name: impl Into<String>, port: u16) -> Self {
        self.hosts.push((name.into(), port));
        self
    }

    /// Acquire connections from `address:port`.
    ///
    /// `address` must name a host added with [`Scenario::directory_server`].
    #[must_use]
    pub fn target(mut self, address: impl Into<String>, port: u32) -> Self {
        self.target = Some((address.into(), port));
        self
    }

    /// Number of sequential acquisitions the client performs.
    #[must_use]
    pub fn acquisitions(mut self, count: usize) -> Self {
        self.acquisitions = count;
        self
    }

    /// Connection options for the source.
    #[must_use]
    pub fn options(mut self, options: ConnectionOptions) -> Self {
        self.options = options;
        self
    }

    /// Install an authenticator on the source.
    #[must_use]
    pub fn authenticator(mut self, authenticator: ScriptedAuthenticator) -> Self {
        self.authenticator = Some(authenticator);
        self
    }

    /// Install a post-connect processor on the source.
    #[must_use]
    pub fn post_connect(mut self, processor: ScriptedPostConnect) -> Self {
        self.post_connect = Some(processor);
        self
    }

    /// Pass a health check to every acquisition.
    #[must_use]
    pub fn health_check(mut self, check: ScriptedHealthCheck) -> Self {
        self.health_check = Some(check);
        self
    }

    /// Seed turmoil's RNG.
    #[must_use]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Upper bound on simulated time.
    #[must_use]
    pub fn simulation_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    /// Set the oracle function and return a runnable scenario.
    pub fn oracle(self, oracle: OracleFn) -> RunnableScenario {
        RunnableScenario { scenario: self, oracle }
    }
}

/// A scenario with an oracle, ready to run.
pub struct RunnableScenario {
    scenario: Scenario,
    oracle: OracleFn,
}

impl RunnableScenario {
    /// Execute the scenario.
    ///
    /// Starts every directory host, runs the client's acquisitions in order,
    /// holds the acquired connections briefly, closes them, then hands the
    /// final [`World`] to the oracle.
    pub fn run(self) -> Result<(), String> {
        let scenario = self.scenario;
        let name = scenario.name;

        let (address, port) = scenario
            .target
            .ok_or_else(|| format!("Scenario '{name}': no target configured"))?;
        if !scenario.hosts.iter().any(|(host, _)| *host == address) {
            return Err(format!("Scenario '{name}': target {address} is not a directory host"));
        }
        if scenario.hosts.iter().any(|(host, _)| host == CLIENT_HOST) {
            return Err(format!("Scenario '{name}': host name '{CLIENT_HOST}' is reserved"));
        }

        let journal = Journal::new();
        let mut servers =
            SingleServerSet::with_transport(address, port, SimTransportFactory::new(&journal))
                .map_err(|e| format!("Scenario '{name}': {e}"))?
                .with_options(scenario.options);
        if let Some(authenticator) = scenario.authenticator {
            servers = servers.with_authenticator(authenticator);
        }
        if let Some(processor) = scenario.post_connect {
            servers = servers.with_post_connect_processor(processor);
        }

        let mut builder = turmoil::Builder::new();
        builder.simulation_duration(scenario.duration);
        if let Some(seed) = scenario.seed {
            builder.rng_seed(seed);
        }
        let mut sim = builder.build();

        let accepted: AcceptCounts = Arc::default();
        for (host, listen_port) in scenario.hosts {
            let accepted = Arc::clone(&accepted);
            sim.host(host.clone(), move || {
                directory_stub(host.clone(), listen_port, Arc::clone(&accepted))
            });
        }

        let outcomes: Arc<Mutex<Vec<AcquisitionOutcome>>> = Arc::default();
        let client_outcomes = Arc::clone(&outcomes);
        let health_check = scenario.health_check;
        let count = scenario.acquisitions;
        sim.client(CLIENT_HOST, async move {
            let health_check =
                health_check.as_ref().map(|check| check as &dyn HealthCheck<SimConnection>);
            let mut held = Vec::new();

            for _ in 0..count {
                let outcome = match servers.acquire_with_health_check(health_check).await {
                    Ok(connection) => {
                        let outcome = AcquisitionOutcome::Ready {
                            connection_id: connection.id(),
                            bound_identity: connection.bound_identity().map(str::to_owned),
                            session_mode: connection.session_mode().map(str::to_owned),
                        };
                        held.push(connection);
                        outcome
                    },
                    Err(error) => {
                        AcquisitionOutcome::Failed { step: error.step(), message: error.to_string() }
                    },
                };
                client_outcomes.lock().unwrap_or_else(PoisonError::into_inner).push(outcome);
            }

            tokio::time::sleep(HOLD_TIME).await;
            for mut connection in held {
                connection.close().await;
            }
            Ok(())
        });

        sim.run().map_err(|e| format!("Scenario '{name}': simulation failed: {e}"))?;

        let outcomes = std::mem::take(&mut *outcomes.lock().unwrap_or_else(PoisonError::into_inner));
        let accepted = accepted.lock().unwrap_or_else(PoisonError::into_inner).clone();
        let world = World::new(outcomes, accepted, journal);

        (self.oracle)(&world).map_err(|e| format!("Scenario '{name}': {e}"))
    }
}

/// A directory host that accepts connections forever and discards input.
async fn directory_stub(name: String, port: u16, accepted: AcceptCounts) -> turmoil::Result {
    let listener = TcpListener::bind(SocketAddr::from((Ipv4Addr::UNSPECIFIED, port))).await?;

    loop {
        let (mut stream, peer) = listener.accept().await?;
        {
            let mut counts = accepted.lock().unwrap_or_else(PoisonError::into_inner);
            *counts.entry(name.clone()).or_insert(0) += 1;
        }
        debug!(host = %name, %peer, "accepted connection");

        tokio::spawn(async move {
            let mut sink = [0u8; 512];
            while matches!(stream.read(&mut sink).await, Ok(n) if n > 0) {}
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scenario_requires_target() {
        let result = Scenario::new("no-target")
            .directory_server("ds1", 389)
            .oracle(Box::new(|_world| Ok(())))
            .run();

        assert!(result.is_err_and(|e| e.contains("no target")));
    }

    #[test]
    fn scenario_rejects_unknown_target_host() {
        let result = Scenario::new("unknown-host")
            .directory_server("ds1", 389)
            .target("ds2", 389)
            .oracle(Box::new(|_world| Ok(())))
            .run();

        assert!(result.is_err_and(|e| e.contains("not a directory host")));
    }

    #[test]
    fn scenario_rejects_invalid_port_before_simulating() {
        let result = Scenario::new("bad-port")
            .directory_server("ds1", 389)
            .target("ds1", 70_000)
            .oracle(Box::new(|_world| Ok(())))
            .run();

        assert!(result.is_err_and(|e| e.contains("invalid configuration")));
    }

    #[test]
    fn single_acquisition_reaches_host() {
        Scenario::new("single")
            .directory_server("ds1", 389)
            .target("ds1", 389)
            .oracle(Box::new(|world| {
                if world.ready_count() != 1 {
                    return Err(format!("expected one connection, got {:?}", world.outcomes()));
                }
                if world.accepted("ds1") != 1 {
                    return Err(format!("ds1 accepted {} connections", world.accepted("ds1")));
                }
                Ok(())
            }))
            .run()
            .expect("scenario should succeed");
    }
}
