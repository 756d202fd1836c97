//! Deterministic test harness for directory connection acquisition.
//!
//! Scripted, in-memory implementations of the transport and preparation
//! stages that journal every step they take, plus a turmoil-backed transport
//! and scenario builder for running acquisitions over a simulated network.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod journal;
pub mod scenario;
pub mod scripted;
pub mod sim_transport;

pub use journal::{Journal, Step};
pub use scenario::{AcquisitionOutcome, OracleFn, Scenario, World};
pub use scripted::{
    HealthRule, ScriptedAuthenticator, ScriptedConnection, ScriptedHealthCheck,
    ScriptedPostConnect, ScriptedTransportFactory, TrackedConnection,
};
pub use sim_transport::{SimConnection, SimTransportFactory};
