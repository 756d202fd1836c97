//! Scenario tests over a simulated network.
//!
//! A scenario declares simulated directory hosts, a target for a
//! [`dirlink_core::SingleServerSet`], the preparation stages to install, and
//! how many acquisitions to perform. Running it requires an oracle that
//! checks the resulting [`World`].

mod builder;
mod world;

pub use builder::{RunnableScenario, Scenario};
pub use world::{AcquisitionOutcome, World};

/// Verifies the final state of a scenario.
///
/// Returns `Err` with a description of the first violated property.
pub type OracleFn = Box<dyn Fn(&World) -> Result<(), String>>;
