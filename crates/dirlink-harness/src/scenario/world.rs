//! World state after a scenario has run.
//!
//! Collects what the client observed for each acquisition, how many
//! connections each simulated host accepted, and the shared step journal.

use std::collections::HashMap;

use dirlink_core::AcquireStep;

use crate::journal::Journal;

/// What a single acquisition produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcquisitionOutcome {
    /// A prepared connection was handed to the caller.
    Ready {
        /// Transport-assigned connection id.
        connection_id: u64,
        /// Identity bound by authentication, if any.
        bound_identity: Option<String>,
        /// Session mode set by post-connect processing, if any.
        session_mode: Option<String>,
    },
    /// Acquisition failed.
    Failed {
        /// Step that failed.
        step: AcquireStep,
        /// Rendered error.
        message: String,
    },
}

impl AcquisitionOutcome {
    /// Whether a connection was handed out.
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready { .. })
    }

    /// Failed step, if the acquisition failed.
    pub fn failed_step(&self) -> Option<AcquireStep> {
        match self {
            Self::Ready { .. } => None,
            Self::Failed { step, .. } => Some(*step),
        }
    }
}

/// Final state of a scenario, handed to its oracle.
#[derive(Debug)]
pub struct World {
    outcomes: Vec<AcquisitionOutcome>,
    accepted: HashMap<String, usize>,
    journal: Journal,
}

impl World {
    pub(crate) fn new(
        outcomes: Vec<AcquisitionOutcome>,
        accepted: HashMap<String, usize>,
        journal: Journal,
    ) -> Self {
        Self { outcomes, accepted, journal }
    }

    /// Outcome of every acquisition, in the order performed.
    pub fn outcomes(&self) -> &[AcquisitionOutcome] {
        &self.outcomes
    }

    /// Number of acquisitions that produced a connection.
    pub fn ready_count(&self) -> usize {
        self.outcomes.iter().filter(|outcome| outcome.is_ready()).count()
    }

    /// Acquisitions that failed.
    pub fn failures(&self) -> Vec<&AcquisitionOutcome> {
        self.outcomes.iter().filter(|outcome| !outcome.is_ready()).collect()
    }

    /// Connections accepted by the named host.
    pub fn accepted(&self, host: &str) -> usize {
        self.accepted.get(host).copied().unwrap_or(0)
    }

    /// Connections accepted across every host.
    pub fn total_accepted(&self) -> usize {
        self.accepted.values().sum()
    }

    /// Steps journaled during the scenario.
    pub fn journal(&self) -> &Journal {
        &self.journal
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_ready_and_failed_outcomes() {
        let world = World::new(
            vec![
                AcquisitionOutcome::Ready {
                    connection_id: 1,
                    bound_identity: None,
                    session_mode: None,
                },
                AcquisitionOutcome::Failed {
                    step: AcquireStep::Transport,
                    message: "refused".to_string(),
                },
            ],
            HashMap::from([("ds1".to_string(), 1)]),
            Journal::new(),
        );

        assert_eq!(world.ready_count(), 1);
        assert_eq!(world.failures().len(), 1);
        assert_eq!(world.failures()[0].failed_step(), Some(AcquireStep::Transport));
        assert_eq!(world.accepted("ds1"), 1);
        assert_eq!(world.accepted("ds2"), 0);
        assert_eq!(world.total_accepted(), 1);
    }
}
