//! Ordered record of preparation steps.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A step taken on a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Step {
    /// The transport opened the connection.
    Open,
    /// An authenticator ran.
    Authenticate,
    /// A post-connect processor ran.
    PostConnect,
    /// A health check ran.
    HealthCheck,
    /// The connection was closed.
    Close,
}

/// Shared, append-only log of `(connection id, step)` entries.
///
/// Cloning a journal yields another handle to the same log, so a transport
/// and every stage can write to one journal that the test inspects later.
#[derive(Debug, Clone, Default)]
pub struct Journal {
    entries: Arc<Mutex<Vec<(u64, Step)>>>,
}

impl Journal {
    /// Create an empty journal.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step for `connection_id`.
    pub fn record(&self, connection_id: u64, step: Step) {
        self.lock().push((connection_id, step));
    }

    /// Every step, in the order recorded.
    pub fn steps(&self) -> Vec<Step> {
        self.lock().iter().map(|(_, step)| *step).collect()
    }

    /// Steps recorded for one connection, in order.
    pub fn steps_for(&self, connection_id: u64) -> Vec<Step> {
        self.lock().iter().filter(|(id, _)| *id == connection_id).map(|(_, step)| *step).collect()
    }

    /// Number of times `step` was recorded across all connections.
    pub fn count(&self, step: Step) -> usize {
        self.lock().iter().filter(|(_, recorded)| *recorded == step).count()
    }

    /// Distinct connection ids, in order of first appearance.
    pub fn connection_ids(&self) -> Vec<u64> {
        let mut ids = Vec::new();
        for (id, _) in self.lock().iter() {
            if !ids.contains(id) {
                ids.push(*id);
            }
        }
        ids
    }

    fn lock(&self) -> MutexGuard<'_, Vec<(u64, Step)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_one_log() {
        let journal = Journal::new();
        let other = journal.clone();

        journal.record(1, Step::Open);
        other.record(2, Step::Open);
        journal.record(1, Step::Close);

        assert_eq!(journal.steps(), vec![Step::Open, Step::Open, Step::Close]);
        assert_eq!(other.steps_for(1), vec![Step::Open, Step::Close]);
        assert_eq!(journal.count(Step::Open), 2);
        assert_eq!(journal.connection_ids(), vec![1, 2]);
    }
}
