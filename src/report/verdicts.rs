// Verdict bookkeeping: at most one testFailed/testIgnored per entity and cycle

use std::collections::HashSet;

use crate::event::CanonicalEvent;

/// Entities that already carry a verdict between their start and finish
#[derive(Debug, Default)]
pub struct VerdictLedger {
    settled: HashSet<String>,
}

impl VerdictLedger {
    /// Whether `event` may be written. A second verdict for an entity
    /// before its `TestFinished` is refused; the first one stands.
    pub fn admit(&mut self, event: &CanonicalEvent) -> bool {
        match event {
            CanonicalEvent::TestStarted { name, .. } | CanonicalEvent::TestFinished { name } => {
                self.settled.remove(name);
                true
            }
            CanonicalEvent::TestFailed { name, .. } | CanonicalEvent::TestIgnored { name } => {
                self.settled.insert(name.clone())
            }
            _ => true,
        }
    }
}
