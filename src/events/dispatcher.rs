//! Per-command change batching

use std::collections::VecDeque;

use crate::text::{Change, ChangeBatch};

/// Collects the changes of the running command and queues them for idle delivery
#[derive(Debug, Clone, Default)]
pub struct ChangeDispatcher {
    current: ChangeBatch,
    queue: VecDeque<ChangeBatch>,
}

impl ChangeDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add changes produced inside the running command
    pub fn record(&mut self, changes: impl IntoIterator<Item = Change>) {
        self.current.extend(changes);
    }

    /// Close the running command. Returns `true` if a notification was scheduled.
    pub fn finish_command(&mut self) -> bool {
        let mut batch = std::mem::take(&mut self.current);
        batch.retain_effective();
        if batch.is_empty() {
            return false;
        }
        log::debug!("scheduling content change with {} change(s)", batch.len());
        self.queue.push_back(batch);
        true
    }

    /// Next batch waiting for the idle phase
    pub fn pop_pending(&mut self) -> Option<ChangeBatch> {
        self.queue.pop_front()
    }

    pub fn has_pending(&self) -> bool {
        !self.queue.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.queue.len()
    }
}
