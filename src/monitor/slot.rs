//! Single-slot handoff between capture and dispatch.
//!
//! The slot holds at most one event. Publishing while an event is pending
//! replaces it, so a slow consumer sees only the most recent change and
//! producers never wait. Consumers that need every event must use an
//! unbounded queue instead; this relay only answers "what changed last".

use parking_lot::Mutex;

use super::events::Event;
use crate::telemetry::metrics;

/// Capacity-1, latest-wins slot shared by any number of producers and one
/// consumer.
#[derive(Debug, Default)]
pub struct HandoffSlot {
    pending: Mutex<Option<Event>>,
}

impl HandoffSlot {
    /// Create an empty slot.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `event`, replacing any pending one. Never blocks on the consumer.
    pub fn publish(&self, event: Event) {
        let replaced = self.pending.lock().replace(event);

        metrics::EVENTS_CAPTURED.inc();
        if let Some(stale) = replaced {
            metrics::EVENTS_OVERWRITTEN.inc();
            tracing::debug!(
                watch_id = %stale.watch_id(),
                path = stale.file_path(),
                "Pending event overwritten"
            );
        }
    }

    /// Take the pending event, leaving the slot empty.
    #[must_use]
    pub fn try_take(&self) -> Option<Event> {
        self.pending.lock().take()
    }

    /// Whether an event is waiting to be drained.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending.lock().is_some()
    }
}
