use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;

use dashmap::DashMap;
use smsgate_common::{GatewayEvent, MessageStatus};
use tokio::sync::Mutex;
use tokio::task::AbortHandle;
use tracing::{debug, info, warn};

use super::broadcaster::EventBroadcaster;
use super::StoreState;

/// Owns the deferred `queued -> sent` transitions of outbound messages.
///
/// Each transition is a spawned task that holds only a weak reference to the
/// store state, and is registered here by message id so it can be aborted.
/// Dropping the scheduler aborts everything still pending.
#[derive(Debug, Default)]
pub struct DeliveryScheduler {
    pending: Arc<DashMap<i32, AbortHandle>>,
    closed: AtomicBool,
}

impl DeliveryScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Must be called while the caller holds the state lock, so the task
    /// cannot finish before it is registered.
    pub(super) fn schedule(
        &self,
        message_id: i32,
        state: Weak<Mutex<StoreState>>,
        broadcaster: EventBroadcaster,
        delay: Duration,
    ) {
        if self.closed.load(Ordering::Acquire) {
            warn!(message_id, "Delivery scheduler is closed; message stays queued.");
            return;
        }

        let pending = Arc::clone(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            mark_sent(message_id, state, &broadcaster).await;
            pending.remove(&message_id);
        });
        self.pending.insert(message_id, handle.abort_handle());
        debug!(message_id, delay_ms = delay.as_millis() as u64, "Delivery transition scheduled.");
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    #[cfg(test)]
    pub(crate) fn is_pending(&self, message_id: i32) -> bool {
        self.pending.contains_key(&message_id)
    }

    /// Aborts every pending transition and refuses new ones.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        let mut aborted = 0usize;
        self.pending.retain(|_, handle| {
            handle.abort();
            aborted += 1;
            false
        });
        if aborted > 0 {
            info!(count = aborted, "Canceled pending delivery transitions.");
        }
    }
}

impl Drop for DeliveryScheduler {
    fn drop(&mut self) {
        self.close();
    }
}

async fn mark_sent(message_id: i32, state: Weak<Mutex<StoreState>>, broadcaster: &EventBroadcaster) {
    let Some(state) = state.upgrade() else {
        debug!(message_id, "Store is gone; dropping delivery transition.");
        return;
    };

    let mut guard = state.lock().await;
    match guard.messages.iter_mut().find(|m| m.id == message_id) {
        Some(message) if message.status == MessageStatus::Queued => {
            message.status = MessageStatus::Sent;
            info!(message_id, recipient = %message.recipient, "Message marked as sent.");
            broadcaster.publish(GatewayEvent::MessageStatusChanged {
                id: message_id,
                status: MessageStatus::Sent,
            });
        }
        Some(message) => {
            debug!(message_id, status = %message.status, "Message no longer queued; skipping transition.");
        }
        None => {
            debug!(message_id, "Message no longer exists; skipping transition.");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn empty_state() -> Arc<Mutex<StoreState>> {
        let seed = super::super::SeedData::empty();
        Arc::new(Mutex::new(StoreState {
            contacts: seed.contacts,
            messages: seed.messages,
            stats: seed.stats,
            settings: seed.settings,
            loading: false,
        }))
    }

    #[tokio::test(start_paused = true)]
    async fn finished_transition_unregisters_itself() {
        let state = empty_state();
        let scheduler = DeliveryScheduler::new();
        scheduler.schedule(7, Arc::downgrade(&state), EventBroadcaster::default(), Duration::from_millis(100));
        assert!(scheduler.is_pending(7));

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(!scheduler.is_pending(7));
        assert_eq!(scheduler.pending_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn closed_scheduler_refuses_new_transitions() {
        let state = empty_state();
        let scheduler = DeliveryScheduler::new();
        scheduler.schedule(1, Arc::downgrade(&state), EventBroadcaster::default(), Duration::from_secs(1));
        scheduler.close();
        assert_eq!(scheduler.pending_count(), 0);

        scheduler.schedule(2, Arc::downgrade(&state), EventBroadcaster::default(), Duration::from_secs(1));
        assert!(!scheduler.is_pending(2));
    }
}
