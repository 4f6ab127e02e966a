use smsgate_common::GatewayEvent;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 256;

/// Fan-out of store change events to any number of subscribers.
#[derive(Debug, Clone)]
pub struct EventBroadcaster {
    events_tx: broadcast::Sender<GatewayEvent>,
}

impl Default for EventBroadcaster {
    fn default() -> Self {
        Self::new(EVENT_CHANNEL_CAPACITY)
    }
}

impl EventBroadcaster {
    pub fn new(capacity: usize) -> Self {
        let (events_tx, _) = broadcast::channel(capacity);
        Self { events_tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<GatewayEvent> {
        self.events_tx.subscribe()
    }

    #[cfg(test)]
    pub(crate) fn receiver_count(&self) -> usize {
        self.events_tx.receiver_count()
    }

    pub fn publish(&self, event: GatewayEvent) {
        let kind = event.kind();
        let receiver_count = self.events_tx.receiver_count();
        if receiver_count == 0 {
            debug!(event = kind, "No active subscribers, skipping broadcast.");
            return;
        }
        match self.events_tx.send(event) {
            Ok(delivered) => debug!(
                event = kind,
                "Broadcasted store event to {} subscribers.",
                delivered
            ),
            // All receivers dropped between the count check and the send.
            Err(_) => debug!(event = kind, "Subscribers went away before broadcast."),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_events_in_order() {
        let broadcaster = EventBroadcaster::default();
        let mut rx = broadcaster.subscribe();
        broadcaster.publish(GatewayEvent::Ready);
        broadcaster.publish(GatewayEvent::ContactDeleted { id: 2 });

        assert_eq!(rx.recv().await.unwrap(), GatewayEvent::Ready);
        assert_eq!(rx.recv().await.unwrap(), GatewayEvent::ContactDeleted { id: 2 });
    }

    #[test]
    fn publishing_without_subscribers_is_harmless() {
        let broadcaster = EventBroadcaster::default();
        broadcaster.publish(GatewayEvent::Ready);
        assert_eq!(broadcaster.receiver_count(), 0);
    }
}
