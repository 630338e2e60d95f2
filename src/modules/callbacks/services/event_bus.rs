use crate::modules::callbacks::models::PaymentEvent;
use tokio::sync::broadcast;
use tracing::debug;

/// Default number of events a slow subscriber may lag behind
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

/// Sink for payment events
///
/// Publishing never waits on subscribers and never fails the caller.
pub trait EventPublisher: Send + Sync {
    fn publish(&self, event: PaymentEvent);
}

/// In-process fan-out over a tokio broadcast channel
#[derive(Debug, Clone)]
pub struct BroadcastEventBus {
    sender: broadcast::Sender<PaymentEvent>,
}

impl BroadcastEventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<PaymentEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for BroadcastEventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_CAPACITY)
    }
}

impl EventPublisher for BroadcastEventBus {
    fn publish(&self, event: PaymentEvent) {
        let name = event.name();
        match self.sender.send(event) {
            Ok(receivers) => debug!(event = name, receivers = receivers, "Event published"),
            Err(_) => debug!(event = name, "Event dropped, no subscribers"),
        }
    }
}
